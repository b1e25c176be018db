#[cfg(test)]
mod tests {
    use crate::error::*;

    #[test]
    fn test_shape_error_display() {
        let err = Error::shape("function 'main'", "comparison nested inside '+'");
        assert_eq!(
            err.to_string(),
            "Shape error in function 'main': comparison nested inside '+'"
        );
    }

    #[test]
    fn test_shape_error_equality() {
        let a = Error::shape("global declarations", "declaration without names");
        let b = Error::Shape {
            context: "global declarations".to_string(),
            message: "declaration without names".to_string(),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_result_alias_propagates() {
        fn inner() -> Result<()> {
            Err(Error::shape("body", "empty identifier"))
        }
        fn outer() -> Result<u32> {
            inner()?;
            Ok(1)
        }
        assert!(matches!(outer(), Err(Error::Shape { .. })));
    }
}
