#[cfg(test)]
mod tests {
    use crate::pipeline::*;
    use hoist_core::render;
    use hoist_parser::parse;

    const LOOP_PROGRAM: &str = "fun int main(int a, int b)
                                    var int x;
                                    while x < 3 do
                                        print(a + b);
                                        x = x + 1
                                    endwhile
                                endfun";

    // ===== Configuration Tests =====

    #[test]
    fn test_levels() {
        let none = OptimizationConfig::for_level(OptimizationLevel::None);
        assert!(!none.is_enabled());

        let basic = OptimizationConfig::for_level(OptimizationLevel::Basic);
        assert!(basic.statement_extraction);
        assert!(!basic.partial_extraction);
        assert!(basic.loop_hoisting);

        let standard = OptimizationConfig::default();
        assert_eq!(standard.level, OptimizationLevel::Standard);
        assert!(standard.partial_extraction);
        assert_eq!(standard.hoisted_prefix, DEFAULT_HOISTED_PREFIX);
        assert_eq!(standard.partial_prefix, DEFAULT_PARTIAL_PREFIX);
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: OptimizationConfig =
            serde_json::from_str(r#"{"level": "basic", "loop_hoisting": false}"#).unwrap();
        assert_eq!(config.level, OptimizationLevel::Basic);
        assert!(!config.loop_hoisting);
        // Unlisted fields come from the standard configuration
        assert!(config.partial_extraction);
        assert_eq!(config.hoisted_prefix, "__hoisted_");

        let empty: OptimizationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, OptimizationConfig::default());
    }

    // ===== Pipeline Tests =====

    #[test]
    fn test_pipeline_passes_per_level() {
        let none = OptimizationPipeline::new(OptimizationConfig::for_level(OptimizationLevel::None));
        assert!(none.pass_names().is_empty());

        let standard = OptimizationPipeline::default();
        assert_eq!(standard.pass_names(), vec!["Invariant Hoisting"]);
    }

    #[test]
    fn test_pipeline_records_stats() {
        let program = parse(LOOP_PROGRAM).unwrap();
        let mut pipeline = OptimizationPipeline::default();
        let optimized = pipeline.optimize(&program).unwrap();

        let stats = pipeline.stats();
        assert_eq!(stats.statements_before, 3);
        assert_eq!(stats.statements_after, 4);
        assert_eq!(stats.full_extractions, 1);
        assert_eq!(stats.loop_hoists, 1);
        assert_eq!(stats.bodies_visited, 2);
        assert_ne!(optimized, program);
    }

    #[test]
    fn test_level_none_returns_copy() {
        let program = parse(LOOP_PROGRAM).unwrap();
        let mut pipeline =
            OptimizationPipeline::new(OptimizationConfig::for_level(OptimizationLevel::None));
        let optimized = pipeline.optimize(&program).unwrap();
        assert_eq!(render(&optimized).unwrap(), render(&program).unwrap());
        assert_eq!(pipeline.stats().total_extractions(), 0);
    }

    #[test]
    fn test_clear_and_add_passes() {
        let mut pipeline = OptimizationPipeline::default();
        pipeline.clear_passes();
        assert!(pipeline.pass_names().is_empty());

        pipeline.add_pass(Box::new(crate::Hoister::new()));
        let program = parse(LOOP_PROGRAM).unwrap();
        pipeline.optimize(&program).unwrap();
        assert_eq!(pipeline.stats().loop_hoists, 1);
    }

    #[test]
    fn test_pipeline_rejects_malformed_program() {
        let mut program = parse(LOOP_PROGRAM).unwrap();
        program.functions[0].params[0].name.clear();
        let mut pipeline = OptimizationPipeline::default();
        assert!(pipeline.optimize(&program).is_err());
    }
}
