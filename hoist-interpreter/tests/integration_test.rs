//! Integration tests for the interpreter

use hoist_interpreter::{Interpreter, InterpreterError, InterpreterOptions, Value};
use hoist_parser::parse;

fn run(source: &str, args: &[Value]) -> Result<(Vec<Value>, Value), InterpreterError> {
    let program = parse(source).unwrap();
    let interpreter = Interpreter::new(InterpreterOptions::default());
    let execution = interpreter.run(&program, "main", args)?;
    Ok((execution.output, execution.return_value))
}

fn numbers(values: &[i64]) -> Vec<Value> {
    values.iter().map(|n| Value::from(*n)).collect()
}

#[test]
fn test_basic_arithmetic() {
    let test_cases: Vec<(&str, i64, i64, f64)> = vec![
        ("a + b", 3, 4, 7.0),
        ("a - b", 3, 4, -1.0),
        ("a * b", 3, 4, 12.0),
        ("a / b", 3, 4, 0.75),
        ("a * (b + a)", 3, 4, 21.0),
    ];

    for (expr, a, b, expected) in test_cases {
        let source = format!("fun int main(int a, int b) return ({}) endfun", expr);
        let (_, result) = run(&source, &[Value::from(a), Value::from(b)]).unwrap();
        assert_eq!(result, Value::Number(expected), "Failed for: {}", expr);
    }
}

#[test]
fn test_while_loop_and_prints() {
    let (output, result) = run(
        "fun int main()
             var int a, b, x;
             a = 1; b = 2; x = 0;
             while x < 3 do
                 print(a + b);
                 x = x + 1
             endwhile;
             return (x)
         endfun",
        &[],
    )
    .unwrap();
    assert_eq!(output, numbers(&[3, 3, 3]));
    assert_eq!(result, Value::Number(3.0));
}

#[test]
fn test_if_else_branches() {
    let source = "fun int main(int n)
                      if n < 10 then print(1) else print(2) endif;
                      return ()
                  endfun";
    let (output, result) = run(source, &[Value::Number(3.0)]).unwrap();
    assert_eq!(output, numbers(&[1]));
    assert_eq!(result, Value::Void);
    let (output, _) = run(source, &[Value::Number(30.0)]).unwrap();
    assert_eq!(output, numbers(&[2]));
}

#[test]
fn test_return_from_inside_loop() {
    let (output, result) = run(
        "fun int main()
             var int i;
             while true do
                 i = i + 1;
                 if 4 < i then return (i * 10) endif
             endwhile
         endfun",
        &[],
    )
    .unwrap();
    assert!(output.is_empty());
    assert_eq!(result, Value::Number(50.0));
}

#[test]
fn test_recursive_calls_and_globals() {
    let (output, result) = run(
        "var int calls;
         fun int fact(int n)
             calls = calls + 1;
             if n < 2 then return (1) endif;
             return (n * fact(n - 1))
         endfun

         fun int main()
             print(fact(5));
             return (calls)
         endfun",
        &[],
    )
    .unwrap();
    assert_eq!(output, numbers(&[120]));
    assert_eq!(result, Value::Number(5.0));
}

#[test]
fn test_nested_declarations_are_function_scoped() {
    let (output, _) = run(
        "fun int main()
             var int i;
             while i < 2 do
                 var int total;
                 total = total + 10;
                 print(total);
                 i = i + 1
             endwhile;
             print(total)
         endfun",
        &[],
    )
    .unwrap();
    assert_eq!(output, numbers(&[10, 20, 20]));
}

#[test]
fn test_bool_values() {
    let (output, _) = run(
        "fun void main() var bool flag; print(flag); flag = 1 < 2; print(flag) endfun",
        &[],
    )
    .unwrap();
    assert_eq!(output, vec![Value::Bool(false), Value::Bool(true)]);
}

#[test]
fn test_division_is_real_valued() {
    let (output, _) = run("fun int main() print(7 / 2); print(1 / 0) endfun", &[]).unwrap();
    assert_eq!(output, vec![Value::Number(3.5), Value::Number(f64::INFINITY)]);
}

// ===== Error Tests =====

#[test]
fn test_undeclared_variable() {
    let err = run("fun int main() x = 1 endfun", &[]).unwrap_err();
    assert_eq!(err, InterpreterError::NameError("x".to_string()));
}

#[test]
fn test_unknown_function_and_arity() {
    let err = run("fun int main() print(missing()) endfun", &[]).unwrap_err();
    assert_eq!(err, InterpreterError::UnknownFunction("missing".to_string()));

    let err = run(
        "fun int f(int a) return (a) endfun fun int main() print(f()) endfun",
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, InterpreterError::ArityError { expected: 1, actual: 0, .. }));
}

#[test]
fn test_non_boolean_condition() {
    let err = run("fun int main() if 1 then print(1) endif endfun", &[]).unwrap_err();
    assert!(matches!(err, InterpreterError::TypeError(_)));
}

#[test]
fn test_arithmetic_on_bool() {
    let err = run("fun int main() print(true + 1) endfun", &[]).unwrap_err();
    assert!(matches!(err, InterpreterError::TypeError(_)));
}

#[test]
fn test_stack_overflow() {
    let program = parse("fun int main() return (main()) endfun").unwrap();
    let interpreter = Interpreter::new(InterpreterOptions {
        max_call_depth: 50,
        ..InterpreterOptions::default()
    });
    let err = interpreter.run(&program, "main", &[]).unwrap_err();
    assert_eq!(err, InterpreterError::StackOverflow(50));
}

#[test]
fn test_unbounded_recursion_with_default_options() {
    let program = parse(
        "fun int f(int n) return (f(n + 1)) endfun
         fun int main() return (f(0)) endfun",
    )
    .unwrap();
    let options = InterpreterOptions::default();
    let limit = options.max_call_depth;
    let err = Interpreter::new(options).run(&program, "main", &[]).unwrap_err();
    assert_eq!(err, InterpreterError::StackOverflow(limit));
}

#[test]
fn test_deep_expression_recursion_with_default_options() {
    // Every level evaluates a nested call inside a binary operand
    let program = parse(
        "fun int f(int n) return (1 + (n * f(n + 1))) endfun
         fun int main() return (f(0)) endfun",
    )
    .unwrap();
    let err = Interpreter::default().run(&program, "main", &[]).unwrap_err();
    assert!(matches!(err, InterpreterError::StackOverflow(_)));
}

#[test]
fn test_stack_size_follows_call_depth() {
    let shallow = InterpreterOptions {
        max_call_depth: 10,
        ..InterpreterOptions::default()
    };
    let deep = InterpreterOptions {
        max_call_depth: 10_000,
        ..InterpreterOptions::default()
    };
    assert!(deep.effective_stack_size() > shallow.effective_stack_size());

    let fixed = InterpreterOptions {
        stack_size: Some(4 * 1024 * 1024),
        ..InterpreterOptions::default()
    };
    assert_eq!(fixed.effective_stack_size(), 4 * 1024 * 1024);
}

#[test]
fn test_step_limit() {
    let program = parse("fun int main() var int x; while true do x = x + 1 endwhile endfun").unwrap();
    let interpreter = Interpreter::new(InterpreterOptions {
        max_call_depth: 10,
        max_steps: Some(100),
        ..InterpreterOptions::default()
    });
    let err = interpreter.run(&program, "main", &[]).unwrap_err();
    assert_eq!(err, InterpreterError::StepLimitExceeded(100));
}
