//! End-to-end hoisting: parse, optimize, render and interpret

use hoist_core::{render, Program, Statement};
use hoist_interpreter::{Execution, Interpreter, InterpreterError, InterpreterOptions, Value};
use hoist_optimizer::{optimize, OptimizationConfig, OptimizationLevel, OptimizationPipeline};
use hoist_parser::parse;
use pretty_assertions::assert_eq;

fn execute(program: &Program, args: &[i64]) -> Execution {
    let args: Vec<Value> = args.iter().map(|&n| Value::from(n)).collect();
    Interpreter::new(InterpreterOptions {
        max_call_depth: 200,
        max_steps: Some(100_000),
        ..InterpreterOptions::default()
    })
    .run(program, "main", &args)
    .unwrap()
}

/// Optimize `source` and check the result behaves like the original for
/// every argument list
fn assert_equivalent(source: &str, arg_sets: &[&[i64]]) -> Program {
    let original = parse(source).unwrap();
    let mut optimized = original.clone();
    optimize(&mut optimized).unwrap();
    for args in arg_sets {
        assert_eq!(
            execute(&optimized, args),
            execute(&original, args),
            "behaviour changed for arguments {:?}",
            args
        );
    }
    optimized
}

#[test]
fn test_sum_printed_in_loop_computed_once() {
    let optimized = assert_equivalent(
        "fun int main(int a, int b)
             var int x;
             while x < 3 do
                 print(a + b);
                 x = x + 1
             endwhile;
             return (x)
         endfun",
        &[&[1, 2], &[-4, 9]],
    );

    let execution = execute(&optimized, &[1, 2]);
    assert_eq!(execution.output, vec![Value::Number(3.0); 3]);
    assert_eq!(execution.return_value, Value::Number(3.0));

    let body = &optimized.functions[0].body;
    assert!(matches!(body.statements[0], Statement::Assign { .. }));
    assert!(matches!(body.statements[1], Statement::While { .. }));
}

#[test]
fn test_folded_constant_program_unchanged() {
    let source = "fun int main() var int x; x = 2 + 3; print(x) endfun";
    let optimized = assert_equivalent(source, &[&[]]);
    assert_eq!(
        render(&optimized).unwrap(),
        "fun int main()\n    var int x;\n    x = 5;\n    print(x)\nendfun"
    );
}

#[test]
fn test_loop_with_late_modification_keeps_behaviour() {
    assert_equivalent(
        "fun int main(int a)
             var int i, total;
             while i < 4 do
                 total = total + a * 2;
                 print(total);
                 a = a + 1;
                 i = i + 1
             endwhile;
             return (total)
         endfun",
        &[&[0], &[3], &[-2]],
    );
}

#[test]
fn test_nested_control_flow_keeps_behaviour() {
    let optimized = assert_equivalent(
        "var int calls;

         fun int square(int n)
             calls = calls + 1;
             return (n * n)
         endfun

         fun int main(int a, int b)
             var int i, j, acc;
             while i < 3 do
                 j = 0;
                 while j < 2 do
                     if j < 1 then
                         acc = acc + (a - b) * i
                     else
                         acc = acc - square(a) / 2
                     endif;
                     print(acc + b * b);
                     j = j + 1
                 endwhile;
                 i = i + 1
             endwhile;
             print(calls);
             return (acc)
         endfun",
        &[&[1, 2], &[5, -3], &[0, 0]],
    );

    let text = render(&optimized).unwrap();
    assert!(text.contains("__hoisted_"));
    assert!(text.contains("__partial_"));
}

#[test]
fn test_render_round_trip_after_optimization() {
    let mut program = parse(
        "fun int main(int a, int b)
             var int x, y;
             while x < 10 do
                 y = (a + 1) * b + x;
                 x = x + 1
             endwhile;
             return (y / (0 - 2))
         endfun",
    )
    .unwrap();
    optimize(&mut program).unwrap();

    let text = render(&program).unwrap();
    let reparsed = parse(&text).unwrap();
    assert_eq!(render(&reparsed).unwrap(), text);
    assert_eq!(reparsed, program);
}

#[test]
fn test_pipeline_levels_agree_on_behaviour() {
    let source = "fun int main(int a, int b)
                      var int x;
                      while x < 5 do
                          print(x * (a + b));
                          x = x + 1
                      endwhile
                  endfun";
    let program = parse(source).unwrap();
    let expected = execute(&program, &[2, 3]);

    for level in [
        OptimizationLevel::None,
        OptimizationLevel::Basic,
        OptimizationLevel::Standard,
    ] {
        let mut pipeline = OptimizationPipeline::new(OptimizationConfig::for_level(level));
        let optimized = pipeline.optimize(&program).unwrap();
        assert_eq!(execute(&optimized, &[2, 3]), expected, "level {:?}", level);
    }

    let mut pipeline = OptimizationPipeline::default();
    pipeline.optimize(&program).unwrap();
    assert_eq!(pipeline.stats().partial_extractions, 1);
    assert_eq!(pipeline.stats().loop_hoists, 1);
}

#[test]
fn test_hoisted_recursive_call_no_longer_terminates() {
    let source = "fun int fact(int n)
                      if n < 1 then return (1) endif;
                      return (n * fact(n - 1))
                  endfun

                  fun int main(int a, int b) return (fact(a)) endfun";
    let original = parse(source).unwrap();
    assert_eq!(execute(&original, &[3, 0]).return_value, Value::from(6_i64));

    let mut optimized = original.clone();
    optimize(&mut optimized).unwrap();
    let err = Interpreter::default()
        .run(&optimized, "main", &[Value::from(3_i64), Value::from(0_i64)])
        .unwrap_err();
    assert!(matches!(err, InterpreterError::StackOverflow(_)));
}
