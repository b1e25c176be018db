//! Core interpreter implementation

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use hoist_core::ast::{BinOp, Body, Expr, FunctionDecl, Program, Statement, Type, VarDecl};

use crate::{
    environment::{Environment, Frame},
    error::{InterpreterError, InterpreterResult},
    value::Value,
};

/// Native stack reserved per allowed call level
const STACK_BYTES_PER_CALL: usize = 64 * 1024;

/// Native stack reserved for the run itself
const BASE_STACK_BYTES: usize = 1024 * 1024;

/// Interpreter options
#[derive(Debug, Clone)]
pub struct InterpreterOptions {
    /// Maximum number of nested calls
    pub max_call_depth: usize,
    /// Maximum number of executed statements per run, if any
    pub max_steps: Option<u64>,
    /// Native stack size of the evaluation thread; `None` sizes it from
    /// `max_call_depth`
    pub stack_size: Option<usize>,
}

impl InterpreterOptions {
    /// Stack size the evaluation thread is spawned with
    pub fn effective_stack_size(&self) -> usize {
        self.stack_size.unwrap_or_else(|| {
            self.max_call_depth
                .saturating_mul(STACK_BYTES_PER_CALL)
                .saturating_add(BASE_STACK_BYTES)
        })
    }
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_call_depth: 512,
            max_steps: None,
            stack_size: None,
        }
    }
}

/// Observable result of one run
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Every printed value, in order
    pub output: Vec<Value>,
    /// Value returned by the entry function
    pub return_value: Value,
}

/// Tree-walking interpreter
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    options: InterpreterOptions,
}

impl Interpreter {
    pub fn new(options: InterpreterOptions) -> Self {
        Self { options }
    }

    /// Call `entry` with `args` on a fresh set of globals
    ///
    /// Evaluation recurses on the native stack, so it runs on a dedicated
    /// thread large enough for `max_call_depth` nested calls. Exceeding the
    /// depth is reported as [`InterpreterError::StackOverflow`].
    pub fn run(&self, program: &Program, entry: &str, args: &[Value]) -> InterpreterResult<Execution> {
        std::thread::scope(|scope| {
            let worker = std::thread::Builder::new()
                .name("hoist-interpreter".to_string())
                .stack_size(self.options.effective_stack_size())
                .spawn_scoped(scope, move || self.run_here(program, entry, args))
                .map_err(|err| InterpreterError::ThreadSpawn(err.to_string()))?;
            worker
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    }

    fn run_here(&self, program: &Program, entry: &str, args: &[Value]) -> InterpreterResult<Execution> {
        let mut globals = Frame::new();
        declare_all(&mut globals, &program.globals);

        let mut machine = Machine {
            functions: program
                .functions
                .iter()
                .map(|function| (function.name.as_str(), function))
                .collect(),
            env: Environment::new(globals),
            output: Vec::new(),
            steps: 0,
            options: &self.options,
        };

        debug!(entry, args = args.len(), "interpreting program");
        let return_value = machine.call(entry, args.to_vec())?;
        debug!(
            printed = machine.output.len(),
            steps = machine.steps,
            "interpretation finished"
        );

        Ok(Execution {
            output: machine.output,
            return_value,
        })
    }
}

/// Control flow signal from executing statements
enum ControlFlow {
    Next,
    Return(Value),
}

struct Machine<'p> {
    functions: FxHashMap<&'p str, &'p FunctionDecl>,
    env: Environment,
    output: Vec<Value>,
    steps: u64,
    options: &'p InterpreterOptions,
}

impl<'p> Machine<'p> {
    fn call(&mut self, name: &str, args: Vec<Value>) -> InterpreterResult<Value> {
        let function = *self
            .functions
            .get(name)
            .ok_or_else(|| InterpreterError::UnknownFunction(name.to_string()))?;

        if args.len() != function.params.len() {
            return Err(InterpreterError::ArityError {
                function: name.to_string(),
                expected: function.params.len(),
                actual: args.len(),
            });
        }
        if self.env.depth() >= self.options.max_call_depth {
            return Err(InterpreterError::StackOverflow(self.options.max_call_depth));
        }

        trace!(function = name, depth = self.env.depth(), "call");

        let mut frame = Frame::new();
        for (param, arg) in function.params.iter().zip(args) {
            frame.declare(&param.name, arg);
        }
        declare_body(&mut frame, &function.body);

        self.env.push_frame(frame);
        let flow = self.exec_body(&function.body);
        self.env.pop_frame();

        match flow? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Next => Ok(Value::Void),
        }
    }

    fn exec_body(&mut self, body: &Body) -> InterpreterResult<ControlFlow> {
        for statement in &body.statements {
            if let ControlFlow::Return(value) = self.exec_statement(statement)? {
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Next)
    }

    fn exec_statement(&mut self, statement: &Statement) -> InterpreterResult<ControlFlow> {
        self.tick()?;
        match statement {
            Statement::Assign { target, expr } => {
                let value = self.eval(expr)?;
                self.env.assign(target, value)?;
                Ok(ControlFlow::Next)
            }
            Statement::Print(expr) => {
                let value = self.eval(expr)?;
                self.output.push(value);
                Ok(ControlFlow::Next)
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval_condition(condition)? {
                    self.exec_body(then_body)
                } else if let Some(else_body) = else_body {
                    self.exec_body(else_body)
                } else {
                    Ok(ControlFlow::Next)
                }
            }
            Statement::While { condition, body } => {
                while self.eval_condition(condition)? {
                    if let ControlFlow::Return(value) = self.exec_body(body)? {
                        return Ok(ControlFlow::Return(value));
                    }
                    self.tick()?;
                }
                Ok(ControlFlow::Next)
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Void,
                };
                Ok(ControlFlow::Return(value))
            }
        }
    }

    fn tick(&mut self) -> InterpreterResult<()> {
        self.steps += 1;
        match self.options.max_steps {
            Some(limit) if self.steps > limit => Err(InterpreterError::StepLimitExceeded(limit)),
            _ => Ok(()),
        }
    }

    fn eval_condition(&mut self, condition: &Expr) -> InterpreterResult<bool> {
        let value = self.eval(condition)?;
        value.to_boolean().ok_or_else(|| {
            InterpreterError::TypeError(format!(
                "condition must be a bool, got {}",
                value.type_name()
            ))
        })
    }

    fn eval(&mut self, expr: &Expr) -> InterpreterResult<Value> {
        match expr {
            Expr::Int(n) => Ok(Value::from(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Variable(name) => self.env.lookup(name),
            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                apply_binary(*op, left, right)
            }
            Expr::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<InterpreterResult<Vec<_>>>()?;
                self.call(name, values)
            }
        }
    }
}

fn apply_binary(op: BinOp, left: Value, right: Value) -> InterpreterResult<Value> {
    let (a, b) = match (left.to_number(), right.to_number()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(InterpreterError::TypeError(format!(
                "'{}' needs numbers, got {} and {}",
                op,
                left.type_name(),
                right.type_name()
            )))
        }
    };
    Ok(match op {
        BinOp::Add => Value::Number(a + b),
        BinOp::Sub => Value::Number(a - b),
        BinOp::Mul => Value::Number(a * b),
        BinOp::Div => Value::Number(a / b),
        BinOp::Less => Value::Bool(a < b),
    })
}

fn default_value(ty: &Type) -> Value {
    match ty {
        Type::Bool => Value::Bool(false),
        Type::Int | Type::Named(_) => Value::Number(0.0),
    }
}

fn declare_all(frame: &mut Frame, declarations: &[VarDecl]) {
    for decl in declarations {
        for name in &decl.names {
            frame.declare(name, default_value(&decl.ty));
        }
    }
}

/// Declare everything the body and its nested bodies declare
fn declare_body(frame: &mut Frame, body: &Body) {
    declare_all(frame, &body.declarations);
    for statement in &body.statements {
        match statement {
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                declare_body(frame, then_body);
                if let Some(else_body) = else_body {
                    declare_body(frame, else_body);
                }
            }
            Statement::While { body, .. } => declare_body(frame, body),
            Statement::Assign { .. } | Statement::Print(_) | Statement::Return(_) => {}
        }
    }
}
