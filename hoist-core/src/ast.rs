//! AST representation of the imperative language
//!
//! Programs are plain owned trees: a list of global declarations followed by
//! a list of functions, each holding a [`Body`] of declarations and
//! statements. Statement and expression kinds are closed enums so every pass
//! dispatches on them with `match`.

use crate::error::{Error, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type alias for the HashSet implementation used for name sets
pub type AstHashSet<T> = FxHashSet<T>;

/// A complete program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Global variable declarations, in source order
    pub globals: Vec<VarDecl>,
    /// Function declarations, in source order
    pub functions: Vec<FunctionDecl>,
}

/// Return type of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnType {
    Int,
    Void,
}

impl ReturnType {
    /// Resolve a return type from its keyword
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ReturnType::Int),
            "void" => Some(ReturnType::Void),
            _ => None,
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Int => write!(f, "int"),
            ReturnType::Void => write!(f, "void"),
        }
    }
}

/// Type tag of a declared variable or parameter
///
/// The grammar accepts any identifier as a type; `int` and `bool` are the
/// ones the rest of the toolchain understands, anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Bool,
    Named(String),
}

impl Type {
    pub fn from_name(name: &str) -> Self {
        match name {
            "int" => Type::Int,
            "bool" => Type::Bool,
            other => Type::Named(other.to_string()),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A typed function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

impl Param {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// A function declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub return_type: ReturnType,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Body,
}

/// Declarations followed by statements
///
/// Statement order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub declarations: Vec<VarDecl>,
    pub statements: Vec<Statement>,
}

impl Body {
    pub fn new(declarations: Vec<VarDecl>, statements: Vec<Statement>) -> Self {
        Self {
            declarations,
            statements,
        }
    }

    /// Every assignment target in this body, nested bodies included
    pub fn assigned_names(&self) -> AstHashSet<String> {
        let mut names = AstHashSet::default();
        self.collect_assigned(&mut names);
        names
    }

    fn collect_assigned(&self, names: &mut AstHashSet<String>) {
        for statement in &self.statements {
            match statement {
                Statement::Assign { target, .. } => {
                    names.insert(target.clone());
                }
                Statement::If {
                    then_body,
                    else_body,
                    ..
                } => {
                    then_body.collect_assigned(names);
                    if let Some(else_body) = else_body {
                        else_body.collect_assigned(names);
                    }
                }
                Statement::While { body, .. } => body.collect_assigned(names),
                Statement::Print(_) | Statement::Return(_) => {}
            }
        }
    }

    /// Number of statements in this body, nested bodies included
    pub fn statement_count(&self) -> usize {
        self.statements
            .iter()
            .map(|statement| {
                1 + match statement {
                    Statement::If {
                        then_body,
                        else_body,
                        ..
                    } => {
                        then_body.statement_count()
                            + else_body.as_ref().map_or(0, Body::statement_count)
                    }
                    Statement::While { body, .. } => body.statement_count(),
                    _ => 0,
                }
            })
            .sum()
    }
}

/// A variable declaration: one type tag for one or more names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    pub ty: Type,
    pub names: Vec<String>,
}

impl VarDecl {
    pub fn new(ty: Type, names: Vec<String>) -> Self {
        Self { ty, names }
    }

    /// An `int` declaration of a single name
    pub fn int(name: impl Into<String>) -> Self {
        Self {
            ty: Type::Int,
            names: vec![name.into()],
        }
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    Assign {
        target: String,
        expr: Expr,
    },
    Print(Expr),
    If {
        condition: Expr,
        then_body: Body,
        else_body: Option<Body>,
    },
    While {
        condition: Expr,
        body: Body,
    },
    Return(Option<Expr>),
}

impl Statement {
    pub fn assign(target: impl Into<String>, expr: Expr) -> Self {
        Statement::Assign {
            target: target.into(),
            expr,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `<`, the only comparison; yields a boolean
    Less,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Less => "<",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, BinOp::Less)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Variable(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        /// Written inside explicit source parentheses
        parenthesized: bool,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Int(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            parenthesized: false,
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Mark a binary expression as written in parentheses. Other kinds are
    /// returned unchanged since they never need them.
    pub fn parenthesized(self) -> Self {
        match self {
            Expr::Binary {
                op, left, right, ..
            } => Expr::Binary {
                op,
                left,
                right,
                parenthesized: true,
            },
            other => other,
        }
    }

    /// Binary operations and calls; the expressions worth a temporary
    pub fn is_compound(&self) -> bool {
        matches!(self, Expr::Binary { .. } | Expr::Call { .. })
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, Expr::Binary { op, .. } if op.is_comparison())
    }
}

// Structural validation

impl Program {
    /// Check the structural contract every pass relies on
    pub fn validate(&self) -> Result<()> {
        if self.functions.is_empty() {
            return Err(Error::shape("program", "no function declarations"));
        }
        for decl in &self.globals {
            decl.validate("global declarations")?;
        }
        for function in &self.functions {
            function.validate()?;
        }
        Ok(())
    }

    /// Every identifier mentioned anywhere in the program
    pub fn identifiers(&self) -> AstHashSet<String> {
        let mut names = AstHashSet::default();
        for decl in &self.globals {
            names.extend(decl.names.iter().cloned());
        }
        for function in &self.functions {
            names.insert(function.name.clone());
            names.extend(function.params.iter().map(|p| p.name.clone()));
            collect_body_identifiers(&function.body, &mut names);
        }
        names
    }
}

fn collect_body_identifiers(body: &Body, names: &mut AstHashSet<String>) {
    for decl in &body.declarations {
        names.extend(decl.names.iter().cloned());
    }
    for statement in &body.statements {
        match statement {
            Statement::Assign { target, expr } => {
                names.insert(target.clone());
                collect_expr_identifiers(expr, names);
            }
            Statement::Print(expr) | Statement::Return(Some(expr)) => {
                collect_expr_identifiers(expr, names)
            }
            Statement::Return(None) => {}
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                collect_expr_identifiers(condition, names);
                collect_body_identifiers(then_body, names);
                if let Some(else_body) = else_body {
                    collect_body_identifiers(else_body, names);
                }
            }
            Statement::While { condition, body } => {
                collect_expr_identifiers(condition, names);
                collect_body_identifiers(body, names);
            }
        }
    }
}

fn collect_expr_identifiers(expr: &Expr, names: &mut AstHashSet<String>) {
    match expr {
        Expr::Int(_) | Expr::Bool(_) => {}
        Expr::Variable(name) => {
            names.insert(name.clone());
        }
        Expr::Binary { left, right, .. } => {
            collect_expr_identifiers(left, names);
            collect_expr_identifiers(right, names);
        }
        Expr::Call { name, args } => {
            names.insert(name.clone());
            for arg in args {
                collect_expr_identifiers(arg, names);
            }
        }
    }
}

impl FunctionDecl {
    fn validate(&self) -> Result<()> {
        let context = format!("function '{}'", self.name);
        check_identifier(&self.name, &context, "function name")?;
        for param in &self.params {
            check_identifier(&param.name, &context, "parameter name")?;
        }
        self.body.validate(&context)
    }
}

impl VarDecl {
    fn validate(&self, context: &str) -> Result<()> {
        if self.names.is_empty() {
            return Err(Error::shape(context, "declaration without names"));
        }
        for name in &self.names {
            check_identifier(name, context, "declared name")?;
        }
        Ok(())
    }
}

impl Body {
    fn validate(&self, context: &str) -> Result<()> {
        if self.statements.is_empty() {
            return Err(Error::shape(context, "body without statements"));
        }
        for decl in &self.declarations {
            decl.validate(context)?;
        }
        for statement in &self.statements {
            match statement {
                Statement::Assign { target, expr } => {
                    check_identifier(target, context, "assignment target")?;
                    expr.validate(context, true)?;
                }
                Statement::Print(expr) | Statement::Return(Some(expr)) => {
                    expr.validate(context, true)?
                }
                Statement::Return(None) => {}
                Statement::If {
                    condition,
                    then_body,
                    else_body,
                } => {
                    condition.validate(context, true)?;
                    then_body.validate(context)?;
                    if let Some(else_body) = else_body {
                        else_body.validate(context)?;
                    }
                }
                Statement::While { condition, body } => {
                    condition.validate(context, true)?;
                    body.validate(context)?;
                }
            }
        }
        Ok(())
    }
}

impl Expr {
    /// `comparison_allowed` is true only where the grammar places a `cexp`:
    /// statement arguments, conditions and call arguments.
    fn validate(&self, context: &str, comparison_allowed: bool) -> Result<()> {
        match self {
            Expr::Int(_) | Expr::Bool(_) => Ok(()),
            Expr::Variable(name) => check_identifier(name, context, "variable name"),
            Expr::Binary {
                op, left, right, ..
            } => {
                if op.is_comparison() && !comparison_allowed {
                    return Err(Error::shape(
                        context,
                        "comparison '<' used as an operand of another operator",
                    ));
                }
                left.validate(context, false)?;
                right.validate(context, false)
            }
            Expr::Call { name, args } => {
                check_identifier(name, context, "called function name")?;
                for arg in args {
                    arg.validate(context, true)?;
                }
                Ok(())
            }
        }
    }
}

fn check_identifier(name: &str, context: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        Err(Error::shape(context, format!("empty {}", what)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
