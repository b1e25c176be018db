//! Renders a program back to source text
//!
//! One rule per node kind. Nested bodies are indented one level deeper than
//! their owner and statements are separated by `;` plus a newline.
//! Parentheses appear only around binary expressions flagged as
//! parenthesized in the tree; precedence is never inferred here.

use crate::ast::{Body, Expr, FunctionDecl, Program, Statement, VarDecl};
use crate::error::Result;
use std::fmt::Write;

const INDENT: &str = "    ";
const STATEMENT_SEPARATOR: &str = ";\n";

/// Render a whole program after validating its shape
pub fn render(program: &Program) -> Result<String> {
    Unparser::new().render(program)
}

pub struct Unparser {
    output: String,
    indent_level: usize,
}

impl Default for Unparser {
    fn default() -> Self {
        Self::new()
    }
}

impl Unparser {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    pub fn render(mut self, program: &Program) -> Result<String> {
        program.validate()?;

        for decl in &program.globals {
            self.write_var_decl(decl);
            self.output.push('\n');
        }
        for (i, function) in program.functions.iter().enumerate() {
            if i > 0 {
                self.output.push_str("\n\n");
            }
            self.write_function(function);
        }
        Ok(self.output)
    }

    /// Render a single expression without validation
    pub fn render_expr(expr: &Expr) -> String {
        let mut unparser = Self::new();
        unparser.write_expr(expr);
        unparser.output
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(INDENT);
        }
    }

    fn write_function(&mut self, function: &FunctionDecl) {
        let _ = write!(
            self.output,
            "fun {} {}(",
            function.return_type, function.name
        );
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            let _ = write!(self.output, "{} {}", param.ty, param.name);
        }
        self.output.push_str(")\n");
        self.write_body(&function.body);
        self.output.push_str("\nendfun");
    }

    fn write_body(&mut self, body: &Body) {
        self.indent_level += 1;
        for (i, decl) in body.declarations.iter().enumerate() {
            if i > 0 {
                self.output.push('\n');
            }
            self.write_indent();
            self.write_var_decl(decl);
        }
        for (i, statement) in body.statements.iter().enumerate() {
            if i > 0 {
                self.output.push_str(STATEMENT_SEPARATOR);
            } else if !body.declarations.is_empty() {
                self.output.push('\n');
            }
            self.write_statement(statement);
        }
        self.indent_level -= 1;
    }

    fn write_var_decl(&mut self, decl: &VarDecl) {
        let _ = write!(self.output, "var {} {};", decl.ty, decl.names.join(", "));
    }

    fn write_statement(&mut self, statement: &Statement) {
        self.write_indent();
        match statement {
            Statement::Assign { target, expr } => {
                let _ = write!(self.output, "{} = ", target);
                self.write_expr(expr);
            }
            Statement::Print(expr) => {
                self.output.push_str("print(");
                self.write_expr(expr);
                self.output.push(')');
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                self.output.push_str("if ");
                self.write_expr(condition);
                self.output.push_str(" then\n");
                self.write_body(then_body);
                self.output.push('\n');
                if let Some(else_body) = else_body {
                    self.write_indent();
                    self.output.push_str("else\n");
                    self.write_body(else_body);
                    self.output.push('\n');
                }
                self.write_indent();
                self.output.push_str("endif");
            }
            Statement::While { condition, body } => {
                self.output.push_str("while ");
                self.write_expr(condition);
                self.output.push_str(" do\n");
                self.write_body(body);
                self.output.push('\n');
                self.write_indent();
                self.output.push_str("endwhile");
            }
            Statement::Return(value) => {
                self.output.push_str("return (");
                if let Some(expr) = value {
                    self.write_expr(expr);
                }
                self.output.push(')');
            }
        }
    }

    fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Int(n) => self.write_int(*n),
            Expr::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Expr::Variable(name) => self.output.push_str(name),
            Expr::Binary {
                op,
                left,
                right,
                parenthesized,
            } => {
                if *parenthesized {
                    self.output.push('(');
                }
                self.write_expr(left);
                let _ = write!(self.output, " {} ", op);
                self.write_expr(right);
                if *parenthesized {
                    self.output.push(')');
                }
            }
            Expr::Call { name, args } => {
                let _ = write!(self.output, "{}(", name);
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_expr(arg);
                }
                self.output.push(')');
            }
        }
    }

    /// The grammar has no negative literals, so folded negatives are written
    /// as a parenthesized subtraction that folds back to the same value.
    fn write_int(&mut self, n: i64) {
        if n >= 0 {
            let _ = write!(self.output, "{}", n);
        } else if n == i64::MIN {
            let _ = write!(self.output, "(0 - {} - 1)", i64::MAX);
        } else {
            let _ = write!(self.output, "(0 - {})", -n);
        }
    }
}

#[cfg(test)]
#[path = "unparser_tests.rs"]
mod tests;
