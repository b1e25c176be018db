//! Parser and AST builder for the Hoist language
//!
//! Source text is tokenized with a logos lexer and turned into a
//! [`hoist_core::Program`] by a recursive-descent parser. Literal-only
//! arithmetic is folded while the tree is built, so later stages never see
//! `2 + 3`, only `5`.

pub mod constant_folding;
pub mod error;
pub mod lexer;
pub mod parser;


pub use error::{ErrorKind, ParseError};
pub use parser::Parser;

use hoist_core::ast::{Expr, Program};

/// Parse a complete program
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse()
}

/// Parse a single expression, comparison included
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    Parser::new(source)?.parse_standalone_expression()
}
