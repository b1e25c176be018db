//! Recursive-descent parser building the Hoist AST

use hoist_core::ast::{
    BinOp, Body, Expr, FunctionDecl, Param, Program, ReturnType, Statement, Type, VarDecl,
};
use std::mem;
use tracing::debug;

use crate::constant_folding::fold_binary;
use crate::error::ParseError;
use crate::lexer::{Lexer, Token};

type Result<T> = std::result::Result<T, ParseError>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Option<Token<'a>>,
    /// Byte offset of `current`, or the source length at end of input
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self> {
        let mut parser = Self {
            lexer: Lexer::new(source),
            current: None,
            position: 0,
        };
        parser.advance()?;
        Ok(parser)
    }

    /// Parse a whole program: global declarations, then one or more functions
    pub fn parse(mut self) -> Result<Program> {
        let mut globals = Vec::new();
        while matches!(self.current, Some(Token::Var)) {
            globals.push(self.parse_var_decl()?);
        }

        let mut functions = Vec::new();
        loop {
            functions.push(self.parse_function()?);
            if self.current.is_none() {
                break;
            }
        }

        debug!(
            globals = globals.len(),
            functions = functions.len(),
            "parsed program"
        );
        Ok(Program { globals, functions })
    }

    /// Parse one comparison-level expression that must span the whole input
    pub fn parse_standalone_expression(mut self) -> Result<Expr> {
        let expr = self.parse_comparison()?;
        match self.current {
            None => Ok(expr),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    fn parse_function(&mut self) -> Result<FunctionDecl> {
        self.consume(Token::Fun, "'fun'")?;

        let return_type = match self.current {
            Some(Token::Ident(name)) => match ReturnType::from_name(name) {
                Some(return_type) => {
                    self.advance()?;
                    return_type
                }
                None => return Err(self.unexpected("return type 'int' or 'void'")),
            },
            _ => return Err(self.unexpected("return type 'int' or 'void'")),
        };
        let name = self.expect_identifier("function name")?;

        self.consume(Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !matches!(self.current, Some(Token::RParen)) {
            loop {
                let ty = Type::from_name(&self.expect_identifier("parameter type")?);
                let name = self.expect_identifier("parameter name")?;
                params.push(Param::new(ty, name));
                if matches!(self.current, Some(Token::Comma)) {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        self.consume(Token::RParen, "')'")?;

        let body = self.parse_body()?;
        self.consume(Token::EndFun, "'endfun'")?;

        Ok(FunctionDecl {
            return_type,
            name,
            params,
            body,
        })
    }

    fn parse_body(&mut self) -> Result<Body> {
        let mut declarations = Vec::new();
        while matches!(self.current, Some(Token::Var)) {
            declarations.push(self.parse_var_decl()?);
        }

        let mut statements = vec![self.parse_statement()?];
        while matches!(self.current, Some(Token::Semicolon)) {
            self.advance()?;
            statements.push(self.parse_statement()?);
        }

        Ok(Body::new(declarations, statements))
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl> {
        self.consume(Token::Var, "'var'")?;
        let ty = Type::from_name(&self.expect_identifier("type name")?);
        let mut names = vec![self.expect_identifier("variable name")?];
        while matches!(self.current, Some(Token::Comma)) {
            self.advance()?;
            names.push(self.expect_identifier("variable name")?);
        }
        self.consume(Token::Semicolon, "';'")?;
        Ok(VarDecl::new(ty, names))
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current {
            Some(Token::Ident(target)) => {
                self.advance()?;
                self.consume(Token::Assign, "'='")?;
                let expr = self.parse_comparison()?;
                Ok(Statement::assign(target, expr))
            }
            Some(Token::Print) => {
                self.advance()?;
                self.consume(Token::LParen, "'('")?;
                let expr = self.parse_comparison()?;
                self.consume(Token::RParen, "')'")?;
                Ok(Statement::Print(expr))
            }
            Some(Token::If) => {
                self.advance()?;
                let condition = self.parse_comparison()?;
                self.consume(Token::Then, "'then'")?;
                let then_body = self.parse_body()?;
                let else_body = if matches!(self.current, Some(Token::Else)) {
                    self.advance()?;
                    Some(self.parse_body()?)
                } else {
                    None
                };
                self.consume(Token::EndIf, "'endif'")?;
                Ok(Statement::If {
                    condition,
                    then_body,
                    else_body,
                })
            }
            Some(Token::While) => {
                self.advance()?;
                let condition = self.parse_comparison()?;
                self.consume(Token::Do, "'do'")?;
                let body = self.parse_body()?;
                self.consume(Token::EndWhile, "'endwhile'")?;
                Ok(Statement::While { condition, body })
            }
            Some(Token::Return) => {
                self.advance()?;
                self.consume(Token::LParen, "'('")?;
                let value = if matches!(self.current, Some(Token::RParen)) {
                    None
                } else {
                    Some(self.parse_comparison()?)
                };
                self.consume(Token::RParen, "')'")?;
                Ok(Statement::Return(value))
            }
            _ => Err(self.unexpected("statement")),
        }
    }

    /// `exp ['<' exp]`; comparisons never chain
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_additive()?;
        if matches!(self.current, Some(Token::Less)) {
            self.advance()?;
            let right = self.parse_additive()?;
            return Ok(Expr::binary(BinOp::Less, left, right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = fold_binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.current {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_factor()?;
            left = fold_binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        match self.current {
            Some(Token::Integer(n)) => {
                self.advance()?;
                Ok(Expr::Int(n))
            }
            Some(Token::True) => {
                self.advance()?;
                Ok(Expr::Bool(true))
            }
            Some(Token::False) => {
                self.advance()?;
                Ok(Expr::Bool(false))
            }
            Some(Token::Ident(name)) => {
                self.advance()?;
                if !matches!(self.current, Some(Token::LParen)) {
                    return Ok(Expr::var(name));
                }
                self.advance()?;
                let mut args = Vec::new();
                if !matches!(self.current, Some(Token::RParen)) {
                    loop {
                        args.push(self.parse_comparison()?);
                        if matches!(self.current, Some(Token::Comma)) {
                            self.advance()?;
                        } else {
                            break;
                        }
                    }
                }
                self.consume(Token::RParen, "')'")?;
                Ok(Expr::call(name, args))
            }
            Some(Token::LParen) => {
                self.advance()?;
                let inner = self.parse_additive()?;
                self.consume(Token::RParen, "')'")?;
                Ok(inner.parenthesized())
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    // Helper methods

    fn advance(&mut self) -> Result<()> {
        self.current = match self.lexer.next_token() {
            Some(token) => {
                self.position = self.lexer.span().start;
                Some(token?)
            }
            None => {
                self.position = self.lexer.source_len();
                None
            }
        };
        Ok(())
    }

    fn consume(&mut self, expected: Token<'a>, description: &str) -> Result<()> {
        if self.current.as_ref().map(mem::discriminant) == Some(mem::discriminant(&expected)) {
            self.advance()
        } else {
            Err(self.unexpected(description))
        }
    }

    fn expect_identifier(&mut self, description: &str) -> Result<String> {
        match self.current {
            Some(Token::Ident(name)) => {
                self.advance()?;
                Ok(name.to_string())
            }
            _ => Err(self.unexpected(description)),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match &self.current {
            Some(token) => ParseError::UnexpectedToken {
                position: self.position,
                expected: expected.to_string(),
                found: token.to_string(),
            },
            None => ParseError::UnexpectedEof {
                position: self.position,
                expected: expected.to_string(),
            },
        }
    }
}
