//! Lexer for Hoist source text using logos

use crate::error::ParseError;
use logos::{Lexer as LogosLexer, Logos};
use std::fmt;
use std::ops::Range;

pub type Span = Range<usize>;

#[derive(Logos, Debug, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'a> {
    // Keywords
    #[token("fun", priority = 10)]
    Fun,
    #[token("endfun", priority = 10)]
    EndFun,
    #[token("var", priority = 10)]
    Var,
    #[token("print", priority = 10)]
    Print,
    #[token("if", priority = 10)]
    If,
    #[token("then", priority = 10)]
    Then,
    #[token("else", priority = 10)]
    Else,
    #[token("endif", priority = 10)]
    EndIf,
    #[token("while", priority = 10)]
    While,
    #[token("do", priority = 10)]
    Do,
    #[token("endwhile", priority = 10)]
    EndWhile,
    #[token("return", priority = 10)]
    Return,
    #[token("true", priority = 10)]
    True,
    #[token("false", priority = 10)]
    False,

    // Delimiters and punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Assign,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Less,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    // Types are plain identifiers; `int`, `void` and `bool` are not reserved
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 3)]
    Ident(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Fun => write!(f, "keyword 'fun'"),
            Token::EndFun => write!(f, "keyword 'endfun'"),
            Token::Var => write!(f, "keyword 'var'"),
            Token::Print => write!(f, "keyword 'print'"),
            Token::If => write!(f, "keyword 'if'"),
            Token::Then => write!(f, "keyword 'then'"),
            Token::Else => write!(f, "keyword 'else'"),
            Token::EndIf => write!(f, "keyword 'endif'"),
            Token::While => write!(f, "keyword 'while'"),
            Token::Do => write!(f, "keyword 'do'"),
            Token::EndWhile => write!(f, "keyword 'endwhile'"),
            Token::Return => write!(f, "keyword 'return'"),
            Token::True => write!(f, "boolean 'true'"),
            Token::False => write!(f, "boolean 'false'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Semicolon => write!(f, "';'"),
            Token::Assign => write!(f, "'='"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Less => write!(f, "'<'"),
            Token::Integer(n) => write!(f, "integer {}", n),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
        }
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    inner: LogosLexer<'a, Token<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }

    /// Next token, or `None` at end of input. Text logos cannot match is
    /// reported as an invalid character, or an invalid number when it is a
    /// run of digits too large for an `i64`.
    pub fn next_token(&mut self) -> Option<Result<Token<'a>, ParseError>> {
        let token = self.inner.next()?;
        Some(token.map_err(|()| {
            let text = self.inner.slice();
            let position = self.inner.span().start;
            if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                ParseError::InvalidNumber {
                    position,
                    text: text.to_string(),
                }
            } else {
                ParseError::InvalidCharacter {
                    position,
                    text: text.to_string(),
                }
            }
        }))
    }

    /// Span of the token last returned by [`Lexer::next_token`]
    pub fn span(&self) -> Span {
        self.inner.span()
    }

    /// Total length of the source, used as the position of end-of-input
    pub fn source_len(&self) -> usize {
        self.inner.source().len()
    }
}
