//! Core types and data structures for Hoist
//!
//! This crate provides the building blocks shared by the rest of the
//! workspace:
//! - AST representation of the imperative language
//! - Structural validation of trees
//! - The unparser that renders a tree back to source text
//! - Error types

pub mod ast;
pub mod error;
pub mod unparser;

pub use ast::{BinOp, Body, Expr, FunctionDecl, Param, Program, ReturnType, Statement, Type, VarDecl};
pub use error::{Error, Result};
pub use unparser::{render, Unparser};
