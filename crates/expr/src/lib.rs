//! Algebraic expressions for declarative components.
//!
//! A component is described by one or more assignments such as
//! `f = (x-3)^2 + x*y + (y+4)^2 - 3`. Each assignment defines a named output
//! from an expression over free identifiers, which are later bound to the
//! component's inputs.
//!
//! Parsing and evaluation are split in two steps:
//!
//! - [`Program::parse`] tokenizes and parses the source, keeping identifiers
//!   as names so callers can inspect [`Program::inputs`] and [`Program::outputs`].
//! - [`Program::bind`] resolves each free identifier to a slot index, producing
//!   a [`BoundProgram`] that evaluates against a plain `&[f64]`.
//!
//! Operator precedence follows standard arithmetic: `^` (or `**`) binds
//! tightest and is right-associative, then unary `+`/`-`, then `*`/`/`, then
//! `+`/`-`. A leading minus does not bind tighter than an exponent, so
//! `-x^2` is `-(x^2)`.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;
mod program;

pub use ast::{BinaryOp, Expr, Function};
pub use error::{BindError, EvalError, ParseError};
pub use program::{Assignment, BoundProgram, Program};
