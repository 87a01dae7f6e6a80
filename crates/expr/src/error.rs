use thiserror::Error;

/// Errors produced while tokenizing or parsing an expression.
///
/// Offsets are byte positions into the source string.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected character `{ch}` at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number `{text}` at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("expected {expected} at offset {offset}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unknown function `{name}` at offset {offset}")]
    UnknownFunction { name: String, offset: usize },

    #[error("function `{name}` takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("expression defines no outputs")]
    Empty,

    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Error returned when a free identifier cannot be bound to an input slot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("identifier `{name}` is not bound to any input")]
pub struct BindError {
    pub name: String,
}

/// Errors produced while evaluating a bound program.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("input slot {slot} is out of range for {len} value(s)")]
    MissingInput { slot: usize, len: usize },

    #[error("function `{name}` takes {expected} argument(s), got {found}")]
    Arity {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("evaluating output `{output}` produced a non-finite value ({value})")]
    NonFinite { output: String, value: f64 },
}
