use serde::Serialize;
use thiserror::Error;

/// Errors produced while assembling or solving a problem.
///
/// Everything except [`ProblemError::Numerical`] and [`ProblemError::TimedOut`]
/// is raised before the solver runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProblemError {
    #[error("{0}")]
    Validation(String),

    #[error("{location} references unknown identifier `{reference}`")]
    UnresolvedReference { reference: String, location: String },

    #[error("id `{id}` is declared more than once")]
    DuplicateId { id: String },

    #[error("component inputs `{first}` and `{second}` both bind to independent `{independent}`")]
    AmbiguousWiring {
        independent: String,
        first: String,
        second: String,
    },

    #[error("optimizer `{name}` is not supported (expected SLSQP or Nelder-Mead)")]
    UnsupportedOptimizer { name: String },

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error("solve did not finish before its deadline")]
    TimedOut,
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    UnresolvedReference,
    DuplicateId,
    AmbiguousWiring,
    UnsupportedOptimizer,
    Numerical,
    TimedOut,
}

impl ErrorKind {
    /// Returns the camelCase name used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::UnresolvedReference => "unresolvedReference",
            Self::DuplicateId => "duplicateId",
            Self::AmbiguousWiring => "ambiguousWiring",
            Self::UnsupportedOptimizer => "unsupportedOptimizer",
            Self::Numerical => "numerical",
            Self::TimedOut => "timedOut",
        }
    }
}

impl ProblemError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn unresolved(reference: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            location: location.into(),
        }
    }

    pub(crate) fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::DuplicateId { .. } => ErrorKind::DuplicateId,
            Self::AmbiguousWiring { .. } => ErrorKind::AmbiguousWiring,
            Self::UnsupportedOptimizer { .. } => ErrorKind::UnsupportedOptimizer,
            Self::Numerical(_) => ErrorKind::Numerical,
            Self::TimedOut => ErrorKind::TimedOut,
        }
    }

    /// Returns `true` for errors detected before any model evaluation.
    #[must_use]
    pub fn is_fail_fast(&self) -> bool {
        !matches!(self, Self::Numerical(_) | Self::TimedOut)
    }
}
