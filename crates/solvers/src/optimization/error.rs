use super::EvalError;

/// Errors that can occur during an optimization search.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model error: {0}")]
    Model(Box<dyn std::error::Error + Send + Sync>),

    #[error("problem error: {0}")]
    Problem(Box<dyn std::error::Error + Send + Sync>),

    #[error("dimension mismatch: problem has {expected} variable(s), got {found}")]
    Dimension { expected: usize, found: usize },

    #[error("objective is not finite at the evaluated point ({objective})")]
    NonFiniteObjective { objective: f64 },
}

impl<ME, PE> From<EvalError<ME, PE>> for Error
where
    ME: std::error::Error + Send + Sync + 'static,
    PE: std::error::Error + Send + Sync + 'static,
{
    fn from(error: EvalError<ME, PE>) -> Self {
        match error {
            EvalError::Model(e) => Self::Model(Box::new(e)),
            EvalError::Problem(e) => Self::Problem(Box::new(e)),
            EvalError::NonFiniteObjective(objective) => Self::NonFiniteObjective { objective },
        }
    }
}
