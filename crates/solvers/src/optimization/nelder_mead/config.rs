use thiserror::Error;

/// Configuration for the simplex solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    max_evals: usize,
    f_tol: f64,
    x_tol: f64,
}

/// Errors that can occur when validating a simplex solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_evals must be at least 1")]
    MaxEvals,

    #[error("f_tol must be finite and non-negative")]
    FTol,

    #[error("x_tol must be finite and non-negative")]
    XTol,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 200,
            max_evals: 10_000,
            f_tol: 1e-6,
            x_tol: 1e-6,
        }
    }
}

impl Config {
    /// Creates a new config using `tol` for both the objective and the
    /// vertex spread.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_evals` is zero or `tol` is negative or
    /// non-finite.
    pub fn new(max_iters: usize, max_evals: usize, tol: f64) -> Result<Self, ConfigError> {
        if max_evals == 0 {
            return Err(ConfigError::MaxEvals);
        }
        if !tol.is_finite() || tol < 0.0 {
            return Err(ConfigError::FTol);
        }

        Ok(Self {
            max_iters,
            max_evals,
            f_tol: tol,
            x_tol: tol,
        })
    }

    /// Returns a copy with a different vertex-spread tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `x_tol` is negative or non-finite.
    pub fn with_x_tol(self, x_tol: f64) -> Result<Self, ConfigError> {
        if !x_tol.is_finite() || x_tol < 0.0 {
            return Err(ConfigError::XTol);
        }
        Ok(Self { x_tol, ..self })
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn max_evals(&self) -> usize {
        self.max_evals
    }

    #[must_use]
    pub fn f_tol(&self) -> f64 {
        self.f_tol
    }

    #[must_use]
    pub fn x_tol(&self) -> f64 {
        self.x_tol
    }
}
