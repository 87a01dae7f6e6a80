use thiserror::Error;

/// Configuration for the quasi-Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    max_evals: usize,
    grad_tol: f64,
    step_tol: f64,
    fd_step: f64,
}

/// Errors that can occur when validating a quasi-Newton solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_evals must be at least 1")]
    MaxEvals,

    #[error("grad_tol must be finite and positive")]
    GradTol,

    #[error("step_tol must be finite and non-negative")]
    StepTol,

    #[error("fd_step must be finite and positive")]
    FdStep,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 200,
            max_evals: 10_000,
            grad_tol: 1e-6,
            step_tol: 1e-12,
            fd_step: 1e-6,
        }
    }
}

impl Config {
    /// Creates a new config with validated limits.
    ///
    /// The step tolerance and finite-difference step keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_evals` is zero or `grad_tol` is not a finite
    /// positive number.
    pub fn new(max_iters: usize, max_evals: usize, grad_tol: f64) -> Result<Self, ConfigError> {
        if max_evals == 0 {
            return Err(ConfigError::MaxEvals);
        }
        if !grad_tol.is_finite() || grad_tol <= 0.0 {
            return Err(ConfigError::GradTol);
        }

        Ok(Self {
            max_iters,
            max_evals,
            grad_tol,
            ..Self::default()
        })
    }

    /// Returns a copy with a different step tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `step_tol` is negative or non-finite.
    pub fn with_step_tol(self, step_tol: f64) -> Result<Self, ConfigError> {
        if !step_tol.is_finite() || step_tol < 0.0 {
            return Err(ConfigError::StepTol);
        }
        Ok(Self { step_tol, ..self })
    }

    /// Returns a copy with a different relative finite-difference step.
    ///
    /// # Errors
    ///
    /// Returns an error if `fd_step` is not a finite positive number.
    pub fn with_fd_step(self, fd_step: f64) -> Result<Self, ConfigError> {
        if !fd_step.is_finite() || fd_step <= 0.0 {
            return Err(ConfigError::FdStep);
        }
        Ok(Self { fd_step, ..self })
    }

    /// Returns the maximum number of accepted steps.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the maximum number of objective evaluations.
    #[must_use]
    pub fn max_evals(&self) -> usize {
        self.max_evals
    }

    /// Returns the projected-gradient tolerance.
    #[must_use]
    pub fn grad_tol(&self) -> f64 {
        self.grad_tol
    }

    /// Returns the relative step-length tolerance.
    #[must_use]
    pub fn step_tol(&self) -> f64 {
        self.step_tol
    }

    /// Returns the relative finite-difference step.
    #[must_use]
    pub fn fd_step(&self) -> f64 {
        self.fd_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(Config::new(10, 0, 1e-6), Err(ConfigError::MaxEvals));
        assert_eq!(Config::new(10, 10, 0.0), Err(ConfigError::GradTol));
        assert_eq!(Config::new(10, 10, f64::NAN), Err(ConfigError::GradTol));
        assert_eq!(
            Config::default().with_step_tol(-1.0),
            Err(ConfigError::StepTol)
        );
        assert_eq!(
            Config::default().with_fd_step(f64::INFINITY),
            Err(ConfigError::FdStep)
        );
    }

    #[test]
    fn new_keeps_default_step_settings() {
        let config = Config::new(5, 50, 1e-8).unwrap();
        assert_eq!(config.max_iters(), 5);
        assert_eq!(config.step_tol(), Config::default().step_tol());
        assert_eq!(config.fd_step(), Config::default().fd_step());
    }
}
