use mdao_core::Snapshot;

/// Indicates why the solver finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// Reached the evaluation budget without converging.
    MaxEvals,

    /// No further progress was possible before the tolerances were met.
    Stalled,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

impl Status {
    /// Returns `true` only for [`Status::Converged`].
    #[must_use]
    pub fn is_converged(self) -> bool {
        matches!(self, Self::Converged)
    }
}

/// The result of an optimization search.
///
/// `x`, `objective` and `snapshot` describe the best point evaluated, which is
/// also the final iterate whenever the solver converged.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// Final solver status.
    pub status: Status,

    /// Best point found.
    pub x: Vec<f64>,

    /// Objective value at `x`.
    pub objective: f64,

    /// Model input and output at `x`.
    pub snapshot: Snapshot<I, O>,

    /// Iteration count when the solver finished.
    pub iters: usize,

    /// Number of objective evaluations performed.
    pub evals: usize,
}
