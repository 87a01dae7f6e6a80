/// Events emitted by the optimization solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    /// The objective was evaluated at `x`.
    ///
    /// Emitted for every model call, including finite-difference steps.
    Evaluated {
        /// The evaluated point.
        x: &'a [f64],

        /// Objective value at `x`.
        objective: f64,

        /// Number of evaluations so far, including this one.
        evals: usize,
    },

    /// An iteration finished and moved the current iterate.
    Iterated {
        /// Iteration counter (1-based).
        iter: usize,

        /// The current iterate.
        x: &'a [f64],

        /// Objective value at the current iterate.
        objective: f64,
    },
}

impl Event<'_> {
    /// Returns the point the event refers to.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        match self {
            Self::Evaluated { x, .. } | Self::Iterated { x, .. } => x,
        }
    }

    /// Returns the objective value at [`Self::x`].
    #[must_use]
    pub fn objective(&self) -> f64 {
        match self {
            Self::Evaluated { objective, .. } | Self::Iterated { objective, .. } => *objective,
        }
    }
}
