/// Defines a minimization problem to be solved.
///
/// A problem maps solver variables to a model input, then computes an
/// objective value from the model input and output. Solvers search for the
/// input that minimizes the objective.
///
/// Unlike a fixed-size problem, the number of solver variables is only known
/// at runtime, so `x` is a slice whose length equals [`Self::dimension`].
pub trait OptimizationProblem {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the number of solver variables.
    fn dimension(&self) -> usize;

    /// Maps solver variables (`x`) into a model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be constructed from `x`.
    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::Error>;

    /// Computes an objective value from model input/output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the objective cannot be computed.
    fn objective(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error>;
}
