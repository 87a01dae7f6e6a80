use std::fmt;

/// Lifecycle of a single solve.
///
/// `Built`, `Wired` and `DriverAttached` correspond to the
/// [`BuiltModel`](crate::BuiltModel), [`WiredModel`](crate::WiredModel) and
/// [`AttachedProblem`](crate::AttachedProblem) types; a value of each type
/// can only be obtained by completing the previous phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Built,
    Wired,
    DriverAttached,
    Solving,
    Converged,
    NotConverged,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Built => "built",
            Self::Wired => "wired",
            Self::DriverAttached => "driver-attached",
            Self::Solving => "solving",
            Self::Converged => "converged",
            Self::NotConverged => "not-converged",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
