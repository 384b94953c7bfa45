use std::fmt;

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationStatus {
    Optimal,
    MaxIterations,
    LineSearchFailed,
    SingularJacobian,
    NonFiniteResidual,
}

impl TerminationStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, TerminationStatus::Optimal)
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminationStatus::Optimal => "optimal",
            TerminationStatus::MaxIterations => "maximum iterations exceeded",
            TerminationStatus::LineSearchFailed => "line search failed",
            TerminationStatus::SingularJacobian => "singular jacobian",
            TerminationStatus::NonFiniteResidual => "non-finite residual",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    pub status: TerminationStatus,
    pub iterations: usize,
    /// Largest scaled residual at the returned point.
    pub residual: f64,
    pub unknowns: usize,
}

impl SolveReport {
    pub fn trivial() -> Self {
        Self {
            status: TerminationStatus::Optimal,
            iterations: 0,
            residual: 0.0,
            unknowns: 0,
        }
    }
}
