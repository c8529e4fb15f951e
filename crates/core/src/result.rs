//! Solution status, optimality gap and summary types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a solve terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolutionStatus {
    /// The search space was exhausted; the solution is proven optimal.
    Optimal,
    /// A feasible solution was found but the budget ran out first.
    Feasible,
    /// The search was exhausted without any acceptable solution.
    Infeasible,
    /// The budget ran out before any acceptable solution was found.
    Timeout,
}

impl SolutionStatus {
    /// Returns true if the report carries a usable assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal)
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal"),
            Self::Feasible => write!(f, "Feasible"),
            Self::Infeasible => write!(f, "Infeasible"),
            Self::Timeout => write!(f, "Timeout"),
        }
    }
}

/// Relative optimality gap `(bound - objective) / |bound|`, clamped to `[0, 1]`
/// when the bound is positive.
///
/// Returns 0 when the bound does not exceed the objective. For a bound of
/// (almost) zero the absolute difference is returned instead.
pub fn relative_gap(objective: f64, upper_bound: f64) -> f64 {
    let diff = upper_bound - objective;
    if diff <= 1e-9 * upper_bound.abs().max(1.0) {
        return 0.0;
    }
    if upper_bound.abs() < 1e-12 {
        return diff;
    }
    let gap = diff / upper_bound.abs();
    if upper_bound > 0.0 {
        gap.min(1.0)
    } else {
        gap
    }
}

/// Summary statistics for a solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// Items in the catalog (after validation).
    pub total_items: usize,
    /// Items loaded on a carrier.
    pub total_placed: usize,
    /// Carriers holding at least one item.
    pub carriers_used: usize,
    /// Objective value of the solution.
    pub objective: f64,
    /// Relative optimality gap.
    pub gap: f64,
    /// Volume utilization over used carriers, in percent.
    pub volume_utilization_percent: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Termination status.
    pub status: SolutionStatus,
}
