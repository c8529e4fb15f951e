//! Solver traits and configuration.

use crate::Result;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the search treats items left off every carrier.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnassignedPolicy {
    /// Leaving an item unassigned costs nothing beyond its lost value.
    #[default]
    Allow,
    /// Each unassigned item subtracts this amount from the objective.
    Penalty(f64),
    /// Every loadable item must be assigned (hard requirement).
    Forbid,
}

impl UnassignedPolicy {
    /// Returns the objective penalty for one unassigned item.
    pub fn penalty(&self) -> f64 {
        match self {
            Self::Penalty(p) => *p,
            Self::Allow | Self::Forbid => 0.0,
        }
    }

    /// Returns true if unassigned items are forbidden.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbid)
    }
}

/// Ordering among solutions with equal objective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TieBreakPolicy {
    /// Prefer fewer carriers used, then the lowest (item id, carrier) sequence.
    #[default]
    FewestCarriersThenLowestId,
    /// Prefer the lowest (item id, carrier) sequence only.
    LowestId,
}

/// How malformed input records are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValidationMode {
    /// Reject malformed records individually and continue.
    #[default]
    Lenient,
    /// Fail the whole batch on the first malformed record.
    Strict,
}

/// Common configuration for solvers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum computation time in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Maximum number of search nodes to expand (None = unlimited).
    pub max_nodes: Option<u64>,

    /// Treatment of unassigned items.
    pub unassigned_policy: UnassignedPolicy,

    /// Ordering among equal-objective solutions.
    pub tie_break_policy: TieBreakPolicy,

    /// Treatment of malformed input records.
    pub validation_mode: ValidationMode,

    /// Number of search workers (0 = auto).
    pub threads: usize,

    /// Whether identical empty carriers are explored only once.
    pub symmetry_breaking: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_limit_ms: 30000,
            max_nodes: None,
            unassigned_policy: UnassignedPolicy::default(),
            tie_break_policy: TieBreakPolicy::default(),
            validation_mode: ValidationMode::default(),
            threads: 0,
            symmetry_breaking: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the node budget.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    /// Sets the unassigned-item policy.
    pub fn with_unassigned_policy(mut self, policy: UnassignedPolicy) -> Self {
        self.unassigned_policy = policy;
        self
    }

    /// Sets the tie-break policy.
    pub fn with_tie_break(mut self, policy: TieBreakPolicy) -> Self {
        self.tie_break_policy = policy;
        self
    }

    /// Sets the validation mode.
    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    /// Sets the number of search workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enables or disables carrier symmetry breaking.
    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.symmetry_breaking = enabled;
        self
    }

    /// Returns the time budget, or `None` when unlimited.
    pub fn time_budget(&self) -> Option<Duration> {
        (self.time_limit_ms > 0).then(|| Duration::from_millis(self.time_limit_ms))
    }

    /// Returns the effective worker count.
    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }

    /// Checks the configuration for values the solver cannot use.
    pub fn validate(&self) -> Result<()> {
        if let UnassignedPolicy::Penalty(p) = self.unassigned_policy {
            if !p.is_finite() || p < 0.0 {
                return Err(crate::Error::Config(format!(
                    "unassigned penalty must be finite and non-negative, got {}",
                    p
                )));
            }
        }
        if self.max_nodes == Some(0) {
            return Err(crate::Error::Config("node budget must be positive".into()));
        }
        Ok(())
    }
}

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information during solving.
#[derive(Debug, Clone, Default)]
pub struct ProgressInfo {
    /// Nodes expanded so far.
    pub nodes_explored: u64,
    /// Objective value of the current incumbent.
    pub best_objective: f64,
    /// Current upper bound on the optimum.
    pub upper_bound: f64,
    /// Number of items placed by the incumbent.
    pub items_placed: usize,
    /// Total number of items.
    pub total_items: usize,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase/stage description.
    pub phase: String,
    /// Whether the solver is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the node count.
    pub fn with_nodes(mut self, nodes: u64) -> Self {
        self.nodes_explored = nodes;
        self
    }

    /// Sets the incumbent objective and the upper bound.
    pub fn with_objective(mut self, objective: f64, upper_bound: f64) -> Self {
        self.best_objective = objective;
        self.upper_bound = upper_bound;
        self
    }

    /// Sets the items placed info.
    pub fn with_items(mut self, placed: usize, total: usize) -> Self {
        self.items_placed = placed;
        self.total_items = total;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the solver as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Returns the relative optimality gap of the reported values.
    pub fn gap(&self) -> f64 {
        crate::result::relative_gap(self.best_objective, self.upper_bound)
    }
}

/// Trait for loading solvers.
pub trait Solver {
    /// The problem input.
    type Input;
    /// The solution produced.
    type Output;

    /// Solves the loading problem.
    fn solve(&self, input: &Self::Input) -> Result<Self::Output>;

    /// Solves with a progress callback.
    fn solve_with_progress(
        &self,
        input: &Self::Input,
        callback: ProgressCallback,
    ) -> Result<Self::Output>;

    /// Cancels an ongoing solve operation.
    fn cancel(&self);
}
