//! Anytime solver.
//!
//! Searches a [`MatchModel`](crate::cp::MatchModel) for a maximum set of
//! matched students under a wall-clock deadline. The search runs on its
//! own thread and publishes every strictly better complete solution to a
//! shared [`Incumbent`]; the foreground thread waits for completion or the
//! deadline, then asks the search to stop and reads the incumbent.
//!
//! # Algorithm
//!
//! Depth-first branch-and-bound over students, most constrained first.
//! Each student branches on (day, type1 panel, type2 panel) over mentors
//! with remaining capacity, then on "unmatched". A node is pruned when
//!
//! ```text
//! selected + min(feasible_rest, ⌊cap₁ / n₁⌋, ⌊cap₂ / n₂⌋) ≤ best
//! ```
//!
//! The first descent is a greedy construction, so a usable incumbent
//! exists almost immediately.
//!
//! # Reference
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete
//!   Programming Problems"
//! - Zilberstein (1996), "Using Anytime Algorithms in Intelligent Systems"

mod driver;
mod incumbent;
mod search;

pub use driver::{solve_model, SearchReport};
pub use incumbent::Incumbent;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::models::MatchSet;

/// Solver timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock limit for the search.
    pub timeout: Duration,
    /// How long to wait for the search to acknowledge cancellation.
    pub grace: Duration,
    /// Emit progress at `info` instead of `debug`.
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            grace: Duration::from_secs(2),
            verbose: true,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the cancellation grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Sets verbosity.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// How a solve terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// The search space was exhausted; the result is optimal.
    Optimal,
    /// The deadline fired first; the result is the best found so far.
    Interrupted,
    /// The model admits no assignment at all.
    Unsatisfiable,
}

impl SolveStatus {
    /// Whether the result is proven optimal.
    pub fn is_optimal(self) -> bool {
        self == SolveStatus::Optimal
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Interrupted => "interrupted",
            SolveStatus::Unsatisfiable => "unsatisfiable",
        })
    }
}

/// Search counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Branches applied.
    pub nodes: u64,
    /// Strictly improving solutions recorded.
    pub improvements: usize,
    /// Wall-clock time from launch to result.
    pub elapsed: Duration,
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Extracted matches of the best solution.
    pub matches: MatchSet,
    /// Termination status.
    pub status: SolveStatus,
    /// Search counters.
    pub stats: SearchStats,
}

impl SolveOutcome {
    /// Number of matched students.
    pub fn matched(&self) -> usize {
        self.matches.len()
    }
}
