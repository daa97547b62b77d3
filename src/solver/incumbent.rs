//! Shared best-solution cell.
//!
//! Written only by the search thread, read by the driver once the search
//! has stopped or been abandoned. The lock is held only for the final
//! compare-and-swap; the atomics let the search compare against the best
//! value without locking.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::models::MatchFact;

/// Best complete solution recorded so far.
#[derive(Debug, Default)]
pub struct Incumbent {
    facts: Mutex<Option<Vec<MatchFact>>>,
    has_solution: AtomicBool,
    best_matched: AtomicUsize,
    improvements: AtomicUsize,
    verbose: bool,
}

impl Incumbent {
    /// Creates an empty cell. `verbose` promotes improvement events to `info`.
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    /// Matched count of the recorded solution, if any, without locking.
    #[inline]
    pub fn peek(&self) -> Option<usize> {
        if self.has_solution.load(Ordering::Acquire) {
            Some(self.best_matched.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Whether a solution with `matched` students would replace the record.
    ///
    /// The first solution always qualifies; afterwards only strictly
    /// better ones do.
    #[inline]
    pub fn improves(&self, matched: usize) -> bool {
        self.peek().map_or(true, |best| matched > best)
    }

    /// Records a complete, feasible solution if it is strictly better.
    ///
    /// `facts` is only called when the solution is accepted. `unmatched`
    /// is reported as the cost of the solution.
    pub fn try_update(
        &self,
        matched: usize,
        unmatched: usize,
        facts: impl FnOnce() -> Vec<MatchFact>,
    ) -> bool {
        if !self.improves(matched) {
            return false;
        }

        let mut guard = self.facts.lock();
        if guard.is_some() && matched <= self.best_matched.load(Ordering::Acquire) {
            return false;
        }

        *guard = Some(facts());
        self.best_matched.store(matched, Ordering::Release);
        self.has_solution.store(true, Ordering::Release);
        let n = self.improvements.fetch_add(1, Ordering::AcqRel) + 1;

        if self.verbose {
            tracing::info!(matched, cost = unmatched, improvement = n, "new best solution");
        } else {
            tracing::debug!(matched, cost = unmatched, improvement = n, "new best solution");
        }
        true
    }

    /// Number of accepted improvements.
    pub fn improvements(&self) -> usize {
        self.improvements.load(Ordering::Acquire)
    }

    /// Copy of the recorded facts.
    pub fn snapshot(&self) -> Option<Vec<MatchFact>> {
        self.facts.lock().clone()
    }
}
