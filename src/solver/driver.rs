//! Deadline-bounded search driver.
//!
//! The search runs on a dedicated thread and reports completion over a
//! channel. The caller blocks for at most `timeout`; on expiry it raises
//! the cancel flag and waits up to `grace` for the search to reach a safe
//! point. Whatever the incumbent holds at that moment is a complete,
//! feasible solution. A search thread that panics is joined and logged
//! right away; its incumbent is still reported as interrupted.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use super::incumbent::Incumbent;
use super::search::{BranchAndBound, SearchEnd};
use super::{SearchStats, SolveStatus, SolverConfig};
use crate::cp::MatchModel;
use crate::error::Result;
use crate::models::MatchFact;

/// Raw result of one driven search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// Facts of the best recorded solution, sorted.
    pub facts: Vec<MatchFact>,
    /// Termination status.
    pub status: SolveStatus,
    /// Search counters.
    pub stats: SearchStats,
}

impl SearchReport {
    fn unsatisfiable(started: Instant) -> Self {
        Self {
            facts: Vec::new(),
            status: SolveStatus::Unsatisfiable,
            stats: SearchStats {
                elapsed: started.elapsed(),
                ..SearchStats::default()
            },
        }
    }
}

/// How the search thread was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    /// Reported its end and was joined.
    Finished(SearchEnd),
    /// Dropped its sender without reporting, i.e. panicked.
    Aborted,
    /// Still running after the grace period.
    Detached,
}

/// Waits for the search under the deadline, raising `cancel` on expiry.
/// Also returns whether the deadline expired.
fn await_search(
    handle: JoinHandle<()>,
    rx: &Receiver<SearchEnd>,
    cancel: &AtomicBool,
    config: &SolverConfig,
) -> (Completion, bool) {
    let (received, timed_out) = match rx.recv_timeout(config.timeout) {
        Err(RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            (rx.recv_timeout(config.grace), true)
        }
        other => (other, false),
    };

    let completion = match received {
        Ok(end) => {
            if let Err(payload) = handle.join() {
                tracing::error!(panic = panic_message(payload.as_ref()), "search thread panicked");
            }
            Completion::Finished(end)
        }
        Err(RecvTimeoutError::Disconnected) => {
            match handle.join() {
                Err(payload) => {
                    tracing::error!(panic = panic_message(payload.as_ref()), "search thread panicked");
                }
                Ok(()) => tracing::error!("search thread exited without reporting"),
            }
            Completion::Aborted
        }
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(
                grace_ms = config.grace.as_millis() as u64,
                "search did not stop within the grace period; detaching"
            );
            Completion::Detached
        }
    };
    (completion, timed_out)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Solves `model` under the deadline in `config`.
///
/// # Errors
/// Only if the search thread cannot be spawned.
pub fn solve_model(model: Arc<MatchModel>, config: &SolverConfig) -> Result<SearchReport> {
    let started = Instant::now();

    if let Err(defect) = model.check() {
        tracing::warn!(?defect, "model is inconsistent; reporting unsatisfiable");
        return Ok(SearchReport::unsatisfiable(started));
    }

    let incumbent = Arc::new(Incumbent::new(config.verbose));
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<SearchEnd>();

    let handle = {
        let model = Arc::clone(&model);
        let incumbent = Arc::clone(&incumbent);
        let cancel = Arc::clone(&cancel);
        thread::Builder::new()
            .name("u-match-search".into())
            .spawn(move || {
                let end = BranchAndBound::new(&model).run(&incumbent, &cancel);
                // The receiver may have given up after the grace period.
                let _ = tx.send(end);
            })?
    };

    let (completion, timed_out) = await_search(handle, &rx, &cancel, config);
    let end = match completion {
        Completion::Finished(end) => Some(end),
        Completion::Aborted | Completion::Detached => None,
    };

    let recorded = incumbent.snapshot();
    let exhausted = end.is_some_and(|e| e.exhausted);
    let status = match (exhausted, &recorded) {
        (true, Some(_)) => SolveStatus::Optimal,
        (true, None) => SolveStatus::Unsatisfiable,
        (false, _) => SolveStatus::Interrupted,
    };

    let stats = SearchStats {
        nodes: end.map_or(0, |e| e.nodes),
        improvements: incumbent.improvements(),
        elapsed: started.elapsed(),
    };
    let facts = recorded.unwrap_or_default();

    let matched = facts.iter().map(|f| f.student).collect::<BTreeSet<_>>().len();
    let elapsed_ms = stats.elapsed.as_millis() as u64;
    if config.verbose {
        tracing::info!(%status, timed_out, matched, nodes = stats.nodes, elapsed_ms, "search finished");
    } else {
        tracing::debug!(%status, timed_out, matched, nodes = stats.nodes, elapsed_ms, "search finished");
    }

    Ok(SearchReport {
        facts,
        status,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelRequirements;
    use crate::cp::{DayOption, MentorSlot, StudentVar};
    use crate::models::{Day, MentorId, StudentId};
    use std::time::Duration;

    fn model(students: usize, capacity: u32) -> MatchModel {
        let vars = (0..students)
            .map(|i| StudentVar {
                id: StudentId(i),
                days: vec![DayOption {
                    day: Day::new("mon"),
                    type1: vec![0],
                    type2: vec![],
                }],
            })
            .collect();
        MatchModel::new(
            vars,
            vec![MentorSlot {
                id: MentorId::type1(0),
                capacity,
            }],
            PanelRequirements::new(1, 0),
        )
    }

    fn config() -> SolverConfig {
        SolverConfig::new()
            .with_timeout(Duration::from_secs(10))
            .with_verbose(false)
    }

    #[test]
    fn test_small_model_is_optimal() {
        let report = solve_model(Arc::new(model(3, 2)), &config()).unwrap();
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.facts.len(), 2);
        assert!(report.stats.improvements >= 1);
        assert!(report.stats.nodes > 0);
    }

    #[test]
    fn test_inconsistent_model_is_unsatisfiable() {
        let mut m = model(2, 1);
        m.students[0].days[0].type1 = vec![7];
        let report = solve_model(Arc::new(m), &config()).unwrap();
        assert_eq!(report.status, SolveStatus::Unsatisfiable);
        assert!(report.facts.is_empty());
    }

    #[test]
    fn test_panicked_search_is_joined_without_waiting() {
        let (tx, rx) = mpsc::channel::<SearchEnd>();
        let handle: JoinHandle<()> = thread::spawn(move || {
            let _tx = tx;
            panic!("search failed");
        });
        let cancel = AtomicBool::new(false);
        let started = Instant::now();

        let (completion, timed_out) = await_search(handle, &rx, &cancel, &config());
        assert_eq!(completion, Completion::Aborted);
        assert!(!timed_out);
        assert!(!cancel.load(Ordering::Relaxed));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_unresponsive_search_is_detached() {
        let (tx, rx) = mpsc::channel::<SearchEnd>();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            drop(tx);
        });
        let cancel = AtomicBool::new(false);
        let config = config()
            .with_timeout(Duration::from_millis(10))
            .with_grace(Duration::from_millis(10));

        let (completion, timed_out) = await_search(handle, &rx, &cancel, &config);
        assert_eq!(completion, Completion::Detached);
        assert!(timed_out);
        assert!(cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_zero_capacity_is_optimal_and_empty() {
        let report = solve_model(Arc::new(model(2, 0)), &config()).unwrap();
        assert_eq!(report.status, SolveStatus::Optimal);
        assert!(report.facts.is_empty());
    }
}
