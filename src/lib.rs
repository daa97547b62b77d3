//! Student–mentor panel matching.
//!
//! Assigns each student a day and a panel of mentors (a fixed number of
//! type1 mentors, optionally type2 mentors) such that every mentor on the
//! panel has a higher education level, covers the student's subject, is
//! available that day, and stays within its capacity. The number of
//! matched students is maximized by an anytime search that always returns
//! its best complete solution when the deadline expires.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Student`, `Mentor`, `Day`, `Candidate`,
//!   `StudentMatch`, `MatchSet`
//! - **`config`**: `EngineConfig`, `EducationMapping`, `PanelRequirements`
//! - **`ingest`**: CSV readers, list-cell parser, entity builder, subject
//!   classification
//! - **`candidates`**: Eligible (student, mentor, day) triples
//! - **`cp`**: Constraint model over day options and mentor capacities
//! - **`solver`**: Deadline-bounded branch-and-bound with a shared incumbent
//! - **`extract`** / **`export`**: Facts → grouped matches → CSV table
//! - **`validation`**: Post-hoc checks of any match set
//! - **`metrics`**: Match rate, utilization, solve time, stability
//! - **`generator`**: Seeded synthetic cohorts
//! - **`engine`**: `MatchingEngine` facade
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use u_match::config::EngineConfig;
//! use u_match::engine::MatchingEngine;
//! use u_match::generator::CohortGenerator;
//!
//! let cohort = CohortGenerator::new(1).with_students(12).with_mentors(8).generate();
//! let engine = MatchingEngine::new(
//!     &cohort.students,
//!     &cohort.mentors_type1,
//!     None,
//!     EngineConfig::new().with_n_type1(1).with_verbose(false),
//! )
//! .unwrap();
//! let outcome = engine.solve(Duration::from_secs(5)).unwrap();
//! assert!(engine.validate(&outcome.matches).is_ok());
//! ```
//!
//! # References
//!
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete
//!   Programming Problems"
//! - Rossi, van Beek, Walsh (2006), "Handbook of Constraint Programming"

pub mod candidates;
pub mod config;
pub mod cp;
pub mod engine;
pub mod error;
pub mod export;
pub mod extract;
pub mod generator;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod solver;
pub mod validation;

pub use error::{MatchError, Result};
