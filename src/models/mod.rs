//! Matching domain models.
//!
//! Provides the entity types consumed by the matching pipeline and the
//! match set it produces. Entities are built once per solve from
//! immutable input tables and are read-only during the search.
//!
//! # Domain Mappings
//!
//! | u-match | Thesis supervision | Internship program | Review board |
//! |---------|--------------------|--------------------|--------------|
//! | Student | Graduate student | Intern | Submission |
//! | Mentor (type1) | Supervisor | Company mentor | Reviewer |
//! | Mentor (type2) | External examiner | School coach | Chair |
//! | Day | Defense day | Visit day | Session |

mod candidate;
mod day;
mod matching;
mod mentor;
mod student;

pub use candidate::{is_eligible, Candidate};
pub use day::Day;
pub(crate) use day::day_set;
pub use matching::{MatchFact, MatchRecord, MatchSet, MatchedMentor, StudentMatch};
pub use mentor::{Mentor, MentorDisplay, MentorId, MentorType};
pub use student::{Student, StudentDisplay, StudentId};
