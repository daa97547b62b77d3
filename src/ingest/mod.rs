//! Input ingestion.
//!
//! Reads student and mentor tables, parses list-valued cells, optionally
//! classifies blank subjects, and builds typed entities.
//!
//! ```text
//! CSV ─▶ records ─▶ (classify) ─▶ EntityBuilder ─▶ Entities
//! ```

mod builder;
mod cell;
mod classify;
mod records;

pub use builder::{normalize_token, Entities, EntityBuilder};
pub use cell::{Cell, CellError};
pub use classify::{annotate_subjects, Classification, KeywordClassifier, SubjectClassifier};
pub use records::{
    read_mentors, read_mentors_file, read_students, read_students_file, MentorRecord,
    StudentRecord, MENTORS_TYPE1_TABLE, MENTORS_TYPE2_TABLE, STUDENTS_TABLE,
};
