//! Flat result table export.
//!
//! One row per matched student:
//!
//! | Student | Day | Mentors_Type1 | Mentors_Type2 |
//! |---------|-----|---------------|---------------|
//! | Ada Lovelace | Mon | Grace Hopper; Edsger Dijkstra | Barbara Liskov |
//!
//! Zero matches write nothing; the caller gets
//! [`ExportOutcome::NothingToExport`] instead of an empty file.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{MatchSet, MatchedMentor, StudentMatch};

/// Separator between mentor names in one cell.
pub const NAME_SEPARATOR: &str = "; ";

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Student display name.
    #[serde(rename = "Student")]
    pub student: String,
    /// Capitalized day.
    #[serde(rename = "Day")]
    pub day: String,
    /// Type1 mentor names.
    #[serde(rename = "Mentors_Type1")]
    pub mentors_type1: String,
    /// Type2 mentor names, empty when none.
    #[serde(rename = "Mentors_Type2")]
    pub mentors_type2: String,
}

impl From<&StudentMatch> for ExportRow {
    fn from(m: &StudentMatch) -> Self {
        Self {
            student: m.student.full_name(),
            day: m.day.capitalized(),
            mentors_type1: join_names(&m.type1_mentors),
            mentors_type2: join_names(&m.type2_mentors),
        }
    }
}

fn join_names(mentors: &[MatchedMentor]) -> String {
    mentors
        .iter()
        .map(|m| m.display.full_name())
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR)
}

/// What an export did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A table was written.
    Written {
        /// Destination.
        path: PathBuf,
        /// Data rows written (excluding the header).
        rows: usize,
    },
    /// There were no matches; no file was created.
    NothingToExport,
}

/// Rows in export order.
pub fn export_rows(matches: &MatchSet) -> Vec<ExportRow> {
    matches.matches.iter().map(ExportRow::from).collect()
}

/// Writes the table to any writer. Returns the number of data rows.
///
/// Unlike [`export_matches`], an empty set still produces a header.
pub fn write_matches<W: Write>(matches: &MatchSet, writer: W) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    let rows = export_rows(matches);
    if rows.is_empty() {
        csv.write_record(["Student", "Day", "Mentors_Type1", "Mentors_Type2"])?;
    }
    for row in &rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(rows.len())
}

/// Writes the table to `path`, creating parent directories as needed.
pub fn export_matches(matches: &MatchSet, path: impl AsRef<Path>) -> Result<ExportOutcome> {
    let path = path.as_ref();
    if matches.is_empty() {
        tracing::info!(path = %path.display(), "no matches to export");
        return Ok(ExportOutcome::NothingToExport);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let rows = write_matches(matches, file)?;

    tracing::info!(path = %path.display(), rows, "exported matches");
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, MentorDisplay, MentorId, StudentDisplay, StudentId};

    fn mentor(id: MentorId, first: &str, last: &str) -> MatchedMentor {
        MatchedMentor {
            id,
            display: MentorDisplay {
                first_name: first.into(),
                last_name: last.into(),
                education_label: "PhD".into(),
            },
        }
    }

    fn sample() -> MatchSet {
        MatchSet {
            matches: vec![StudentMatch {
                student_id: StudentId(0),
                student: StudentDisplay {
                    first_name: "Ada".into(),
                    last_name: "Lovelace".into(),
                    ..Default::default()
                },
                day: Day::new("mon"),
                type1_mentors: vec![
                    mentor(MentorId::type1(0), "Grace", "Hopper"),
                    mentor(MentorId::type1(1), "Edsger", "Dijkstra"),
                ],
                type2_mentors: vec![],
            }],
            facts: vec![],
        }
    }

    #[test]
    fn test_write_matches() {
        let mut out = Vec::new();
        let rows = write_matches(&sample(), &mut out).unwrap();
        assert_eq!(rows, 1);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Student,Day,Mentors_Type1,Mentors_Type2\nAda Lovelace,Mon,Grace Hopper; Edsger Dijkstra,\n"
        );
    }

    #[test]
    fn test_export_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DATASETS").join("matches.csv");
        let outcome = export_matches(&sample(), &path).unwrap();
        assert_eq!(
            outcome,
            ExportOutcome::Written {
                path: path.clone(),
                rows: 1
            }
        );

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<ExportRow> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows, export_rows(&sample()));
    }

    #[test]
    fn test_nothing_to_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        let outcome = export_matches(&MatchSet::new(), &path).unwrap();
        assert_eq!(outcome, ExportOutcome::NothingToExport);
        assert!(!path.exists());
    }
}
