//! Raw input rows and CSV readers.
//!
//! Column names follow the Dutch spreadsheet headers (`Voornaam`,
//! `Opleidingsniveau`, ...) with English aliases accepted as well.
//! Required headers are checked before any row is read.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

use super::cell::Cell;
use crate::error::{MatchError, Result};

/// Table name used in errors for the students table.
pub const STUDENTS_TABLE: &str = "students";
/// Table name used in errors for the type1 mentors table.
pub const MENTORS_TYPE1_TABLE: &str = "mentors_type1";
/// Table name used in errors for the type2 mentors table.
pub const MENTORS_TYPE2_TABLE: &str = "mentors_type2";

/// One row of the students table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// First name.
    #[serde(rename = "Voornaam", alias = "first_name")]
    pub first_name: String,
    /// Last name.
    #[serde(rename = "Achternaam", alias = "last_name")]
    pub last_name: String,
    /// Education label (resolved through the education mapping).
    #[serde(rename = "Opleidingsniveau", alias = "education")]
    pub education: String,
    /// Subject label. May be blank when a classifier fills it in.
    #[serde(rename = "Onderwerp", alias = "subject", default)]
    pub subject: String,
    /// Availability list.
    #[serde(rename = "Beschikbaarheid", alias = "availability")]
    pub availability: Cell,
    /// Free-text assignment description, input for subject classification.
    #[serde(rename = "omschrijving", alias = "description", default)]
    pub description: Option<String>,
}

impl StudentRecord {
    /// Creates a record with the given fields and no description.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        education: impl Into<String>,
        subject: impl Into<String>,
        availability: impl Into<Cell>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            education: education.into(),
            subject: subject.into(),
            availability: availability.into(),
            description: None,
        }
    }

    /// Sets the free-text description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One row of a mentors table (either pool).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentorRecord {
    /// First name.
    #[serde(rename = "Voornaam", alias = "first_name")]
    pub first_name: String,
    /// Last name.
    #[serde(rename = "Achternaam", alias = "last_name")]
    pub last_name: String,
    /// Education label.
    #[serde(rename = "Opleidingsniveau", alias = "education")]
    pub education: String,
    /// Subject list.
    #[serde(rename = "Onderwerpen", alias = "subjects")]
    pub subjects: Cell,
    /// Availability list.
    #[serde(rename = "Beschikbaarheid", alias = "availability")]
    pub availability: Cell,
    /// Capacity as read; validated non-negative by the entity builder.
    #[serde(
        rename = "Max_Studenten",
        alias = "max_students",
        deserialize_with = "deserialize_capacity"
    )]
    pub max_students: i64,
}

impl MentorRecord {
    /// Creates a record with the given fields.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        education: impl Into<String>,
        subjects: impl Into<Cell>,
        availability: impl Into<Cell>,
        max_students: i64,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            education: education.into(),
            subjects: subjects.into(),
            availability: availability.into(),
            max_students,
        }
    }
}

/// Accepts integers, integral floats (`3.0`), and numeric strings.
fn deserialize_capacity<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CapacityVisitor;

    impl Visitor<'_> for CapacityVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer capacity")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("capacity {v} out of range")))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<i64, E> {
            if v.fract() == 0.0 && v.is_finite() {
                Ok(v as i64)
            } else {
                Err(E::custom(format!("capacity {v} is not an integer")))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<i64, E> {
            let t = v.trim();
            if let Ok(n) = t.parse::<i64>() {
                return Ok(n);
            }
            match t.parse::<f64>() {
                Ok(f) => self.visit_f64(f),
                Err(_) => Err(E::custom(format!("capacity '{v}' is not a number"))),
            }
        }
    }

    deserializer.deserialize_any(CapacityVisitor)
}

struct RequiredColumn {
    canonical: &'static str,
    aliases: &'static [&'static str],
}

const fn col(canonical: &'static str, aliases: &'static [&'static str]) -> RequiredColumn {
    RequiredColumn { canonical, aliases }
}

// The subject may be filled in later from the description, so either will do.
const STUDENT_COLUMNS: &[RequiredColumn] = &[
    col("Voornaam", &["first_name"]),
    col("Achternaam", &["last_name"]),
    col("Opleidingsniveau", &["education"]),
    col("Onderwerp", &["subject", "omschrijving", "description"]),
    col("Beschikbaarheid", &["availability"]),
];

const MENTOR_COLUMNS: &[RequiredColumn] = &[
    col("Voornaam", &["first_name"]),
    col("Achternaam", &["last_name"]),
    col("Opleidingsniveau", &["education"]),
    col("Onderwerpen", &["subjects"]),
    col("Beschikbaarheid", &["availability"]),
    col("Max_Studenten", &["max_students"]),
];

fn has_column(headers: &csv::StringRecord, column: &RequiredColumn) -> bool {
    headers
        .iter()
        .any(|h| h == column.canonical || column.aliases.contains(&h))
}

fn read_table<T, R>(reader: R, table: &'static str, required: &[RequiredColumn]) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    for column in required {
        if !has_column(&headers, column) {
            return Err(MatchError::MissingColumn {
                table,
                column: column.canonical,
            });
        }
    }

    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(row, record)| record.map_err(|e| MatchError::malformed(table, row, e.to_string())))
        .collect()
}

/// Reads student rows from CSV.
///
/// Either a subject column (`Onderwerp`/`subject`) or a description column
/// (`omschrijving`/`description`) must be present.
pub fn read_students<R: Read>(reader: R) -> Result<Vec<StudentRecord>> {
    read_table(reader, STUDENTS_TABLE, STUDENT_COLUMNS)
}

/// Reads mentor rows from CSV. `table` names the pool in error messages.
pub fn read_mentors<R: Read>(reader: R, table: &'static str) -> Result<Vec<MentorRecord>> {
    read_table(reader, table, MENTOR_COLUMNS)
}

/// Reads a students CSV file.
pub fn read_students_file(path: impl AsRef<Path>) -> Result<Vec<StudentRecord>> {
    read_students(std::fs::File::open(path)?)
}

/// Reads a mentors CSV file.
pub fn read_mentors_file(path: impl AsRef<Path>, table: &'static str) -> Result<Vec<MentorRecord>> {
    read_mentors(std::fs::File::open(path)?, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDENTS_CSV: &str = "\
Voornaam,Achternaam,Opleidingsniveau,Onderwerp,Beschikbaarheid
Ada,Lovelace,Bachelor,Artificial Intelligence,\"['Mon', 'Tue']\"
Alan,Turing,Master,Cyber Security,Wed
";

    const MENTORS_CSV: &str = "\
first_name,last_name,education,subjects,availability,max_students
Grace,Hopper,PhD,\"['Artificial Intelligence', 'Data Science']\",Mon;Tue,3
Edsger,Dijkstra,Master,Cyber Security,Wed,2.0
";

    #[test]
    fn test_read_students_dutch_headers() {
        let rows = read_students(STUDENTS_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].first_name, "Ada");
        assert_eq!(rows[0].subject, "Artificial Intelligence");
        assert_eq!(rows[0].availability.items().unwrap(), vec!["Mon", "Tue"]);
        assert_eq!(rows[1].availability.items().unwrap(), vec!["Wed"]);
        assert!(rows[0].description.is_none());
    }

    #[test]
    fn test_read_mentors_english_headers() {
        let rows = read_mentors(MENTORS_CSV.as_bytes(), MENTORS_TYPE1_TABLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].max_students, 3);
        assert_eq!(rows[1].max_students, 2);
        assert_eq!(
            rows[0].subjects.items().unwrap(),
            vec!["Artificial Intelligence", "Data Science"]
        );
    }

    #[test]
    fn test_students_with_description_only() {
        let csv = "Voornaam,Achternaam,Opleidingsniveau,Beschikbaarheid,omschrijving\n\
                   Ada,Lovelace,Bachelor,Mon,Builds a neural network\n";
        let rows = read_students(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].subject, "");
        assert_eq!(rows[0].description.as_deref(), Some("Builds a neural network"));
    }

    #[test]
    fn test_missing_column() {
        let csv = "Voornaam,Achternaam,Opleidingsniveau,Onderwerp\nAda,Lovelace,Bachelor,AI\n";
        let err = read_students(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            MatchError::MissingColumn { table: STUDENTS_TABLE, column: "Beschikbaarheid" }
        ));

        let csv = "Voornaam,Achternaam,Opleidingsniveau,Beschikbaarheid\nAda,Lovelace,Bachelor,Mon\n";
        assert!(read_students(csv.as_bytes()).unwrap_err().is_data());
    }

    #[test]
    fn test_bad_capacity() {
        let csv = "Voornaam,Achternaam,Opleidingsniveau,Onderwerpen,Beschikbaarheid,Max_Studenten\n\
                   A,B,PhD,AI,Mon,lots\n";
        let err = read_mentors(csv.as_bytes(), MENTORS_TYPE2_TABLE).unwrap_err();
        assert!(matches!(err, MatchError::MalformedRow { table: MENTORS_TYPE2_TABLE, row: 0, .. }));
    }
}
