//! Entity builder.
//!
//! Turns raw rows into typed, validated [`Student`]s and [`Mentor`]s.
//! Row order determines ids (`s{row}`, `m{row}`, `m2_{row}`), so the same
//! tables always produce the same entities.
//!
//! Normalization:
//! - Day tokens are lowercased.
//! - Subjects are token-normalized (lowercase, whitespace runs to `_`),
//!   so "Data Science", "data science" and "data_science" compare equal.
//! - Education labels resolve through the [`EducationMapping`]; an
//!   unknown label is an error, never a default.

use std::collections::HashMap;

use super::cell::Cell;
use super::records::{
    MentorRecord, StudentRecord, MENTORS_TYPE1_TABLE, MENTORS_TYPE2_TABLE, STUDENTS_TABLE,
};
use crate::config::EducationMapping;
use crate::error::{MatchError, Result};
use crate::models::{Mentor, MentorDisplay, MentorId, MentorType, Student, StudentDisplay, StudentId};

/// Normalizes a subject label to its comparison token.
///
/// ```
/// use u_match::ingest::normalize_token;
/// assert_eq!(normalize_token("  Data  Science "), "data_science");
/// ```
pub fn normalize_token(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// The typed entities of one solve, with id lookups.
#[derive(Debug, Clone, Default)]
pub struct Entities {
    /// Students in input order.
    pub students: Vec<Student>,
    /// Type1 mentors in input order, then type2 mentors in input order.
    pub mentors: Vec<Mentor>,
    student_index: HashMap<StudentId, usize>,
    mentor_index: HashMap<MentorId, usize>,
    has_type2: bool,
}

impl Entities {
    /// Assembles entities built elsewhere.
    ///
    /// `has_type2` records whether a type2 table was supplied at all, which
    /// may be true even when it has no rows.
    pub fn new(students: Vec<Student>, mentors: Vec<Mentor>, has_type2: bool) -> Self {
        let student_index = students.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        let mentor_index = mentors.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        Self {
            students,
            mentors,
            student_index,
            mentor_index,
            has_type2,
        }
    }

    /// Looks up a student.
    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.student_index.get(&id).map(|&i| &self.students[i])
    }

    /// Looks up a mentor.
    pub fn mentor(&self, id: MentorId) -> Option<&Mentor> {
        self.mentor_index.get(&id).map(|&i| &self.mentors[i])
    }

    /// Mentors of one pool, in input order.
    pub fn mentors_of(&self, pool: MentorType) -> impl Iterator<Item = &Mentor> {
        self.mentors.iter().filter(move |m| m.mentor_type() == pool)
    }

    /// Whether a type2 table was supplied.
    pub fn has_type2(&self) -> bool {
        self.has_type2
    }
}

/// Builds [`Entities`] from raw rows.
#[derive(Debug, Clone)]
pub struct EntityBuilder<'a> {
    mapping: &'a EducationMapping,
}

impl<'a> EntityBuilder<'a> {
    /// Creates a builder resolving education labels through `mapping`.
    pub fn new(mapping: &'a EducationMapping) -> Self {
        Self { mapping }
    }

    /// Builds all entities.
    ///
    /// # Errors
    /// - [`MatchError::UnknownEducationLevel`] for an unmapped label
    /// - [`MatchError::MalformedRow`] for an unparsable list cell, an empty
    ///   student subject, or a negative capacity
    pub fn build(
        &self,
        students: &[StudentRecord],
        mentors_type1: &[MentorRecord],
        mentors_type2: Option<&[MentorRecord]>,
    ) -> Result<Entities> {
        let students = students
            .iter()
            .enumerate()
            .map(|(row, r)| self.build_student(row, r))
            .collect::<Result<Vec<_>>>()?;

        let mut mentors = Vec::with_capacity(
            mentors_type1.len() + mentors_type2.map_or(0, |m| m.len()),
        );
        for (row, r) in mentors_type1.iter().enumerate() {
            mentors.push(self.build_mentor(MentorId::type1(row), MENTORS_TYPE1_TABLE, r)?);
        }
        if let Some(type2) = mentors_type2 {
            for (row, r) in type2.iter().enumerate() {
                mentors.push(self.build_mentor(MentorId::type2(row), MENTORS_TYPE2_TABLE, r)?);
            }
        }

        Ok(Entities::new(students, mentors, mentors_type2.is_some()))
    }

    fn build_student(&self, row: usize, record: &StudentRecord) -> Result<Student> {
        let id = StudentId(row);
        let level = self.mapping.resolve(&record.education, || {
            format!("student {id} ({} {})", record.first_name, record.last_name)
        })?;

        let subject = normalize_token(&record.subject);
        if subject.is_empty() {
            return Err(MatchError::malformed(
                STUDENTS_TABLE,
                row,
                "subject is empty and no classifier filled it in",
            ));
        }
        let days = list(&record.availability, STUDENTS_TABLE, row, "availability")?;

        Ok(Student::new(row, level, subject)
            .with_availability(days)
            .with_display(StudentDisplay {
                first_name: record.first_name.clone(),
                last_name: record.last_name.clone(),
                education_label: record.education.clone(),
                subject_label: record.subject.clone(),
            }))
    }

    fn build_mentor(&self, id: MentorId, table: &'static str, record: &MentorRecord) -> Result<Mentor> {
        let row = id.index;
        let level = self.mapping.resolve(&record.education, || {
            format!("mentor {id} ({} {})", record.first_name, record.last_name)
        })?;

        let capacity = u32::try_from(record.max_students).map_err(|_| {
            MatchError::malformed(
                table,
                row,
                format!("max_students must be a non-negative integer (got {})", record.max_students),
            )
        })?;

        let days = list(&record.availability, table, row, "availability")?;
        let subjects = list(&record.subjects, table, row, "subjects")?;

        let mentor = subjects
            .iter()
            .map(|s| normalize_token(s))
            .filter(|s| !s.is_empty())
            .fold(Mentor::new(id, level), |m, s| m.with_subject(s));

        Ok(mentor
            .with_availability(days)
            .with_capacity(capacity)
            .with_display(MentorDisplay {
                first_name: record.first_name.clone(),
                last_name: record.last_name.clone(),
                education_label: record.education.clone(),
            }))
    }
}

fn list(cell: &Cell, table: &'static str, row: usize, column: &str) -> Result<Vec<String>> {
    cell.items()
        .map_err(|e| MatchError::malformed(table, row, format!("{column}: {e}")))
}
