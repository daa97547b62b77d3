//! Mentor model.
//!
//! Mentors come from one of two independently capacitated pools. A
//! mentor covers one or more subjects, is available on a set of days,
//! and may sit on at most `max_students` panels.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::day::{day_set, Day};

/// Mentor pool, fixed per source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorType {
    /// Primary pool; every panel needs `n_type1` of these.
    Type1,
    /// Optional secondary pool.
    Type2,
}

impl MentorType {
    /// Human-readable label (`Type 1`, `Type 2`).
    pub fn label(self) -> &'static str {
        match self {
            MentorType::Type1 => "Type 1",
            MentorType::Type2 => "Type 2",
        }
    }
}

impl fmt::Display for MentorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MentorType::Type1 => f.write_str("type1"),
            MentorType::Type2 => f.write_str("type2"),
        }
    }
}

/// Mentor identifier, namespaced by source table.
///
/// Two mentors with the same row index in different tables are distinct.
/// Ordering is by pool, then numerically by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MentorId {
    /// Source pool.
    pub pool: MentorType,
    /// Row position within the source table.
    pub index: usize,
}

impl MentorId {
    /// Creates a type1 mentor id.
    pub fn type1(index: usize) -> Self {
        Self {
            pool: MentorType::Type1,
            index,
        }
    }

    /// Creates a type2 mentor id.
    pub fn type2(index: usize) -> Self {
        Self {
            pool: MentorType::Type2,
            index,
        }
    }
}

impl fmt::Display for MentorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pool {
            MentorType::Type1 => write!(f, "m{}", self.index),
            MentorType::Type2 => write!(f, "m2_{}", self.index),
        }
    }
}

/// Display fields carried through untouched for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorDisplay {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Raw education label.
    pub education_label: String,
}

impl MentorDisplay {
    /// `"{first} {last}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A mentor that can sit on student panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    /// Unique mentor identifier (carries the pool).
    pub id: MentorId,
    /// Education ordinal.
    pub education_level: i32,
    /// Normalized subject tokens.
    pub subjects: Vec<String>,
    /// Days on which the mentor can meet (duplicate-free).
    pub availability: Vec<Day>,
    /// Maximum number of (student, day) panels.
    pub max_students: u32,
    /// Display fields.
    pub display: MentorDisplay,
}

impl Mentor {
    /// Creates a mentor with capacity 1 and no subjects or availability.
    pub fn new(id: MentorId, education_level: i32) -> Self {
        Self {
            id,
            education_level,
            subjects: Vec::new(),
            availability: Vec::new(),
            max_students: 1,
            display: MentorDisplay::default(),
        }
    }

    /// Creates a type1 mentor.
    pub fn type1(index: usize, education_level: i32) -> Self {
        Self::new(MentorId::type1(index), education_level)
    }

    /// Creates a type2 mentor.
    pub fn type2(index: usize, education_level: i32) -> Self {
        Self::new(MentorId::type2(index), education_level)
    }

    /// Adds a subject token.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        if !self.subjects.contains(&subject) {
            self.subjects.push(subject);
        }
        self
    }

    /// Sets the availability (tokens are lowercased and deduplicated).
    pub fn with_availability<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.availability = day_set(days);
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, max_students: u32) -> Self {
        self.max_students = max_students;
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.display.first_name = first.into();
        self.display.last_name = last.into();
        self
    }

    /// Sets all display fields.
    pub fn with_display(mut self, display: MentorDisplay) -> Self {
        self.display = display;
        self
    }

    /// The mentor's pool.
    #[inline]
    pub fn mentor_type(&self) -> MentorType {
        self.id.pool
    }

    /// Whether the mentor covers `subject`.
    pub fn covers(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    /// Whether the mentor is available on `day`.
    #[inline]
    pub fn is_available(&self, day: &Day) -> bool {
        self.availability.contains(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentor_builder() {
        let m = Mentor::type1(0, 3)
            .with_subject("ai")
            .with_subject("data_science")
            .with_subject("ai")
            .with_availability(["Mon", "Wed"])
            .with_capacity(4)
            .with_name("Grace", "Hopper");

        assert_eq!(m.mentor_type(), MentorType::Type1);
        assert_eq!(m.subjects.len(), 2);
        assert!(m.covers("data_science"));
        assert!(!m.covers("security"));
        assert!(m.is_available(&Day::new("wed")));
        assert_eq!(m.max_students, 4);
        assert_eq!(m.display.full_name(), "Grace Hopper");
    }

    #[test]
    fn test_mentor_id_namespacing() {
        let a = MentorId::type1(0);
        let b = MentorId::type2(0);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "m0");
        assert_eq!(b.to_string(), "m2_0");
        assert!(a < b);
        assert!(MentorId::type1(2) < MentorId::type1(10));
    }

    #[test]
    fn test_mentor_type_labels() {
        assert_eq!(MentorType::Type1.label(), "Type 1");
        assert_eq!(MentorType::Type2.to_string(), "type2");
    }
}
