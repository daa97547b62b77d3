//! Student model.
//!
//! A student needs one panel of mentors on one day. Eligibility is
//! decided by the education ordinal, a single normalized subject token,
//! and the availability set.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::day::{day_set, Day};

/// Stable student identifier, derived from the input row position.
///
/// Displays as `s{row}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub usize);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Display fields carried through untouched for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDisplay {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Raw education label as read from the input.
    pub education_label: String,
    /// Raw subject label as read from the input.
    pub subject_label: String,
}

impl StudentDisplay {
    /// `"{first} {last}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A student to be matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: StudentId,
    /// Education ordinal (higher = more senior).
    pub education_level: i32,
    /// Normalized subject token.
    pub subject: String,
    /// Days on which the student can meet (duplicate-free).
    pub availability: Vec<Day>,
    /// Display fields.
    pub display: StudentDisplay,
}

impl Student {
    /// Creates a student with no availability and empty display fields.
    pub fn new(id: usize, education_level: i32, subject: impl Into<String>) -> Self {
        Self {
            id: StudentId(id),
            education_level,
            subject: subject.into(),
            availability: Vec::new(),
            display: StudentDisplay::default(),
        }
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

    /// Sets the display name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.display.first_name = first.into();
        self.display.last_name = last.into();
        self
    }

    /// Sets all display fields.
    pub fn with_display(mut self, display: StudentDisplay) -> Self {
        self.display = display;
        self
    }

    /// Whether the student is available on `day`.
    #[inline]
    pub fn is_available(&self, day: &Day) -> bool {
        self.availability.contains(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_builder() {
        let s = Student::new(3, 2, "ai")
            .with_availability(["Mon", "tue", "mon"])
            .with_name("Ada", "Lovelace");

        assert_eq!(s.id, StudentId(3));
        assert_eq!(s.id.to_string(), "s3");
        assert_eq!(s.availability.len(), 2);
        assert!(s.is_available(&Day::new("MON")));
        assert!(!s.is_available(&Day::new("wed")));
        assert_eq!(s.display.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_student_id_ordering_is_numeric() {
        assert!(StudentId(2) < StudentId(10));
    }
}
