//! The candidate relation.
//!
//! A (student, mentor, day) triple is a candidate iff the mentor
//! outranks the student, covers the student's subject, and both are
//! available on the day.

use serde::{Deserialize, Serialize};

use super::{Day, Mentor, MentorId, Student, StudentId};

/// A (student, mentor, day) triple satisfying every eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Student.
    pub student: StudentId,
    /// Mentor.
    pub mentor: MentorId,
    /// Meeting day.
    pub day: Day,
}

impl Candidate {
    /// Creates a candidate triple (no eligibility check).
    pub fn new(student: StudentId, mentor: MentorId, day: Day) -> Self {
        Self {
            student,
            mentor,
            day,
        }
    }
}

/// Hard eligibility predicate.
pub fn is_eligible(student: &Student, mentor: &Mentor, day: &Day) -> bool {
    mentor.education_level > student.education_level
        && mentor.covers(&student.subject)
        && student.is_available(day)
        && mentor.is_available(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student::new(0, 2, "ai").with_availability(["mon", "tue"])
    }

    #[test]
    fn test_eligible() {
        let m = Mentor::type1(0, 3).with_subject("ai").with_availability(["mon"]);
        assert!(is_eligible(&student(), &m, &Day::new("mon")));
        assert!(!is_eligible(&student(), &m, &Day::new("tue")));
    }

    #[test]
    fn test_education_must_strictly_outrank() {
        let m = Mentor::type1(0, 2).with_subject("ai").with_availability(["mon"]);
        assert!(!is_eligible(&student(), &m, &Day::new("mon")));
    }

    #[test]
    fn test_subject_mismatch() {
        let m = Mentor::type1(0, 4).with_subject("security").with_availability(["mon"]);
        assert!(!is_eligible(&student(), &m, &Day::new("mon")));
    }
}
