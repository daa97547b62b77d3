//! Post-hoc validation of match sets.
//!
//! Checks a [`MatchSet`] against the entities it was built from, whatever
//! produced it. Detects:
//! - Matches naming unknown students or mentors
//! - Students matched more than once
//! - Panels of the wrong size, or with a mentor listed twice
//! - Ineligible (student, mentor, day) triples
//! - Mentors assigned beyond their capacity
//!
//! Every violation is reported, not just the first.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::PanelRequirements;
use crate::ingest::Entities;
use crate::models::{MatchSet, MentorId, MentorType, StudentId};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A match references a student or mentor that doesn't exist.
    UnknownEntity,
    /// A student appears in more than one match.
    DuplicateStudent,
    /// A panel does not have exactly the required number of mentors.
    WrongPanelSize,
    /// A mentor appears twice on one panel.
    DuplicateMentor,
    /// A triple fails the education, subject, or availability check.
    IneligibleAssignment,
    /// A mentor sits on more panels than its capacity allows.
    CapacityExceeded,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a match set.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_matches(
    matches: &MatchSet,
    entities: &Entities,
    requirements: PanelRequirements,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen_students: BTreeSet<StudentId> = BTreeSet::new();
    let mut load: BTreeMap<MentorId, u32> = BTreeMap::new();

    for m in &matches.matches {
        if !seen_students.insert(m.student_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateStudent,
                format!("Student '{}' is matched more than once", m.student_id),
            ));
        }

        let student = entities.student(m.student_id);
        if student.is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownEntity,
                format!("Match references unknown student '{}'", m.student_id),
            ));
        }

        for (pool, need) in [
            (MentorType::Type1, requirements.type1),
            (MentorType::Type2, requirements.type2),
        ] {
            let panel = m.mentors(pool);
            if panel.len() != need {
                errors.push(ValidationError::new(
                    ValidationErrorKind::WrongPanelSize,
                    format!(
                        "Student '{}' has {} {} mentors, expected {}",
                        m.student_id,
                        panel.len(),
                        pool,
                        need
                    ),
                ));
            }

            let mut on_panel = BTreeSet::new();
            for mentor in panel {
                if mentor.id.pool != pool {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownEntity,
                        format!("Mentor '{}' listed under the {} panel", mentor.id, pool),
                    ));
                }
                if !on_panel.insert(mentor.id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::DuplicateMentor,
                        format!("Mentor '{}' appears twice for student '{}'", mentor.id, m.student_id),
                    ));
                    continue;
                }
                *load.entry(mentor.id).or_insert(0) += 1;

                let Some(entity) = entities.mentor(mentor.id) else {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownEntity,
                        format!("Match references unknown mentor '{}'", mentor.id),
                    ));
                    continue;
                };
                let Some(student) = student else {
                    continue;
                };

                let mut reasons = Vec::new();
                if entity.education_level <= student.education_level {
                    reasons.push("mentor does not outrank student");
                }
                if !entity.covers(&student.subject) {
                    reasons.push("subject not covered");
                }
                if !student.is_available(&m.day) || !entity.is_available(&m.day) {
                    reasons.push("not both available");
                }
                if !reasons.is_empty() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::IneligibleAssignment,
                        format!(
                            "({}, {}, {}) is ineligible: {}",
                            m.student_id,
                            mentor.id,
                            m.day,
                            reasons.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    for (id, count) in load {
        if let Some(mentor) = entities.mentor(id) {
            if count > mentor.max_students {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CapacityExceeded,
                    format!(
                        "Mentor '{}' sits on {} panels, capacity {}",
                        id, count, mentor.max_students
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Day, MatchedMentor, Mentor, MentorDisplay, Student, StudentDisplay, StudentMatch,
    };

    fn entities() -> Entities {
        let students = vec![
            Student::new(0, 2, "ai").with_availability(["mon"]),
            Student::new(1, 2, "ai").with_availability(["mon", "tue"]),
        ];
        let mentors = vec![
            Mentor::type1(0, 3).with_subject("ai").with_availability(["mon"]),
            Mentor::type1(1, 3)
                .with_subject("ai")
                .with_availability(["mon", "tue"])
                .with_capacity(2),
            Mentor::type1(2, 2).with_subject("ai").with_availability(["mon"]),
        ];
        Entities::new(students, mentors, false)
    }

    fn panel(ids: &[usize]) -> Vec<MatchedMentor> {
        ids.iter()
            .map(|&i| MatchedMentor {
                id: MentorId::type1(i),
                display: MentorDisplay::default(),
            })
            .collect()
    }

    fn matched(student: usize, day: &str, mentors: &[usize]) -> StudentMatch {
        StudentMatch {
            student_id: StudentId(student),
            student: StudentDisplay::default(),
            day: Day::new(day),
            type1_mentors: panel(mentors),
            type2_mentors: vec![],
        }
    }

    fn set(matches: Vec<StudentMatch>) -> MatchSet {
        MatchSet {
            matches,
            facts: vec![],
        }
    }

    fn kinds(result: ValidationResult) -> Vec<ValidationErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_set() {
        let s = set(vec![matched(0, "mon", &[0]), matched(1, "tue", &[1])]);
        assert!(validate_matches(&s, &entities(), PanelRequirements::new(1, 0)).is_ok());
        assert!(validate_matches(&MatchSet::new(), &entities(), PanelRequirements::new(1, 0)).is_ok());
    }

    #[test]
    fn test_capacity_exceeded() {
        let s = set(vec![matched(0, "mon", &[0]), matched(1, "mon", &[0])]);
        let k = kinds(validate_matches(&s, &entities(), PanelRequirements::new(1, 0)));
        assert_eq!(k, vec![ValidationErrorKind::CapacityExceeded]);
    }

    #[test]
    fn test_duplicate_student() {
        let s = set(vec![matched(1, "mon", &[1]), matched(1, "tue", &[1])]);
        let k = kinds(validate_matches(&s, &entities(), PanelRequirements::new(1, 0)));
        assert_eq!(k, vec![ValidationErrorKind::DuplicateStudent]);
    }

    #[test]
    fn test_ineligible_triples() {
        // m2 does not outrank; m0 is unavailable on tue
        let s = set(vec![matched(0, "mon", &[2]), matched(1, "tue", &[0])]);
        let errors = validate_matches(&s, &entities(), PanelRequirements::new(1, 0)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::IneligibleAssignment));
        assert!(errors[0].message.contains("outrank"));
        assert!(errors[1].message.contains("available"));
    }

    #[test]
    fn test_panel_shape() {
        let s = set(vec![matched(1, "mon", &[0, 1]), matched(0, "mon", &[1, 1])]);
        let k = kinds(validate_matches(&s, &entities(), PanelRequirements::new(2, 0)));
        assert!(k.contains(&ValidationErrorKind::DuplicateMentor));
        assert!(!k.contains(&ValidationErrorKind::WrongPanelSize));

        let s = set(vec![matched(0, "mon", &[0])]);
        let k = kinds(validate_matches(&s, &entities(), PanelRequirements::new(2, 0)));
        assert_eq!(k, vec![ValidationErrorKind::WrongPanelSize]);
    }

    #[test]
    fn test_unknown_entities() {
        let s = set(vec![matched(7, "mon", &[0]), matched(0, "mon", &[9])]);
        let k = kinds(validate_matches(&s, &entities(), PanelRequirements::new(1, 0)));
        assert_eq!(
            k.iter().filter(|&&k| k == ValidationErrorKind::UnknownEntity).count(),
            2
        );
    }
}
