//! Match (solution) model.
//!
//! A match set is the extracted form of a winning assignment: one row per
//! matched student with the chosen day and the mentor panel split by pool.
//! The raw (student, mentor, day) facts are kept alongside for validation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Candidate, Day, MentorDisplay, MentorId, MentorType, StudentDisplay, StudentId};

/// A raw assignment fact: `mentor` sits on `student`'s panel on `day`.
pub type MatchFact = Candidate;

/// A mentor on a panel, resolved to its display entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedMentor {
    /// Mentor identifier.
    pub id: MentorId,
    /// Display fields.
    pub display: MentorDisplay,
}

/// One matched student with their day and panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentMatch {
    /// Student identifier.
    pub student_id: StudentId,
    /// Student display fields.
    pub student: StudentDisplay,
    /// Chosen day.
    pub day: Day,
    /// Type1 panel members, ascending by id.
    pub type1_mentors: Vec<MatchedMentor>,
    /// Type2 panel members, ascending by id (empty when not requested).
    pub type2_mentors: Vec<MatchedMentor>,
}

impl StudentMatch {
    /// All panel members of the given pool.
    pub fn mentors(&self, pool: MentorType) -> &[MatchedMentor] {
        match pool {
            MentorType::Type1 => &self.type1_mentors,
            MentorType::Type2 => &self.type2_mentors,
        }
    }

    /// Whether `mentor` sits on this panel.
    pub fn has_mentor(&self, mentor: MentorId) -> bool {
        self.mentors(mentor.pool).iter().any(|m| m.id == mentor)
    }
}

/// Structured (non-flattened) view of a match, one per student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Student first name.
    pub student_first_name: String,
    /// Student last name.
    pub student_last_name: String,
    /// Day token (lowercase).
    pub day: String,
    /// Type1 mentor full names.
    pub type1_mentors: Vec<String>,
    /// Type2 mentor full names.
    pub type2_mentors: Vec<String>,
}

/// A complete set of matches extracted from one solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet {
    /// Matches ordered by student id.
    pub matches: Vec<StudentMatch>,
    /// Raw facts, sorted.
    pub facts: Vec<MatchFact>,
}

impl MatchSet {
    /// Creates an empty match set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of matched students.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no student is matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Ids of matched students.
    pub fn matched_students(&self) -> BTreeSet<StudentId> {
        self.matches.iter().map(|m| m.student_id).collect()
    }

    /// The match for a given student.
    pub fn match_for_student(&self, student: StudentId) -> Option<&StudentMatch> {
        self.matches.iter().find(|m| m.student_id == student)
    }

    /// All panels a mentor sits on.
    pub fn matches_for_mentor(&self, mentor: MentorId) -> Vec<&StudentMatch> {
        self.matches.iter().filter(|m| m.has_mentor(mentor)).collect()
    }

    /// Number of (student, day) panels per mentor.
    pub fn mentor_load(&self) -> BTreeMap<MentorId, usize> {
        let mut load = BTreeMap::new();
        for m in &self.matches {
            for mentor in m.type1_mentors.iter().chain(&m.type2_mentors) {
                *load.entry(mentor.id).or_insert(0) += 1;
            }
        }
        load
    }

    /// Number of matched students per day.
    pub fn day_distribution(&self) -> BTreeMap<Day, usize> {
        let mut dist = BTreeMap::new();
        for m in &self.matches {
            *dist.entry(m.day.clone()).or_insert(0) += 1;
        }
        dist
    }

    /// Structured rows, one per matched student.
    pub fn to_records(&self) -> Vec<MatchRecord> {
        self.matches
            .iter()
            .map(|m| MatchRecord {
                student_first_name: m.student.first_name.clone(),
                student_last_name: m.student.last_name.clone(),
                day: m.day.as_str().to_string(),
                type1_mentors: m.type1_mentors.iter().map(|x| x.display.full_name()).collect(),
                type2_mentors: m.type2_mentors.iter().map(|x| x.display.full_name()).collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor(id: MentorId, first: &str) -> MatchedMentor {
        MatchedMentor {
            id,
            display: MentorDisplay {
                first_name: first.into(),
                last_name: "X".into(),
                education_label: "Master".into(),
            },
        }
    }

    fn sample_set() -> MatchSet {
        let s0 = StudentMatch {
            student_id: StudentId(0),
            student: StudentDisplay {
                first_name: "Ann".into(),
                last_name: "A".into(),
                ..Default::default()
            },
            day: Day::new("mon"),
            type1_mentors: vec![mentor(MentorId::type1(0), "M0"), mentor(MentorId::type1(1), "M1")],
            type2_mentors: vec![mentor(MentorId::type2(0), "T0")],
        };
        let s1 = StudentMatch {
            student_id: StudentId(1),
            student: StudentDisplay {
                first_name: "Bob".into(),
                last_name: "B".into(),
                ..Default::default()
            },
            day: Day::new("tue"),
            type1_mentors: vec![mentor(MentorId::type1(0), "M0"), mentor(MentorId::type1(2), "M2")],
            type2_mentors: vec![],
        };
        MatchSet {
            matches: vec![s0, s1],
            facts: Vec::new(),
        }
    }

    #[test]
    fn test_mentor_load() {
        let set = sample_set();
        let load = set.mentor_load();
        assert_eq!(load[&MentorId::type1(0)], 2);
        assert_eq!(load[&MentorId::type1(2)], 1);
        assert_eq!(load[&MentorId::type2(0)], 1);
        assert!(!load.contains_key(&MentorId::type2(1)));
    }

    #[test]
    fn test_lookups() {
        let set = sample_set();
        assert_eq!(set.len(), 2);
        assert!(set.match_for_student(StudentId(1)).is_some());
        assert!(set.match_for_student(StudentId(9)).is_none());
        assert_eq!(set.matches_for_mentor(MentorId::type1(0)).len(), 2);
        assert_eq!(set.matches_for_mentor(MentorId::type2(0)).len(), 1);
    }

    #[test]
    fn test_day_distribution() {
        let set = sample_set();
        let dist = set.day_distribution();
        assert_eq!(dist[&Day::new("mon")], 1);
        assert_eq!(dist[&Day::new("tue")], 1);
    }

    #[test]
    fn test_to_records() {
        let records = sample_set().to_records();
        assert_eq!(records[0].student_first_name, "Ann");
        assert_eq!(records[0].type1_mentors, vec!["M0 X", "M1 X"]);
        assert_eq!(records[0].type2_mentors, vec!["T0 X"]);
        assert!(records[1].type2_mentors.is_empty());
    }

    #[test]
    fn test_empty_set() {
        let set = MatchSet::new();
        assert!(set.is_empty());
        assert!(set.mentor_load().is_empty());
    }
}
