//! Result extraction.
//!
//! Groups raw (student, mentor, day) facts by (student, day), splits each
//! group by mentor pool, and resolves ids back to display fields. Output
//! is ordered by student id with panel members ascending by mentor id, so
//! identical input always renders identically.

use std::collections::BTreeMap;

use crate::ingest::Entities;
use crate::models::{Day, MatchFact, MatchSet, MatchedMentor, MentorId, MentorType, StudentId, StudentMatch};

/// Builds a [`MatchSet`] from solution facts.
///
/// Facts naming an entity that does not exist are dropped with a warning;
/// the solver never produces them. Because facts are sorted first, mentor
/// ids within each group come out ascending.
pub fn extract_matches(facts: &[MatchFact], entities: &Entities) -> MatchSet {
    let mut kept: Vec<MatchFact> = facts
        .iter()
        .filter(|f| {
            let known = entities.student(f.student).is_some() && entities.mentor(f.mentor).is_some();
            if !known {
                tracing::warn!(student = %f.student, mentor = %f.mentor, "dropping fact with unknown entity");
            }
            known
        })
        .cloned()
        .collect();
    kept.sort_unstable();
    kept.dedup();

    let mut groups: BTreeMap<(StudentId, Day), Vec<MentorId>> = BTreeMap::new();
    for fact in &kept {
        groups
            .entry((fact.student, fact.day.clone()))
            .or_default()
            .push(fact.mentor);
    }

    let matches = groups
        .into_iter()
        .filter_map(|((student_id, day), mentor_ids)| {
            let student = entities.student(student_id)?;
            let (type1_mentors, type2_mentors): (Vec<_>, Vec<_>) = mentor_ids
                .into_iter()
                .filter_map(|id| {
                    entities.mentor(id).map(|m| MatchedMentor {
                        id,
                        display: m.display.clone(),
                    })
                })
                .partition(|m| m.id.pool == MentorType::Type1);

            Some(StudentMatch {
                student_id,
                student: student.display.clone(),
                day,
                type1_mentors,
                type2_mentors,
            })
        })
        .collect();

    MatchSet {
        matches,
        facts: kept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candidate, Mentor, Student};

    fn entities() -> Entities {
        let students = vec![
            Student::new(0, 2, "ai").with_name("Ada", "Lovelace"),
            Student::new(1, 2, "ai").with_name("Alan", "Turing"),
        ];
        let mentors = vec![
            Mentor::type1(0, 3).with_name("Grace", "Hopper"),
            Mentor::type1(1, 3).with_name("Edsger", "Dijkstra"),
            Mentor::type2(0, 4).with_name("Barbara", "Liskov"),
        ];
        Entities::new(students, mentors, true)
    }

    fn fact(s: usize, m: MentorId, day: &str) -> MatchFact {
        Candidate::new(StudentId(s), m, Day::new(day))
    }

    #[test]
    fn test_groups_and_orders() {
        let facts = vec![
            fact(1, MentorId::type1(0), "tue"),
            fact(0, MentorId::type2(0), "mon"),
            fact(0, MentorId::type1(1), "mon"),
            fact(0, MentorId::type1(0), "mon"),
        ];
        let set = extract_matches(&facts, &entities());

        assert_eq!(set.len(), 2);
        let first = &set.matches[0];
        assert_eq!(first.student_id, StudentId(0));
        assert_eq!(first.day, Day::new("mon"));
        assert_eq!(
            first.type1_mentors.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![MentorId::type1(0), MentorId::type1(1)]
        );
        assert_eq!(first.type2_mentors[0].display.full_name(), "Barbara Liskov");
        assert_eq!(set.matches[1].student.full_name(), "Alan Turing");
        assert!(set.matches[1].type2_mentors.is_empty());
        assert_eq!(set.facts.len(), 4);
        assert!(set.facts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_extraction_is_order_independent() {
        let mut facts = vec![
            fact(0, MentorId::type1(1), "mon"),
            fact(0, MentorId::type1(0), "mon"),
            fact(1, MentorId::type1(0), "tue"),
        ];
        let a = extract_matches(&facts, &entities());
        facts.reverse();
        let b = extract_matches(&facts, &entities());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(extract_matches(&[], &entities()).is_empty());
        let set = extract_matches(&[fact(9, MentorId::type1(0), "mon")], &entities());
        assert!(set.is_empty());
        assert!(set.facts.is_empty());
    }
}
