//! Candidate generation.
//!
//! Derives every (student, mentor, day) triple satisfying the eligibility
//! predicate ([`is_eligible`](crate::models::is_eligible)). Mentors are
//! indexed by (subject, day) first, so each student only looks at mentors
//! that already share a subject and a day with it instead of scanning the
//! full students × mentors × days cube.
//!
//! The relation has no lifecycle of its own; it is recomputed per solve.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::ingest::Entities;
use crate::models::{Candidate, Day, Mentor, MentorId, MentorType, StudentId};

/// The candidate relation, with a per-(student, day) view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    triples: BTreeSet<Candidate>,
    by_pair: BTreeMap<(StudentId, Day), Vec<MentorId>>,
}

impl CandidateSet {
    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the relation is empty.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Membership test.
    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.triples.contains(candidate)
    }

    /// All triples in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.triples.iter()
    }

    /// Candidate mentors of one pool for a (student, day) pair, ascending by id.
    pub fn mentors_for(&self, student: StudentId, day: &Day, pool: MentorType) -> Vec<MentorId> {
        self.by_pair
            .get(&(student, day.clone()))
            .map(|ids| ids.iter().copied().filter(|m| m.pool == pool).collect())
            .unwrap_or_default()
    }

    /// Days on which a student has at least one candidate mentor, ascending.
    pub fn days_for(&self, student: StudentId) -> Vec<&Day> {
        self.by_pair
            .range((student, Day::new(""))..)
            .take_while(|((s, _), _)| *s == student)
            .map(|((_, d), _)| d)
            .collect()
    }

    fn insert(&mut self, candidate: Candidate) {
        if self.triples.insert(candidate.clone()) {
            self.by_pair
                .entry((candidate.student, candidate.day))
                .or_default()
                .push(candidate.mentor);
        }
    }

    fn finish(mut self) -> Self {
        for ids in self.by_pair.values_mut() {
            ids.sort_unstable();
        }
        self
    }
}

/// Generates the candidate relation over a set of entities.
///
/// # Example
/// ```
/// use u_match::candidates::CandidateGenerator;
/// use u_match::ingest::Entities;
/// use u_match::models::{Mentor, Student};
///
/// let students = vec![Student::new(0, 2, "ai").with_availability(["mon"])];
/// let mentors = vec![Mentor::type1(0, 3).with_subject("ai").with_availability(["mon"])];
/// let entities = Entities::new(students, mentors, false);
///
/// let candidates = CandidateGenerator::new(&entities).generate();
/// assert_eq!(candidates.len(), 1);
/// ```
pub struct CandidateGenerator<'a> {
    entities: &'a Entities,
    index: HashMap<(&'a str, &'a Day), Vec<&'a Mentor>>,
}

impl<'a> CandidateGenerator<'a> {
    /// Indexes mentors by (subject, day).
    pub fn new(entities: &'a Entities) -> Self {
        let mut index: HashMap<(&'a str, &'a Day), Vec<&'a Mentor>> = HashMap::new();
        for mentor in &entities.mentors {
            for subject in &mentor.subjects {
                for day in &mentor.availability {
                    index.entry((subject.as_str(), day)).or_default().push(mentor);
                }
            }
        }
        Self { entities, index }
    }

    /// Number of (subject, day) buckets in the index.
    pub fn bucket_count(&self) -> usize {
        self.index.len()
    }

    /// Builds the full candidate relation.
    pub fn generate(&self) -> CandidateSet {
        let mut set = CandidateSet::default();
        for student in &self.entities.students {
            for day in &student.availability {
                let Some(bucket) = self.index.get(&(student.subject.as_str(), day)) else {
                    continue;
                };
                for mentor in bucket {
                    if mentor.education_level > student.education_level {
                        set.insert(Candidate::new(student.id, mentor.id, day.clone()));
                    }
                }
            }
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::CohortGenerator;
    use crate::ingest::EntityBuilder;
    use crate::config::EducationMapping;
    use crate::models::{is_eligible, Mentor, Student};

    fn entities() -> Entities {
        let students = vec![
            Student::new(0, 2, "ai").with_availability(["mon", "tue"]),
            Student::new(1, 3, "ai").with_availability(["mon"]),
            Student::new(2, 1, "security").with_availability(["wed"]),
        ];
        let mentors = vec![
            Mentor::type1(0, 3).with_subject("ai").with_availability(["mon", "tue"]),
            Mentor::type1(1, 4)
                .with_subject("ai")
                .with_subject("security")
                .with_availability(["mon", "wed"]),
            Mentor::type2(0, 4).with_subject("ai").with_availability(["tue"]),
        ];
        Entities::new(students, mentors, true)
    }

    fn brute_force(entities: &Entities) -> BTreeSet<Candidate> {
        let days = ["mon", "tue", "wed", "thu", "fri"].map(Day::new);
        let mut out = BTreeSet::new();
        for s in &entities.students {
            for m in &entities.mentors {
                for d in &days {
                    if is_eligible(s, m, d) {
                        out.insert(Candidate::new(s.id, m.id, d.clone()));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_generate_matches_predicate() {
        let e = entities();
        let set = CandidateGenerator::new(&e).generate();
        let expected = brute_force(&e);
        assert_eq!(set.iter().cloned().collect::<BTreeSet<_>>(), expected);
        // s0: m0 mon/tue, m1 mon, m2_0 tue; s1: m1 mon; s2: m1 wed
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_mentors_for_pair() {
        let e = entities();
        let set = CandidateGenerator::new(&e).generate();
        let mon = Day::new("mon");
        let tue = Day::new("tue");

        assert_eq!(
            set.mentors_for(StudentId(0), &mon, MentorType::Type1),
            vec![MentorId::type1(0), MentorId::type1(1)]
        );
        assert_eq!(
            set.mentors_for(StudentId(0), &tue, MentorType::Type2),
            vec![MentorId::type2(0)]
        );
        assert!(set.mentors_for(StudentId(1), &tue, MentorType::Type1).is_empty());
        assert_eq!(set.days_for(StudentId(0)), vec![&mon, &tue]);
        assert_eq!(set.days_for(StudentId(2)), vec![&Day::new("wed")]);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let e = entities();
        let generator = CandidateGenerator::new(&e);
        assert_eq!(generator.generate(), generator.generate());
        assert_eq!(generator.generate(), CandidateGenerator::new(&e).generate());
    }

    #[test]
    fn test_generated_cohort_matches_predicate() {
        let cohort = CohortGenerator::new(7).with_students(40).with_mentors(25).generate();
        let mapping = EducationMapping::default();
        let e = EntityBuilder::new(&mapping)
            .build(&cohort.students, &cohort.mentors_type1, Some(cohort.mentors_type2.as_slice()))
            .unwrap();
        let set = CandidateGenerator::new(&e).generate();
        assert_eq!(set.iter().cloned().collect::<BTreeSet<_>>(), brute_force(&e));
    }
}
