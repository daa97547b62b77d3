//! Constraint model builder.
//!
//! Encodes entities and the candidate relation into a [`MatchModel`]:
//! selection variables per student, day-choice variables restricted to
//! days whose candidate lists can fill a panel, and assignment variables
//! over those candidates. The objective is to maximize the number of
//! selected students.
//!
//! # Formulation
//!
//! ```text
//! max  Σ_s selected(s)
//! s.t. Σ_d day(s,d) = selected(s)                         ∀ s
//!      day(s,d) ⇒ |cand₁(s,d)| ≥ n₁ ∧ |cand₂(s,d)| ≥ n₂    ∀ s,d
//!      Σ_{m∈cand₁(s,d)} assign(s,d,m) = n₁·day(s,d)        ∀ s,d
//!      Σ_{m∈cand₂(s,d)} assign(s,d,m) = n₂·day(s,d)        ∀ s,d
//!      Σ_{s,d} assign(s,d,m) ≤ cap(m)                      ∀ m
//! ```
//!
//! # Reference
//! - Pentico (2007), "Assignment problems: A golden anniversary survey"
//! - Gent et al. (2006), "Minion: A Fast, Scalable, Constraint Solver"

mod model;

pub use model::{DayOption, MatchModel, MentorSlot, ModelDefect, StudentVar};

use std::collections::HashMap;

use crate::candidates::CandidateSet;
use crate::config::PanelRequirements;
use crate::ingest::Entities;
use crate::models::{MentorId, MentorType};

/// Builds a [`MatchModel`] from entities and their candidate relation.
///
/// # Example
/// ```
/// use u_match::candidates::CandidateGenerator;
/// use u_match::config::PanelRequirements;
/// use u_match::cp::MatchCpBuilder;
/// use u_match::ingest::Entities;
/// use u_match::models::{Mentor, Student};
///
/// let students = vec![Student::new(0, 2, "ai").with_availability(["mon"])];
/// let mentors = vec![Mentor::type1(0, 3).with_subject("ai").with_availability(["mon"])];
/// let entities = Entities::new(students, mentors, false);
/// let candidates = CandidateGenerator::new(&entities).generate();
///
/// let model = MatchCpBuilder::new(&entities, &candidates, PanelRequirements::new(1, 0)).build();
/// assert_eq!(model.day_var_count(), 1);
/// ```
pub struct MatchCpBuilder<'a> {
    entities: &'a Entities,
    candidates: &'a CandidateSet,
    requirements: PanelRequirements,
}

impl<'a> MatchCpBuilder<'a> {
    /// Creates a new builder.
    pub fn new(
        entities: &'a Entities,
        candidates: &'a CandidateSet,
        requirements: PanelRequirements,
    ) -> Self {
        Self {
            entities,
            candidates,
            requirements,
        }
    }

    /// Builds the model.
    ///
    /// Days on which the student is available but the candidate lists
    /// cannot fill a panel are dropped here, so the search never branches
    /// on them.
    pub fn build(&self) -> MatchModel {
        let mentors: Vec<MentorSlot> = self
            .entities
            .mentors
            .iter()
            .map(|m| MentorSlot {
                id: m.id,
                capacity: m.max_students,
            })
            .collect();
        let slot_of: HashMap<MentorId, usize> =
            mentors.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        let indices = |ids: Vec<MentorId>| -> Vec<usize> {
            ids.iter().filter_map(|id| slot_of.get(id).copied()).collect()
        };

        let mut dropped = 0;
        let students = self
            .entities
            .students
            .iter()
            .map(|student| {
                let mut days = Vec::new();
                for day in &student.availability {
                    let type1 =
                        indices(self.candidates.mentors_for(student.id, day, MentorType::Type1));
                    let type2 = if self.requirements.type2 > 0 {
                        indices(self.candidates.mentors_for(student.id, day, MentorType::Type2))
                    } else {
                        Vec::new()
                    };

                    if type1.len() >= self.requirements.type1 && type2.len() >= self.requirements.type2 {
                        days.push(DayOption {
                            day: day.clone(),
                            type1,
                            type2,
                        });
                    } else {
                        dropped += 1;
                    }
                }
                StudentVar { id: student.id, days }
            })
            .collect();

        let mut model = MatchModel::new(students, mentors, self.requirements);
        model.dropped_days = dropped;

        tracing::debug!(
            selection_vars = model.selection_var_count(),
            day_vars = model.day_var_count(),
            assignment_vars = model.assignment_var_count(),
            dropped_days = dropped,
            "built matching model"
        );
        model
    }
}
