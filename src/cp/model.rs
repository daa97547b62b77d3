//! The matching model.
//!
//! A compact, index-based encoding of the optimization problem:
//!
//! - `selected(s)`: one per [`StudentVar`]
//! - `day(s, d)`: one per [`DayOption`]; only days that can host a full
//!   panel survive construction
//! - `assign(s, d, m)`: one per mentor index listed in a day option
//!
//! Constraints are implicit in the layout: exactly one day per selected
//! student, exactly `type1`/`type2` distinct mentors from the option's
//! lists, and per-mentor load ≤ capacity.

use serde::{Deserialize, Serialize};

use crate::config::PanelRequirements;
use crate::models::{Day, MentorId, MentorType, StudentId};

/// A capacitated mentor in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorSlot {
    /// Mentor identifier.
    pub id: MentorId,
    /// Maximum number of panels.
    pub capacity: u32,
}

/// A feasible day for one student with its candidate mentor indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOption {
    /// The day.
    pub day: Day,
    /// Indices into [`MatchModel::mentors`] of type1 candidates, ascending.
    pub type1: Vec<usize>,
    /// Indices of type2 candidates, ascending. Empty when type2 is unused.
    pub type2: Vec<usize>,
}

impl DayOption {
    /// Candidate indices of one pool.
    pub fn pool(&self, pool: MentorType) -> &[usize] {
        match pool {
            MentorType::Type1 => &self.type1,
            MentorType::Type2 => &self.type2,
        }
    }
}

/// Decision variables of one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentVar {
    /// Student identifier.
    pub id: StudentId,
    /// Feasible days; empty means the student can never be selected.
    pub days: Vec<DayOption>,
}

impl StudentVar {
    /// Whether at least one day can host a full panel.
    pub fn is_matchable(&self) -> bool {
        !self.days.is_empty()
    }

    /// Total candidate count across days, used for branching order.
    pub fn candidate_count(&self) -> usize {
        self.days.iter().map(|d| d.type1.len() + d.type2.len()).sum()
    }
}

/// Why a model cannot be searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelDefect {
    /// Panels require no type1 mentor.
    NoType1Requirement,
    /// A day option references a mentor index outside the table.
    DanglingMentor {
        /// Offending student.
        student: StudentId,
        /// Offending index.
        index: usize,
    },
    /// A day option lists a mentor under the wrong pool.
    PoolMismatch {
        /// Offending student.
        student: StudentId,
        /// Offending mentor.
        mentor: MentorId,
    },
    /// A day option has fewer candidates than the panel size.
    UndersizedOption {
        /// Offending student.
        student: StudentId,
        /// Offending day.
        day: Day,
    },
}

/// The complete matching model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchModel {
    /// Students in branching-neutral (input) order.
    pub students: Vec<StudentVar>,
    /// Capacitated mentors; day options index into this table.
    pub mentors: Vec<MentorSlot>,
    /// Panel sizes.
    pub requirements: PanelRequirements,
    pub(crate) dropped_days: usize,
}

impl MatchModel {
    /// Creates a model from its parts.
    pub fn new(
        students: Vec<StudentVar>,
        mentors: Vec<MentorSlot>,
        requirements: PanelRequirements,
    ) -> Self {
        Self {
            students,
            mentors,
            requirements,
            dropped_days: 0,
        }
    }

    /// Number of `selected(s)` variables.
    pub fn selection_var_count(&self) -> usize {
        self.students.len()
    }

    /// Number of `day(s, d)` variables.
    pub fn day_var_count(&self) -> usize {
        self.students.iter().map(|s| s.days.len()).sum()
    }

    /// Number of `assign(s, d, m)` variables.
    pub fn assignment_var_count(&self) -> usize {
        self.students.iter().map(StudentVar::candidate_count).sum()
    }

    /// Available days removed because they could not host a full panel.
    pub fn dropped_day_count(&self) -> usize {
        self.dropped_days
    }

    /// Students with at least one feasible day.
    pub fn matchable_count(&self) -> usize {
        self.students.iter().filter(|s| s.is_matchable()).count()
    }

    /// Total capacity of one pool.
    pub fn pool_capacity(&self, pool: MentorType) -> u64 {
        self.mentors
            .iter()
            .filter(|m| m.id.pool == pool)
            .map(|m| u64::from(m.capacity))
            .sum()
    }

    /// Checks structural consistency.
    ///
    /// A model built by [`MatchCpBuilder`](super::MatchCpBuilder) always
    /// passes; hand-assembled models may not.
    pub fn check(&self) -> Result<(), ModelDefect> {
        if self.requirements.type1 == 0 {
            return Err(ModelDefect::NoType1Requirement);
        }
        for student in &self.students {
            for option in &student.days {
                for (pool, need) in [
                    (MentorType::Type1, self.requirements.type1),
                    (MentorType::Type2, self.requirements.type2),
                ] {
                    let indices = option.pool(pool);
                    if indices.len() < need {
                        return Err(ModelDefect::UndersizedOption {
                            student: student.id,
                            day: option.day.clone(),
                        });
                    }
                    for &index in indices {
                        let slot = self.mentors.get(index).ok_or(ModelDefect::DanglingMentor {
                            student: student.id,
                            index,
                        })?;
                        if slot.id.pool != pool {
                            return Err(ModelDefect::PoolMismatch {
                                student: student.id,
                                mentor: slot.id,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether [`check`](Self::check) passes.
    pub fn is_consistent(&self) -> bool {
        self.check().is_ok()
    }
}
