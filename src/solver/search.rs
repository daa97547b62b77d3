//! Depth-first branch-and-bound over panel choices.
//!
//! The search is iterative (an explicit frame stack), so deep cohorts do
//! not grow the thread stack. Every frame owns a lazy [`BranchCursor`];
//! returning to a frame undoes its last branch before drawing the next.

use itertools::{Combinations, Itertools};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::vec::IntoIter;

use super::incumbent::Incumbent;
use crate::cp::MatchModel;
use crate::models::{Candidate, MatchFact, MentorType};

/// How a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchEnd {
    /// The whole tree was explored (or pruned).
    pub exhausted: bool,
    /// Branches applied.
    pub nodes: u64,
}

/// One branching decision for a student.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Branch {
    Take {
        option: usize,
        type1: Vec<usize>,
        type2: Vec<usize>,
    },
    Skip,
}

/// Lazily enumerates a student's branches: every (day, type1 panel,
/// type2 panel) over mentors that had capacity when the frame was
/// created, then `Skip`.
struct BranchCursor {
    // (option index, available type1, available type2)
    options: Vec<(usize, Vec<usize>, Vec<usize>)>,
    n_type1: usize,
    n_type2: usize,
    next_option: usize,
    current: Option<usize>,
    type1: Option<Combinations<IntoIter<usize>>>,
    panel1: Option<Vec<usize>>,
    type2: Option<Combinations<IntoIter<usize>>>,
    skipped: bool,
}

impl BranchCursor {
    fn new(options: Vec<(usize, Vec<usize>, Vec<usize>)>, n_type1: usize, n_type2: usize) -> Self {
        Self {
            options,
            n_type1,
            n_type2,
            next_option: 0,
            current: None,
            type1: None,
            panel1: None,
            type2: None,
            skipped: false,
        }
    }

    fn next_branch(&mut self) -> Option<Branch> {
        loop {
            if let (Some(option), Some(panel1), Some(type2)) =
                (self.current, &self.panel1, &mut self.type2)
            {
                if let Some(panel2) = type2.next() {
                    return Some(Branch::Take {
                        option,
                        type1: panel1.clone(),
                        type2: panel2,
                    });
                }
                self.type2 = None;
                self.panel1 = None;
            }

            if let (Some(current), Some(type1)) = (self.current, &mut self.type1) {
                if let Some(panel1) = type1.next() {
                    let available2 = self.options[current].2.clone();
                    self.type2 = Some(available2.into_iter().combinations(self.n_type2));
                    self.panel1 = Some(panel1);
                    continue;
                }
                self.type1 = None;
                self.current = None;
            }

            if self.next_option < self.options.len() {
                let current = self.next_option;
                self.next_option += 1;
                let available1 = self.options[current].1.clone();
                self.type1 = Some(available1.into_iter().combinations(self.n_type1));
                self.current = Some(current);
                continue;
            }

            if !self.skipped {
                self.skipped = true;
                return Some(Branch::Skip);
            }
            return None;
        }
    }
}

struct Frame {
    student: usize,
    bound: usize,
    cursor: BranchCursor,
    applied: Option<Branch>,
}

/// Mentor load along the current path.
struct Load {
    remaining: Vec<u32>,
    pool_left: [u64; 2],
    selected: usize,
}

impl Load {
    fn new(model: &MatchModel) -> Self {
        Self {
            remaining: model.mentors.iter().map(|m| m.capacity).collect(),
            pool_left: [
                model.pool_capacity(MentorType::Type1),
                model.pool_capacity(MentorType::Type2),
            ],
            selected: 0,
        }
    }

    fn apply(&mut self, model: &MatchModel, branch: &Branch) {
        if let Branch::Take { type1, type2, .. } = branch {
            for &m in type1.iter().chain(type2) {
                self.remaining[m] -= 1;
                self.pool_left[pool_slot(model.mentors[m].id.pool)] -= 1;
            }
            self.selected += 1;
        }
    }

    fn undo(&mut self, model: &MatchModel, branch: &Branch) {
        if let Branch::Take { type1, type2, .. } = branch {
            for &m in type1.iter().chain(type2) {
                self.remaining[m] += 1;
                self.pool_left[pool_slot(model.mentors[m].id.pool)] += 1;
            }
            self.selected -= 1;
        }
    }
}

fn pool_slot(pool: MentorType) -> usize {
    match pool {
        MentorType::Type1 => 0,
        MentorType::Type2 => 1,
    }
}

/// Branch-and-bound state over one model.
pub(crate) struct BranchAndBound<'m> {
    model: &'m MatchModel,
    order: Vec<usize>,
    load: Load,
    nodes: u64,
}

impl<'m> BranchAndBound<'m> {
    /// Prepares a search; students are ordered most constrained first
    /// (fewest feasible days, then fewest candidates, then id).
    pub fn new(model: &'m MatchModel) -> Self {
        let order = (0..model.students.len())
            .sorted_by_key(|&i| {
                let s = &model.students[i];
                (s.days.len(), s.candidate_count(), s.id)
            })
            .collect();
        Self {
            model,
            order,
            load: Load::new(model),
            nodes: 0,
        }
    }

    /// Runs until the tree is exhausted or `cancel` is raised.
    pub fn run(mut self, incumbent: &Incumbent, cancel: &AtomicBool) -> SearchEnd {
        let total = self.order.len();
        if total == 0 {
            incumbent.try_update(0, 0, Vec::new);
            return SearchEnd {
                exhausted: true,
                nodes: 0,
            };
        }

        let mut stack: Vec<Frame> = Vec::with_capacity(total);
        stack.push(self.frame(0));

        while let Some(frame) = stack.last_mut() {
            if cancel.load(Ordering::Relaxed) {
                return SearchEnd {
                    exhausted: false,
                    nodes: self.nodes,
                };
            }

            if let Some(branch) = frame.applied.take() {
                self.load.undo(self.model, &branch);
            }

            if incumbent.peek().is_some_and(|best| frame.bound <= best) {
                stack.pop();
                continue;
            }

            let Some(branch) = frame.cursor.next_branch() else {
                stack.pop();
                continue;
            };

            self.load.apply(self.model, &branch);
            frame.applied = Some(branch);
            self.nodes += 1;

            let depth = stack.len();
            if depth == total {
                let matched = self.load.selected;
                incumbent.try_update(matched, total - matched, || Self::collect_facts(self.model, &stack));
                continue;
            }

            let child = self.frame(depth);
            if incumbent.peek().is_some_and(|best| child.bound <= best) {
                continue;
            }
            stack.push(child);
        }

        SearchEnd {
            exhausted: true,
            nodes: self.nodes,
        }
    }

    /// Creates the frame for the student at `depth` in branching order.
    fn frame(&self, depth: usize) -> Frame {
        let req = self.model.requirements;
        let student = self.order[depth];
        let var = &self.model.students[student];

        let options = var
            .days
            .iter()
            .enumerate()
            .filter_map(|(i, option)| {
                let type1 = self.available(&option.type1);
                let type2 = self.available(&option.type2);
                (type1.len() >= req.type1 && type2.len() >= req.type2).then_some((i, type1, type2))
            })
            .collect();

        Frame {
            student,
            bound: self.bound(depth),
            cursor: BranchCursor::new(options, req.type1, req.type2),
            applied: None,
        }
    }

    /// Candidates with remaining capacity, most spare capacity first.
    fn available(&self, indices: &[usize]) -> Vec<usize> {
        indices
            .iter()
            .copied()
            .filter(|&m| self.load.remaining[m] > 0)
            .sorted_by_key(|&m| (Reverse(self.load.remaining[m]), m))
            .collect()
    }

    /// Upper bound on matched students for any completion below `depth`.
    fn bound(&self, depth: usize) -> usize {
        let req = self.model.requirements;
        let feasible = self.order[depth..]
            .iter()
            .filter(|&&s| self.is_feasible(s))
            .count();

        let mut room = feasible as u64;
        room = room.min(self.load.pool_left[0] / req.type1.max(1) as u64);
        if req.type2 > 0 {
            room = room.min(self.load.pool_left[1] / req.type2 as u64);
        }
        self.load.selected + room as usize
    }

    fn is_feasible(&self, student: usize) -> bool {
        let req = self.model.requirements;
        let open = |indices: &[usize]| indices.iter().filter(|&&m| self.load.remaining[m] > 0).count();
        self.model.students[student]
            .days
            .iter()
            .any(|o| open(&o.type1) >= req.type1 && open(&o.type2) >= req.type2)
    }

    fn collect_facts(model: &MatchModel, stack: &[Frame]) -> Vec<MatchFact> {
        let mut facts = Vec::new();
        for frame in stack {
            let Some(Branch::Take { option, type1, type2 }) = &frame.applied else {
                continue;
            };
            let var = &model.students[frame.student];
            let day = &var.days[*option].day;
            for &m in type1.iter().chain(type2) {
                facts.push(Candidate::new(var.id, model.mentors[m].id, day.clone()));
            }
        }
        facts.sort_unstable();
        facts
    }
}
