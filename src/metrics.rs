//! Match quality and solver metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Match rate | matched students / total students |
//! | Mentor load | panels per mentor |
//! | Avg utilization | mean(load / capacity) over mentors with capacity |
//! | Solve time | wall-clock per solve: mean, min, max, std |
//! | Stability | variance of match counts and Jaccard similarity of matched-student sets between consecutive runs |
//!
//! Standard deviations and variances are population statistics.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::engine::MatchingEngine;
use crate::error::Result;
use crate::ingest::Entities;
use crate::models::{Day, MatchSet, MentorId, StudentId};

/// Match set performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchKpi {
    /// Students in the cohort.
    pub total_students: usize,
    /// Students with a panel.
    pub matched_students: usize,
    /// Fraction matched (0.0..1.0); 0 for an empty cohort.
    pub match_rate: f64,
    /// Panels per mentor, including idle mentors.
    pub load_by_mentor: BTreeMap<MentorId, usize>,
    /// Mean load / capacity over mentors with non-zero capacity.
    pub avg_utilization: f64,
    /// Matched students per day.
    pub matches_by_day: BTreeMap<Day, usize>,
}

impl MatchKpi {
    /// Computes KPIs for a match set over its entities.
    pub fn calculate(matches: &MatchSet, entities: &Entities) -> Self {
        let total_students = entities.students.len();
        let matched_students = matches.len();
        let match_rate = if total_students == 0 {
            0.0
        } else {
            matched_students as f64 / total_students as f64
        };

        let assigned = matches.mentor_load();
        let mut load_by_mentor = BTreeMap::new();
        let mut utilization_sum = 0.0;
        let mut capacitated = 0usize;
        for mentor in &entities.mentors {
            let load = assigned.get(&mentor.id).copied().unwrap_or(0);
            load_by_mentor.insert(mentor.id, load);
            if mentor.max_students > 0 {
                utilization_sum += load as f64 / f64::from(mentor.max_students);
                capacitated += 1;
            }
        }
        let avg_utilization = if capacitated == 0 {
            0.0
        } else {
            utilization_sum / capacitated as f64
        };

        Self {
            total_students,
            matched_students,
            match_rate,
            load_by_mentor,
            avg_utilization,
            matches_by_day: matches.day_distribution(),
        }
    }

    /// Mentors that sit on no panel.
    pub fn idle_mentors(&self) -> Vec<MentorId> {
        self.load_by_mentor
            .iter()
            .filter(|(_, &load)| load == 0)
            .map(|(&id, _)| id)
            .collect()
    }
}

/// Solve-time statistics over repeated runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    /// Number of solves.
    pub runs: usize,
    /// Mean solve time in seconds.
    pub avg_solve_time_seconds: f64,
    /// Fastest solve in seconds.
    pub min_solve_time_seconds: f64,
    /// Slowest solve in seconds.
    pub max_solve_time_seconds: f64,
    /// Standard deviation in seconds.
    pub std_solve_time_seconds: f64,
    /// Mean number of matched students.
    pub avg_matches_found: f64,
}

/// Run-to-run variation of solutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// Number of solves.
    pub runs: usize,
    /// Matched count per run.
    pub match_counts: Vec<usize>,
    /// Mean matched count.
    pub avg_matches: f64,
    /// Variance of matched counts.
    pub match_count_variance: f64,
    /// Standard deviation of matched counts.
    pub match_count_std: f64,
    /// max - min of matched counts.
    pub match_count_range: usize,
    /// Mean Jaccard similarity of matched-student sets of consecutive runs.
    pub avg_jaccard_similarity: f64,
}

/// KPIs of one solve plus efficiency and stability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// KPIs of the first solve.
    pub kpi: MatchKpi,
    /// Solve-time statistics.
    pub efficiency: EfficiencyReport,
    /// Run-to-run variation.
    pub stability: StabilityReport,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Jaccard similarity; `None` when both sets are empty.
pub fn jaccard(a: &BTreeSet<StudentId>, b: &BTreeSet<StudentId>) -> Option<f64> {
    let union = a.union(b).count();
    if union == 0 {
        return None;
    }
    Some(a.intersection(b).count() as f64 / union as f64)
}

/// Solves `runs` times (at least once) and reports timing statistics.
pub fn computational_efficiency(
    engine: &MatchingEngine,
    timeout: Duration,
    runs: usize,
) -> Result<EfficiencyReport> {
    let runs = runs.max(1);
    let mut times = Vec::with_capacity(runs);
    let mut counts = Vec::with_capacity(runs);
    for _ in 0..runs {
        let started = Instant::now();
        let outcome = engine.solve(timeout)?;
        times.push(started.elapsed().as_secs_f64());
        counts.push(outcome.matched() as f64);
    }

    Ok(EfficiencyReport {
        runs,
        avg_solve_time_seconds: mean(&times),
        min_solve_time_seconds: times.iter().copied().fold(f64::INFINITY, f64::min),
        max_solve_time_seconds: times.iter().copied().fold(0.0, f64::max),
        std_solve_time_seconds: variance(&times).sqrt(),
        avg_matches_found: mean(&counts),
    })
}

/// Solves `runs` times (at least once) and measures how much solutions vary.
pub fn solution_stability(
    engine: &MatchingEngine,
    timeout: Duration,
    runs: usize,
) -> Result<StabilityReport> {
    let runs = runs.max(1);
    let mut sets = Vec::with_capacity(runs);
    for _ in 0..runs {
        sets.push(engine.solve(timeout)?.matches.matched_students());
    }
    Ok(stability_of(&sets))
}

fn stability_of(sets: &[BTreeSet<StudentId>]) -> StabilityReport {
    let match_counts: Vec<usize> = sets.iter().map(BTreeSet::len).collect();
    let as_f64: Vec<f64> = match_counts.iter().map(|&c| c as f64).collect();
    let min = match_counts.iter().copied().min().unwrap_or(0);
    let max = match_counts.iter().copied().max().unwrap_or(0);

    let avg_jaccard_similarity = if sets.len() < 2 {
        1.0
    } else {
        let similarities: Vec<f64> = sets.windows(2).filter_map(|w| jaccard(&w[0], &w[1])).collect();
        mean(&similarities)
    };

    let match_count_variance = variance(&as_f64);
    StabilityReport {
        runs: sets.len(),
        avg_matches: mean(&as_f64),
        match_count_variance,
        match_count_std: match_count_variance.sqrt(),
        match_count_range: max - min,
        avg_jaccard_similarity,
        match_counts,
    }
}

impl MetricsReport {
    /// Runs one solve for KPIs, then the efficiency and stability series.
    pub fn collect(engine: &MatchingEngine, timeout: Duration, stability_runs: usize) -> Result<Self> {
        let outcome = engine.solve(timeout)?;
        Ok(Self {
            kpi: MatchKpi::calculate(&outcome.matches, engine.entities()),
            efficiency: computational_efficiency(engine, timeout, 1)?,
            stability: solution_stability(engine, timeout, stability_runs)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchedMentor, Mentor, MentorDisplay, Student, StudentDisplay, StudentMatch};

    fn entities() -> Entities {
        let students = (0..4).map(|i| Student::new(i, 1, "ai")).collect();
        let mentors = vec![
            Mentor::type1(0, 3).with_capacity(2),
            Mentor::type1(1, 3).with_capacity(4),
            Mentor::type1(2, 3).with_capacity(0),
        ];
        Entities::new(students, mentors, false)
    }

    fn matched(student: usize, day: &str, mentor: usize) -> StudentMatch {
        StudentMatch {
            student_id: StudentId(student),
            student: StudentDisplay::default(),
            day: Day::new(day),
            type1_mentors: vec![MatchedMentor {
                id: MentorId::type1(mentor),
                display: MentorDisplay::default(),
            }],
            type2_mentors: vec![],
        }
    }

    fn ids(ids: &[usize]) -> BTreeSet<StudentId> {
        ids.iter().map(|&i| StudentId(i)).collect()
    }

    #[test]
    fn test_kpi_basic() {
        let set = MatchSet {
            matches: vec![matched(0, "mon", 0), matched(1, "mon", 0), matched(2, "tue", 1)],
            facts: vec![],
        };
        let kpi = MatchKpi::calculate(&set, &entities());
        assert_eq!(kpi.total_students, 4);
        assert_eq!(kpi.matched_students, 3);
        assert!((kpi.match_rate - 0.75).abs() < 1e-10);
        assert_eq!(kpi.load_by_mentor[&MentorId::type1(0)], 2);
        // m0: 2/2, m1: 1/4; m2 has no capacity
        assert!((kpi.avg_utilization - 0.625).abs() < 1e-10);
        assert_eq!(kpi.matches_by_day[&Day::new("mon")], 2);
        assert_eq!(kpi.idle_mentors(), vec![MentorId::type1(2)]);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = MatchKpi::calculate(&MatchSet::new(), &Entities::default());
        assert_eq!(kpi.match_rate, 0.0);
        assert_eq!(kpi.avg_utilization, 0.0);
        assert!(kpi.matches_by_day.is_empty());
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard(&ids(&[0, 1]), &ids(&[1, 2])), Some(1.0 / 3.0));
        assert_eq!(jaccard(&ids(&[]), &ids(&[])), None);
        assert_eq!(jaccard(&ids(&[3]), &ids(&[3])), Some(1.0));
    }

    #[test]
    fn test_stability_statistics() {
        let report = stability_of(&[ids(&[0, 1]), ids(&[0, 1]), ids(&[0, 1, 2, 3])]);
        assert_eq!(report.runs, 3);
        assert_eq!(report.match_counts, vec![2, 2, 4]);
        assert_eq!(report.match_count_range, 2);
        assert!((report.avg_matches - 8.0 / 3.0).abs() < 1e-10);
        // deviations -2/3, -2/3, 4/3 → (4/9 + 4/9 + 16/9) / 3
        assert!((report.match_count_variance - 24.0 / 27.0).abs() < 1e-10);
        // 1.0 and 0.5
        assert!((report.avg_jaccard_similarity - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_engine_series() {
        use crate::config::EngineConfig;
        use crate::generator::CohortGenerator;

        let cohort = CohortGenerator::new(4).with_students(6).with_mentors(4).generate();
        let engine = MatchingEngine::new(
            &cohort.students,
            &cohort.mentors_type1,
            None,
            EngineConfig::new().with_n_type1(1).with_verbose(false),
        )
        .unwrap();
        let timeout = Duration::from_secs(10);

        let efficiency = computational_efficiency(&engine, timeout, 2).unwrap();
        assert_eq!(efficiency.runs, 2);
        assert!(efficiency.min_solve_time_seconds <= efficiency.max_solve_time_seconds);

        // exhaustive solves repeat exactly
        let stability = solution_stability(&engine, timeout, 3).unwrap();
        assert_eq!(stability.match_counts.len(), 3);
        assert_eq!(stability.match_count_variance, 0.0);
        assert_eq!(stability.match_count_range, 0);
        if stability.avg_matches > 0.0 {
            assert_eq!(stability.avg_jaccard_similarity, 1.0);
        }

        let report = MetricsReport::collect(&engine, timeout, 2).unwrap();
        assert_eq!(report.kpi.total_students, 6);
        assert_eq!(report.stability.runs, 2);
        assert_eq!(computational_efficiency(&engine, timeout, 0).unwrap().runs, 1);
    }

    #[test]
    fn test_single_run_is_stable() {
        let report = stability_of(&[ids(&[0])]);
        assert_eq!(report.avg_jaccard_similarity, 1.0);
        assert_eq!(report.match_count_variance, 0.0);
    }
}
