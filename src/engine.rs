//! Matching engine facade.
//!
//! Ties the pipeline together:
//!
//! ```text
//! records ─▶ Entities ─▶ CandidateSet ─▶ MatchModel ─▶ search ─▶ MatchSet ─▶ CSV
//! ```
//!
//! Construction does all the work that does not depend on a deadline
//! (validation, candidate generation, model building), so one engine can
//! be solved repeatedly with different timeouts.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::candidates::{CandidateGenerator, CandidateSet};
use crate::config::{EngineConfig, EngineWarning, PanelRequirements};
use crate::cp::{MatchCpBuilder, MatchModel};
use crate::error::Result;
use crate::export::{export_matches, ExportOutcome};
use crate::extract::extract_matches;
use crate::ingest::{
    annotate_subjects, read_mentors_file, read_students_file, Entities, EntityBuilder,
    MentorRecord, StudentRecord, SubjectClassifier, MENTORS_TYPE1_TABLE, MENTORS_TYPE2_TABLE,
};
use crate::metrics::MatchKpi;
use crate::models::{MatchSet, MentorType};
use crate::solver::{solve_model, SolveOutcome, SolverConfig};
use crate::validation::{validate_matches, ValidationResult};

/// Input table locations.
#[derive(Debug, Clone, Copy)]
pub struct InputPaths<'a> {
    /// Students table.
    pub students: &'a Path,
    /// Type1 mentors table.
    pub mentors_type1: &'a Path,
    /// Optional type2 mentors table.
    pub mentors_type2: Option<&'a Path>,
}

/// A constructed matching problem, ready to solve.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_match::config::EngineConfig;
/// use u_match::engine::MatchingEngine;
/// use u_match::ingest::{MentorRecord, StudentRecord};
///
/// let students = vec![StudentRecord::new("Ada", "Lovelace", "Bachelor", "ai", "Mon")];
/// let mentors = vec![MentorRecord::new("Grace", "Hopper", "PhD", "ai", "Mon;Tue", 1)];
///
/// let engine = MatchingEngine::new(
///     &students,
///     &mentors,
///     None,
///     EngineConfig::new().with_n_type1(1).with_verbose(false),
/// )
/// .unwrap();
/// let outcome = engine.solve(Duration::from_secs(5)).unwrap();
/// assert_eq!(outcome.matched(), 1);
/// assert!(outcome.status.is_optimal());
/// ```
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    config: EngineConfig,
    requirements: PanelRequirements,
    entities: Entities,
    candidates: CandidateSet,
    model: Arc<MatchModel>,
    warnings: Vec<EngineWarning>,
}

impl MatchingEngine {
    /// Builds an engine from raw rows.
    ///
    /// # Errors
    /// - [`MatchError::Configuration`](crate::MatchError::Configuration) for
    ///   invalid panel sizes
    /// - [`MatchError::UnknownEducationLevel`](crate::MatchError::UnknownEducationLevel)
    ///   for a label missing from the mapping
    /// - [`MatchError::MalformedRow`](crate::MatchError::MalformedRow) for
    ///   bad cells or capacities
    pub fn new(
        students: &[StudentRecord],
        mentors_type1: &[MentorRecord],
        mentors_type2: Option<&[MentorRecord]>,
        config: EngineConfig,
    ) -> Result<Self> {
        let (requirements, warning) = config.resolve(mentors_type2.is_some())?;
        if let Some(warning) = &warning {
            tracing::warn!(%warning, "panel requirements adjusted");
        }

        let entities =
            EntityBuilder::new(&config.education_mapping).build(students, mentors_type1, mentors_type2)?;
        Ok(Self::assemble(entities, requirements, config, warning.into_iter().collect()))
    }

    /// Builds an engine from already typed entities.
    pub fn from_entities(entities: Entities, config: EngineConfig) -> Result<Self> {
        let (requirements, warning) = config.resolve(entities.has_type2())?;
        if let Some(warning) = &warning {
            tracing::warn!(%warning, "panel requirements adjusted");
        }
        Ok(Self::assemble(entities, requirements, config, warning.into_iter().collect()))
    }

    /// Reads the CSV tables and builds an engine.
    ///
    /// With a classifier, blank student subjects are filled from their
    /// descriptions before entities are built.
    pub fn from_files(
        paths: InputPaths<'_>,
        config: EngineConfig,
        classifier: Option<&dyn SubjectClassifier>,
    ) -> Result<Self> {
        let mut students = read_students_file(paths.students)?;
        let mentors_type1 = read_mentors_file(paths.mentors_type1, MENTORS_TYPE1_TABLE)?;
        let mentors_type2 = paths
            .mentors_type2
            .map(|p| read_mentors_file(p, MENTORS_TYPE2_TABLE))
            .transpose()?;

        if let Some(classifier) = classifier {
            let annotated = annotate_subjects(&mut students, classifier);
            tracing::info!(annotated, "classified blank subjects");
        }

        Self::new(&students, &mentors_type1, mentors_type2.as_deref(), config)
    }

    fn assemble(
        entities: Entities,
        requirements: PanelRequirements,
        config: EngineConfig,
        warnings: Vec<EngineWarning>,
    ) -> Self {
        let candidates = CandidateGenerator::new(&entities).generate();
        let model = MatchCpBuilder::new(&entities, &candidates, requirements).build();

        let type1 = entities.mentors_of(MentorType::Type1).count();
        let type2 = entities.mentors_of(MentorType::Type2).count();
        tracing::info!(
            students = entities.students.len(),
            mentors_type1 = type1,
            mentors_type2 = type2,
            n_type1 = requirements.type1,
            n_type2 = requirements.type2,
            candidates = candidates.len(),
            day_options = model.day_var_count(),
            dropped_days = model.dropped_day_count(),
            matchable = model.matchable_count(),
            "matching engine constructed"
        );

        Self {
            config,
            requirements,
            entities,
            candidates,
            model: Arc::new(model),
            warnings,
        }
    }

    /// Solves under `timeout` with the default grace period.
    pub fn solve(&self, timeout: Duration) -> Result<SolveOutcome> {
        self.solve_with(
            &SolverConfig::new()
                .with_timeout(timeout)
                .with_verbose(self.config.verbose),
        )
    }

    /// Solves with the configured default timeout.
    pub fn solve_default(&self) -> Result<SolveOutcome> {
        self.solve(Duration::from_secs(self.config.timeout_seconds))
    }

    /// Solves with explicit solver settings.
    pub fn solve_with(&self, solver: &SolverConfig) -> Result<SolveOutcome> {
        let report = solve_model(Arc::clone(&self.model), solver)?;
        let matches = extract_matches(&report.facts, &self.entities);
        Ok(SolveOutcome {
            matches,
            status: report.status,
            stats: report.stats,
        })
    }

    /// Writes `matches` as a CSV table.
    pub fn export(&self, matches: &MatchSet, path: impl AsRef<Path>) -> Result<ExportOutcome> {
        export_matches(matches, path)
    }

    /// Checks `matches` against this engine's entities and panel sizes.
    pub fn validate(&self, matches: &MatchSet) -> ValidationResult {
        validate_matches(matches, &self.entities, self.requirements)
    }

    /// KPIs of `matches` over this engine's cohort.
    pub fn kpi(&self, matches: &MatchSet) -> MatchKpi {
        MatchKpi::calculate(matches, &self.entities)
    }

    /// Effective configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Panel sizes after any override.
    pub fn requirements(&self) -> PanelRequirements {
        self.requirements
    }

    /// Warnings recorded during construction.
    pub fn warnings(&self) -> &[EngineWarning] {
        &self.warnings
    }

    /// Typed entities.
    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    /// Eligible triples.
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// The constraint model.
    pub fn model(&self) -> &MatchModel {
        &self.model
    }
}
