//! Engine configuration.
//!
//! [`EngineConfig`] is the caller-facing parameter set. It is resolved
//! against the supplied tables into [`PanelRequirements`], the validated
//! panel sizes the model builder and search work with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{MatchError, Result};

/// Education label → ordinal mapping.
///
/// Replaced wholesale when the caller supplies one; labels are matched
/// exactly after trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EducationMapping(BTreeMap<String, i32>);

impl Default for EducationMapping {
    fn default() -> Self {
        Self::from_pairs([("Associate", 1), ("Bachelor", 2), ("Master", 3), ("PhD", 4)])
    }
}

impl EducationMapping {
    /// Builds a mapping from (label, ordinal) pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Ordinal for a label.
    pub fn level(&self, label: &str) -> Option<i32> {
        self.0.get(label.trim()).copied()
    }

    /// Resolves a label or fails with [`MatchError::UnknownEducationLevel`].
    pub fn resolve(&self, label: &str, entity: impl FnOnce() -> String) -> Result<i32> {
        self.level(label).ok_or_else(|| MatchError::UnknownEducationLevel {
            label: label.to_string(),
            entity: entity(),
        })
    }

    /// Number of known labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated panel sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRequirements {
    /// Distinct type1 mentors per panel (≥ 1).
    pub type1: usize,
    /// Distinct type2 mentors per panel (0 = pool unused).
    pub type2: usize,
}

impl PanelRequirements {
    /// Creates requirements without validation.
    pub fn new(type1: usize, type2: usize) -> Self {
        Self { type1, type2 }
    }
}

/// Non-fatal conditions recorded while constructing an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineWarning {
    /// `n_type2 > 0` was requested without a type2 table; it was set to 0.
    Type2Override {
        /// The originally requested value.
        requested: usize,
    },
}

impl fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineWarning::Type2Override { requested } => write!(
                f,
                "no type2 mentors provided; overriding n_type2 from {requested} to 0"
            ),
        }
    }
}

/// Caller-facing engine parameters.
///
/// Panel sizes are signed so that negative values coming from files or
/// the command line are rejected instead of wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Type1 mentors per panel (default 4).
    pub n_type1: i64,
    /// Type2 mentors per panel (default none ⇒ 0).
    pub n_type2: Option<i64>,
    /// Education label mapping.
    pub education_mapping: EducationMapping,
    /// Emit progress events at `info` level instead of `debug`.
    pub verbose: bool,
    /// Fail instead of warning when `n_type2 > 0` has no type2 table.
    pub strict_type2: bool,
    /// Default search deadline in seconds.
    pub timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_type1: 4,
            n_type2: None,
            education_mapping: EducationMapping::default(),
            verbose: true,
            strict_type2: false,
            timeout_seconds: 120,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sets the type1 panel size.
    pub fn with_n_type1(mut self, n: i64) -> Self {
        self.n_type1 = n;
        self
    }

    /// Sets the type2 panel size.
    pub fn with_n_type2(mut self, n: i64) -> Self {
        self.n_type2 = Some(n);
        self
    }

    /// Replaces the education mapping.
    pub fn with_education_mapping(mut self, mapping: EducationMapping) -> Self {
        self.education_mapping = mapping;
        self
    }

    /// Sets verbosity.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Makes the type2 override a hard error.
    pub fn with_strict_type2(mut self, strict: bool) -> Self {
        self.strict_type2 = strict;
        self
    }

    /// Sets the default search deadline.
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Validates panel sizes against the available pools.
    ///
    /// # Errors
    /// - `n_type1 < 1`
    /// - `n_type2 < 0`
    /// - `n_type2 > 0` without a type2 table while `strict_type2` is set
    pub fn resolve(&self, has_type2: bool) -> Result<(PanelRequirements, Option<EngineWarning>)> {
        if self.n_type1 < 1 {
            return Err(MatchError::Configuration(format!(
                "n_type1 must be at least 1 (got {})",
                self.n_type1
            )));
        }
        let n_type2 = self.n_type2.unwrap_or(0);
        if n_type2 < 0 {
            return Err(MatchError::Configuration(format!(
                "n_type2 cannot be negative (got {n_type2})"
            )));
        }

        let type1 = self.n_type1 as usize;
        let type2 = n_type2 as usize;

        if !has_type2 && type2 > 0 {
            if self.strict_type2 {
                return Err(MatchError::Configuration(
                    "a type2 mentor table is required when n_type2 > 0".to_string(),
                ));
            }
            return Ok((
                PanelRequirements::new(type1, 0),
                Some(EngineWarning::Type2Override { requested: type2 }),
            ));
        }

        Ok((PanelRequirements::new(type1, type2), None))
    }
}
