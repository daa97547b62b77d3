//! Subject classification seam.
//!
//! Student rows may arrive with only a free-text assignment description.
//! A [`SubjectClassifier`] turns that text into a subject label before
//! entities are built. The matching logic never looks at the confidence.
//!
//! [`KeywordClassifier`] is a small default: each label owns a keyword
//! list and the label with the most keyword hits wins.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::records::StudentRecord;
use crate::error::Result;

/// A subject label with the classifier's confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Subject label, in the same surface form mentors use.
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Classification {
    /// Creates a classification.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Maps free text to a subject label.
pub trait SubjectClassifier {
    /// Classifies one description.
    fn classify(&self, text: &str) -> Classification;
}

/// Keyword-count classifier.
///
/// Matching is case-insensitive on whole words. Ties go to the label that
/// sorts first; text with no hits gets the fallback label at confidence 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordClassifier {
    #[serde(deserialize_with = "deserialize_keywords")]
    keywords: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_fallback")]
    fallback: String,
}

fn default_fallback() -> String {
    "general".to_string()
}

/// Trimmed, lowercased, non-empty keywords.
fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

type KeywordTable = BTreeMap<String, Vec<String>>;

fn deserialize_keywords<'de, D>(deserializer: D) -> std::result::Result<KeywordTable, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = KeywordTable::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(label, words)| (label, normalize_keywords(words)))
        .collect())
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            keywords: BTreeMap::new(),
            fallback: default_fallback(),
        }
    }
}

impl KeywordClassifier {
    /// Creates an empty classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label with its keywords.
    pub fn with_label<I, S>(mut self, label: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords.insert(label.into(), normalize_keywords(keywords));
        self
    }

    /// Sets the label returned when nothing matches.
    pub fn with_fallback(mut self, label: impl Into<String>) -> Self {
        self.fallback = label.into();
        self
    }

    /// Loads `{"keywords": {label: [words]}, "fallback": label}` from JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Number of labels.
    pub fn label_count(&self) -> usize {
        self.keywords.len()
    }
}

impl SubjectClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Classification {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut best: Option<(&str, usize)> = None;
        let mut total = 0;
        for (label, keywords) in &self.keywords {
            let hits = words.iter().filter(|w| keywords.contains(w)).count();
            total += hits;
            if hits > best.map_or(0, |(_, h)| h) {
                best = Some((label, hits));
            }
        }

        match best {
            Some((label, hits)) => Classification::new(label, hits as f64 / total as f64),
            None => Classification::new(self.fallback.clone(), 0.0),
        }
    }
}

/// Fills blank subjects from each record's description.
///
/// Records that already carry a subject, or have no description, are left
/// alone. Returns the number of records annotated.
pub fn annotate_subjects<C>(records: &mut [StudentRecord], classifier: &C) -> usize
where
    C: SubjectClassifier + ?Sized,
{
    let mut annotated = 0;
    for record in records.iter_mut() {
        if !record.subject.trim().is_empty() {
            continue;
        }
        let Some(description) = record.description.as_deref() else {
            continue;
        };
        if description.trim().is_empty() {
            continue;
        }
        let classification = classifier.classify(description);
        tracing::debug!(
            student = %record.first_name,
            label = %classification.label,
            confidence = classification.confidence,
            "classified subject"
        );
        record.subject = classification.label;
        annotated += 1;
    }
    annotated
}
