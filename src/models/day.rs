//! Day tokens and availability sets.
//!
//! Availability is a set of day tokens. Tokens are compared
//! case-insensitively, so they are stored lowercase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized (lowercase, trimmed) day token such as `mon` or `tuesday`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Day(String);

impl Day {
    /// Creates a day token, lowercasing and trimming the input.
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(token.as_ref().trim().to_lowercase())
    }

    /// The normalized token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form with the first letter uppercased (`mon` → `Mon`).
    pub fn capitalized(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Day {
    fn from(token: &str) -> Self {
        Day::new(token)
    }
}

/// Collects day tokens into a duplicate-free list, keeping first-seen order.
pub(crate) fn day_set<I, S>(tokens: I) -> Vec<Day>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut days: Vec<Day> = Vec::new();
    for token in tokens {
        let day = Day::new(token);
        if !day.as_str().is_empty() && !days.contains(&day) {
            days.push(day);
        }
    }
    days
}
