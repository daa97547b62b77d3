//! List-valued table cells.
//!
//! Availability and subject columns hold either a bracketed list of
//! quoted strings (`['Mon', 'Tue']`) or a bare delimited scalar
//! (`Mon; Tue`, `Mon,Tue`, `Mon`). The parser accepts exactly these two
//! shapes and rejects anything ambiguous instead of guessing.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a cell could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    /// `[` without a closing `]`, or the reverse.
    #[error("unterminated list literal: {0}")]
    UnterminatedList(String),
    /// A bracketed item that is not quoted.
    #[error("unquoted list item '{0}'")]
    UnquotedItem(String),
    /// A quoted item without its closing quote.
    #[error("unbalanced quotes in list literal: {0}")]
    UnbalancedQuotes(String),
    /// Two items not separated by a comma.
    #[error("expected ',' between list items in: {0}")]
    MissingSeparator(String),
    /// A scalar using both `;` and `,`.
    #[error("scalar mixes ';' and ',' delimiters: {0}")]
    MixedDelimiters(String),
}

/// A list-valued cell as supplied by the caller.
///
/// Deserializes from a string (table cells), a number (coerced to text),
/// or a sequence of strings (structured sources).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Already structured (e.g. from JSON or a programmatic caller).
    List(Vec<String>),
    /// Raw text from a table.
    Text(String),
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list literal, a delimited string, or a sequence of strings")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Cell, E> {
                Ok(Cell::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Cell, E> {
                Ok(Cell::Text(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Cell, E> {
                Ok(Cell::Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Cell, E> {
                Ok(Cell::Text(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Cell, E> {
                Ok(Cell::Text(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Cell, E> {
                Ok(Cell::Text(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::default())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Cell, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<String>()? {
                    items.push(item);
                }
                Ok(Cell::List(items))
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Text(String::new())
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<Vec<&str>> for Cell {
    fn from(items: Vec<&str>) -> Self {
        Cell::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Cell {
    fn from(items: Vec<String>) -> Self {
        Cell::List(items)
    }
}

impl Cell {
    /// Parses the cell into trimmed, non-empty items.
    pub fn items(&self) -> Result<Vec<String>, CellError> {
        match self {
            Cell::List(items) => Ok(items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()),
            Cell::Text(text) => parse_text(text),
        }
    }
}

fn parse_text(raw: &str) -> Result<Vec<String>, CellError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    match (text.starts_with('['), text.ends_with(']')) {
        (true, true) => parse_bracketed(&text[1..text.len() - 1], text),
        (false, false) => parse_scalar(text),
        _ => Err(CellError::UnterminatedList(text.to_string())),
    }
}

fn parse_scalar(text: &str) -> Result<Vec<String>, CellError> {
    let delimiter = match (text.contains(';'), text.contains(',')) {
        (true, true) => return Err(CellError::MixedDelimiters(text.to_string())),
        (true, false) => ';',
        _ => ',',
    };
    Ok(text
        .split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_bracketed(inner: &str, whole: &str) -> Result<Vec<String>, CellError> {
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(c) => {
                let mut bare: String = std::iter::once(c)
                    .chain(chars.by_ref().take_while(|&c| c != ','))
                    .collect();
                bare = bare.trim().to_string();
                return Err(CellError::UnquotedItem(bare));
            }
        };

        let mut item = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == quote {
                closed = true;
                break;
            }
            item.push(c);
        }
        if !closed {
            return Err(CellError::UnbalancedQuotes(whole.to_string()));
        }
        let item = item.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return Err(CellError::MissingSeparator(whole.to_string())),
        }
    }

    Ok(items)
}
