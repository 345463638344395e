//! Core row and path types for langsheet.
//! Source readers produce [`RowRecord`]s; the normalizer turns them into
//! [`NormalizedRow`]s that the tree builder consumes.

use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};

/// One source row, as read from the sheet.
///
/// Lives only as long as it takes to normalize it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct RowRecord {
    /// Category path, using `/` or `.` as separator (e.g. `common/button`).
    #[serde(default)]
    pub category: Option<String>,

    /// Translation key. Rows without one are skipped.
    #[serde(default)]
    pub key: Option<String>,

    /// Value per language code. Languages absent here are treated as `""`.
    #[serde(default)]
    pub values: HashMap<String, String>,

    /// 1-based row number in the source file, when the reader knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
}

impl RowRecord {
    /// Creates a row with the given category and key and no values.
    pub fn new(category: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            key: Some(key.into()),
            values: HashMap::new(),
            row_number: None,
        }
    }

    /// Adds a value for one language.
    pub fn with_value(mut self, language: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(language.into(), value.into());
        self
    }

    /// Records where the row came from.
    pub fn with_row_number(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }
}

/// Ordered path segments locating a value in a translation tree.
///
/// Always holds at least one segment: the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Builds a path from category segments and the final key.
    pub fn new(prefix: Vec<String>, key: impl Into<String>) -> Self {
        let mut segments = prefix;
        segments.push(key.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment.
    pub fn key(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Everything before the key.
    pub fn prefix(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Joins all segments with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.join("."))
    }
}

/// A row after normalization: a key path plus one value per supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub path: KeyPath,
    /// Category text as written, minus empty segments; used for flat keys.
    pub category: String,
    pub values: HashMap<String, String>,
    pub row_number: Option<usize>,
}

impl NormalizedRow {
    /// Value for `language`, or `""` when the language is unknown.
    pub fn value(&self, language: &str) -> &str {
        self.values.get(language).map(String::as_str).unwrap_or_default()
    }

    /// Key used when nesting is disabled: `category/key`, or just `key`.
    pub fn flat_key(&self) -> String {
        if self.category.is_empty() {
            self.path.key().to_string()
        } else {
            format!("{}/{}", self.category, self.path.key())
        }
    }
}

/// Shape of a node in a translation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A string value.
    Leaf,
    /// A nested object.
    Branch,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Leaf => write!(f, "value"),
            NodeKind::Branch => write!(f, "category"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_path_parts() {
        let path = KeyPath::new(vec!["common".into(), "button".into()], "reset");
        assert_eq!(path.key(), "reset");
        assert_eq!(path.prefix(), &["common".to_string(), "button".to_string()]);
        assert_eq!(path.len(), 3);
        assert_eq!(path.to_string(), "common.button.reset");
        assert_eq!(path.join("/"), "common/button/reset");
    }

    #[test]
    fn test_key_path_without_prefix() {
        let path = KeyPath::new(Vec::new(), "title");
        assert!(path.prefix().is_empty());
        assert_eq!(path.segments(), &["title".to_string()]);
    }

    #[test]
    fn test_flat_key() {
        let row = NormalizedRow {
            path: KeyPath::new(vec!["common".into(), "button".into()], "reset"),
            category: "common.button".to_string(),
            values: HashMap::new(),
            row_number: None,
        };
        assert_eq!(row.flat_key(), "common.button/reset");
        assert_eq!(row.value("en"), "");
    }

    #[test]
    fn test_row_record_builder() {
        let row = RowRecord::new("common", "ok")
            .with_value("en", "OK")
            .with_row_number(4);
        assert_eq!(row.values.get("en"), Some(&"OK".to_string()));
        assert_eq!(row.row_number, Some(4));
    }
}
