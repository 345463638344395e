//! All error types for the langsheet crate.
//!
//! Every fallible step of a conversion run (reading, building, writing)
//! returns [`Error`]. A failed run never leaves the caller in a broken state;
//! the next run starts from scratch.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::NodeKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("spreadsheet parse error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error(
        "structural conflict at `{path}`: {}",
        describe_conflict(.existing, .first_row, .second_row)
    )]
    StructuralConflict {
        /// Dotted path of the node both rows disagree about.
        path: String,
        /// What the node already was when the later row arrived.
        existing: NodeKind,
        /// Every language affected; key paths are shared, so this is all of them.
        languages: Vec<String>,
        /// Source row that created the existing node, if known.
        first_row: Option<usize>,
        /// Source row that tried to reshape it, if known.
        second_row: Option<usize>,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("acceleration unavailable: {0}")]
    AccelerationUnavailable(String),
}

impl Error {
    /// Creates a new parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Creates a new configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Whether the source reader rejected the input file.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::CsvParse(_) | Error::Spreadsheet(_)
        )
    }
}

fn describe_conflict(
    existing: &NodeKind,
    first_row: &Option<usize>,
    second_row: &Option<usize>,
) -> String {
    let first = first_row.map_or_else(|| "an earlier row".to_string(), |r| format!("row {}", r));
    let second = second_row.map_or_else(|| "a later row".to_string(), |r| format!("row {}", r));
    match *existing {
        NodeKind::Leaf => format!(
            "{} sets it as a value, but {} uses it as a category",
            first, second
        ),
        NodeKind::Branch => format!(
            "{} uses it as a category, but {} sets it as a value",
            first, second
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_source_not_found_error() {
        let error = Error::SourceNotFound(PathBuf::from("locales/strings.xlsx"));
        assert_eq!(
            error.to_string(),
            "source file not found: locales/strings.xlsx"
        );
    }

    #[test]
    fn test_parse_error() {
        let error = Error::parse_error("no `key` column in header row 1");
        assert_eq!(
            error.to_string(),
            "parse error: no `key` column in header row 1"
        );
        assert!(error.is_parse_error());
    }

    #[test]
    fn test_structural_conflict_leaf_then_branch() {
        let error = Error::StructuralConflict {
            path: "a".to_string(),
            existing: NodeKind::Leaf,
            languages: vec!["en".to_string()],
            first_row: Some(3),
            second_row: Some(7),
        };
        assert_eq!(
            error.to_string(),
            "structural conflict at `a`: row 3 sets it as a value, but row 7 uses it as a category"
        );
        assert!(!error.is_parse_error());
    }

    #[test]
    fn test_structural_conflict_without_rows() {
        let error = Error::StructuralConflict {
            path: "common.button".to_string(),
            existing: NodeKind::Branch,
            languages: vec![],
            first_row: None,
            second_row: None,
        };
        assert!(error.to_string().contains("an earlier row uses it as a category"));
        assert!(error.to_string().contains("a later row sets it as a value"));
    }

    #[test]
    fn test_write_error_keeps_source() {
        let error = Error::Write {
            path: PathBuf::from("out/translation.en.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("out/translation.en.json"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_config_error() {
        let error = Error::config_error("supportedLanguages is empty");
        assert_eq!(
            error.to_string(),
            "invalid configuration: supportedLanguages is empty"
        );
    }

    #[test]
    fn test_error_debug() {
        let error = Error::UnsupportedFormat("docx".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("UnsupportedFormat"));
        assert!(debug.contains("docx"));
    }
}
