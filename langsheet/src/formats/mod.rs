//! All supported source formats for langsheet.
//!
//! This module re-exports the reader for each format and provides the
//! [`SourceFormat`] enum for picking a reader by name or file extension.

pub mod csv;
pub mod spreadsheet;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

pub use self::csv::CsvReader;
pub use self::spreadsheet::SpreadsheetReader;

use crate::{Error, layout::SheetLayout, traits::SourceReader};

/// Represents all supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Tab-separated values with a header row.
    #[serde(alias = "tab")]
    Tsv,
    /// Excel or OpenDocument workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
    #[serde(
        alias = "excel",
        alias = "xlsx",
        alias = "xlsm",
        alias = "xlsb",
        alias = "xls",
        alias = "ods"
    )]
    Spreadsheet,
}

/// Implements [`std::fmt::Display`] for [`SourceFormat`].
///
/// # Example
/// ```rust
/// use langsheet::SourceFormat;
/// assert_eq!(SourceFormat::Csv.to_string(), "csv");
/// assert_eq!(SourceFormat::Spreadsheet.to_string(), "spreadsheet");
/// ```
impl Display for SourceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Tsv => write!(f, "tsv"),
            SourceFormat::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// Implements [`std::str::FromStr`] for [`SourceFormat`].
///
/// Accepts format names and extensions, case-insensitively:
/// - `"csv"` → `SourceFormat::Csv`
/// - `"tsv"`, `"tab"` → `SourceFormat::Tsv`
/// - `"spreadsheet"`, `"excel"`, `"xlsx"`, `"xlsm"`, `"xlsb"`, `"xls"`, `"ods"` → `SourceFormat::Spreadsheet`
///
/// # Example
/// ```rust
/// use langsheet::SourceFormat;
/// use std::str::FromStr;
/// assert_eq!(SourceFormat::from_str("XLSX").unwrap(), SourceFormat::Spreadsheet);
/// assert!(SourceFormat::from_str("docx").is_err());
/// ```
impl FromStr for SourceFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "tsv" | "tab" => Ok(SourceFormat::Tsv),
            "spreadsheet" | "excel" | "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
                Ok(SourceFormat::Spreadsheet)
            }
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl SourceFormat {
    /// Infers the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) => ext.parse(),
            None => Err(Error::UnsupportedFormat(format!(
                "cannot infer format of {} without an extension",
                path.display()
            ))),
        }
    }

    /// Returns a reader for this format.
    pub fn reader(&self, layout: &SheetLayout) -> Box<dyn SourceReader> {
        match self {
            SourceFormat::Csv => Box::new(CsvReader::new()),
            SourceFormat::Tsv => Box::new(CsvReader::tsv()),
            SourceFormat::Spreadsheet => {
                Box::new(SpreadsheetReader::new().with_sheet_name(layout.sheet_name.clone()))
            }
        }
    }
}
