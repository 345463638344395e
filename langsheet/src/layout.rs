//! Row and column mapping for tabular sources.
//!
//! Readers turn a file into a grid of cell strings; [`SheetLayout`] decides
//! which grid row holds the header, where data starts and which columns carry
//! the category, the key and each language.

use serde::{Deserialize, Serialize};

use crate::{error::Error, types::RowRecord};

const CATEGORY_HEADER: &str = "category";
const KEY_HEADER: &str = "key";

/// Where things live in a sheet. Indices are 0-based.
///
/// When `dataStartRowIndex` is left out, data starts on the row after the
/// header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", from = "LayoutOptions")]
pub struct SheetLayout {
    /// Worksheet to read; the first sheet when unset. Ignored for CSV/TSV.
    pub sheet_name: Option<String>,
    /// Row holding column names.
    pub header_row_index: usize,
    /// First row holding translations.
    pub data_start_row_index: usize,
    /// Category column; found by the `category` header when unset.
    pub category_column_index: Option<usize>,
    /// Key column; found by the `key` header when unset.
    pub key_column_index: Option<usize>,
    /// First language column, used for languages the header does not name.
    pub value_start_column_index: Option<usize>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: None,
            header_row_index: 0,
            data_start_row_index: 1,
            category_column_index: None,
            key_column_index: None,
            value_start_column_index: None,
        }
    }
}

/// Serialized form of [`SheetLayout`], with every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LayoutOptions {
    sheet_name: Option<String>,
    header_row_index: usize,
    data_start_row_index: Option<usize>,
    category_column_index: Option<usize>,
    key_column_index: Option<usize>,
    value_start_column_index: Option<usize>,
}

impl From<LayoutOptions> for SheetLayout {
    fn from(options: LayoutOptions) -> Self {
        Self {
            sheet_name: options.sheet_name,
            header_row_index: options.header_row_index,
            data_start_row_index: options
                .data_start_row_index
                .unwrap_or(options.header_row_index + 1),
            category_column_index: options.category_column_index,
            key_column_index: options.key_column_index,
            value_start_column_index: options.value_start_column_index,
        }
    }
}

impl SheetLayout {
    /// Creates the default layout: header on the first row, data right after.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet_name(mut self, sheet_name: Option<String>) -> Self {
        self.sheet_name = sheet_name;
        self
    }

    /// Moves the header; data start follows when it would land above it.
    pub fn with_header_row(mut self, index: usize) -> Self {
        self.header_row_index = index;
        self.data_start_row_index = self.data_start_row_index.max(index + 1);
        self
    }

    pub fn with_data_start_row(mut self, index: usize) -> Self {
        self.data_start_row_index = index;
        self
    }

    pub fn with_category_column(mut self, index: Option<usize>) -> Self {
        self.category_column_index = index;
        self
    }

    pub fn with_key_column(mut self, index: Option<usize>) -> Self {
        self.key_column_index = index;
        self
    }

    pub fn with_value_start_column(mut self, index: Option<usize>) -> Self {
        self.value_start_column_index = index;
        self
    }

    /// Checks the row mapping is usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.data_start_row_index <= self.header_row_index {
            return Err(Error::config_error(format!(
                "dataStartRowIndex ({}) must come after headerRowIndex ({})",
                self.data_start_row_index, self.header_row_index
            )));
        }
        Ok(())
    }

    /// Resolves column positions against the header row.
    pub fn resolve_columns(
        &self,
        header: &[String],
        languages: &[String],
    ) -> Result<ColumnMap, Error> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| cell.trim().eq_ignore_ascii_case(name))
        };

        let category = self.category_column_index.or_else(|| find(CATEGORY_HEADER));
        let key = self.key_column_index.or_else(|| find(KEY_HEADER)).ok_or_else(|| {
            Error::parse_error(format!(
                "no `{}` column in header row {}",
                KEY_HEADER,
                self.header_row_index + 1
            ))
        })?;
        let languages = languages
            .iter()
            .enumerate()
            .map(|(position, lang)| {
                let column = find(lang.as_str())
                    .or_else(|| self.value_start_column_index.map(|start| start + position));
                (lang.clone(), column)
            })
            .collect();

        Ok(ColumnMap {
            category,
            key,
            languages,
        })
    }

    /// Turns a grid of cells into row records.
    ///
    /// An empty grid yields no rows. Rows whose cells are all blank are
    /// dropped; rows without a key are kept for the normalizer to skip.
    pub fn rows_from_grid(
        &self,
        grid: &[Vec<String>],
        languages: &[String],
    ) -> Result<Vec<RowRecord>, Error> {
        if grid.is_empty() {
            return Ok(Vec::new());
        }
        let header = grid.get(self.header_row_index).ok_or_else(|| {
            Error::parse_error(format!(
                "header row {} not found ({} rows in source)",
                self.header_row_index + 1,
                grid.len()
            ))
        })?;
        let columns = self.resolve_columns(header, languages)?;

        let rows = grid
            .iter()
            .enumerate()
            .skip(self.data_start_row_index)
            .filter(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
            .map(|(index, cells)| columns.record(cells, index + 1))
            .collect();
        Ok(rows)
    }
}

/// Resolved column positions for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub category: Option<usize>,
    pub key: usize,
    /// Column per language, in declaration order; `None` means always empty.
    pub languages: Vec<(String, Option<usize>)>,
}

impl ColumnMap {
    fn cell(cells: &[String], index: usize) -> Option<&str> {
        cells.get(index).map(|cell| cell.trim())
    }

    /// Builds the record for one grid row.
    pub fn record(&self, cells: &[String], row_number: usize) -> RowRecord {
        let values = self
            .languages
            .iter()
            .map(|(lang, column)| {
                let value = column
                    .and_then(|index| Self::cell(cells, index))
                    .unwrap_or_default();
                (lang.clone(), value.to_string())
            })
            .collect();

        RowRecord {
            category: self
                .category
                .and_then(|index| Self::cell(cells, index))
                .map(String::from),
            key: Self::cell(cells, self.key).map(String::from),
            values,
            row_number: Some(row_number),
        }
    }
}
