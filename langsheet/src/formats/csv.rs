//! Support for CSV and TSV sources.
//!
//! The first row names the columns (`category`, `key`, then one column per
//! language code). Cells are trimmed. Blank lines become empty grid rows and
//! a quoted cell spanning lines keeps its record on the line it starts, so
//! grid indices are file lines. UTF-8 and UTF-16 files with a byte-order mark
//! are decoded transparently, which covers CSVs exported from Excel.
use std::io::Read;

use crate::{error::Error, traits::SourceReader};

/// Reader for delimiter-separated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvReader {
    delimiter: u8,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader {
    /// Comma-separated reader.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Tab-separated reader.
    pub fn tsv() -> Self {
        Self { delimiter: b'\t' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl SourceReader for CsvReader {
    fn name(&self) -> &'static str {
        if self.delimiter == b'\t' { "tsv" } else { "csv" }
    }

    fn read_grid(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, Error> {
        // Auto-detect BOM, decode to UTF-8; passthrough UTF-8
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(bytes);
        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(|e| {
            Error::parse_error(format!("source is not valid text: {}", e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(self.delimiter)
            .from_reader(decoded.as_bytes());

        let mut grid: Vec<Vec<String>> = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if let Some(position) = record.position() {
                let line_index = record_line_index(&decoded, position);
                if grid.len() < line_index {
                    grid.resize_with(line_index, Vec::new);
                }
            }
            grid.push(record.iter().map(String::from).collect());
        }
        Ok(grid)
    }
}

/// 0-based line a record starts on. The reader stamps a record with the
/// position reached after the previous one, before skipping empty lines.
fn record_line_index(text: &str, position: &csv::Position) -> usize {
    let start = usize::try_from(position.byte()).unwrap_or(usize::MAX);
    let skipped = text
        .as_bytes()
        .get(start..)
        .unwrap_or_default()
        .iter()
        .take_while(|byte| matches!(byte, b'\r' | b'\n'))
        .filter(|byte| **byte == b'\n')
        .count();
    usize::try_from(position.line())
        .unwrap_or(usize::MAX)
        .saturating_sub(1)
        .saturating_add(skipped)
}
