//! Support for workbook sources (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
//!
//! The workbook type is sniffed from the bytes, so a misnamed file still
//! loads. Only one worksheet is read: the configured one, or the first.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::{error::Error, traits::SourceReader};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpreadsheetReader {
    sheet_name: Option<String>,
}

impl SpreadsheetReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a worksheet by name; `None` reads the first sheet.
    pub fn with_sheet_name(mut self, sheet_name: Option<String>) -> Self {
        self.sheet_name = sheet_name;
        self
    }
}

impl SourceReader for SpreadsheetReader {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn read_grid(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, Error> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let names = workbook.sheet_names();

        let sheet = match &self.sheet_name {
            Some(wanted) => names
                .iter()
                .find(|name| *name == wanted)
                .cloned()
                .ok_or_else(|| {
                    Error::parse_error(format!(
                        "worksheet `{}` not found (available: {})",
                        wanted,
                        names.join(", ")
                    ))
                })?,
            None => match names.first() {
                Some(first) => first.clone(),
                None => return Ok(Vec::new()),
            },
        };

        tracing::debug!(sheet = %sheet, "reading worksheet");
        let range = workbook.worksheet_range(&sheet)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Ok(place_at_origin(range.start(), rows))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// A used range starts at its first non-empty cell; shift it back so grid
/// indices match sheet row and column indices.
fn place_at_origin(start: Option<(u32, u32)>, rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let (row_offset, col_offset) = match start {
        Some((row, col)) => (row as usize, col as usize),
        None => return rows,
    };
    let mut grid = vec![Vec::new(); row_offset];
    grid.extend(rows.into_iter().map(|row| {
        let mut padded = vec![String::new(); col_offset];
        padded.extend(row);
        padded
    }));
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SheetLayout;
    use rust_xlsxwriter::Workbook;

    /// A cover sheet first, then a data sheet whose table starts at B3.
    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let cover = workbook.add_worksheet();
        cover.set_name("Cover").unwrap();
        cover.write_string(0, 0, "Release 2").unwrap();

        let data = workbook.add_worksheet();
        data.set_name("Data").unwrap();
        data.write_string(2, 1, "key").unwrap();
        data.write_string(2, 2, "en").unwrap();
        data.write_string(3, 1, "items").unwrap();
        data.write_number(3, 2, 42.0).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_place_at_origin_pads_rows_and_columns() {
        let rows = vec![vec!["key".to_string(), "en".to_string()]];
        let grid = place_at_origin(Some((2, 1)), rows);
        assert_eq!(grid.len(), 3);
        assert!(grid[0].is_empty());
        assert!(grid[1].is_empty());
        assert_eq!(grid[2], vec!["", "key", "en"]);
    }

    #[test]
    fn test_place_at_origin_without_start() {
        let rows = vec![vec!["a".to_string()]];
        assert_eq!(place_at_origin(None, rows.clone()), rows);
        assert_eq!(place_at_origin(Some((0, 0)), rows.clone()), rows);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("안녕".to_string())), "안녕");
        assert_eq!(cell_text(&Data::Int(3)), "3");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }

    #[test]
    fn test_named_sheet_keeps_sheet_coordinates() {
        let grid = SpreadsheetReader::new()
            .with_sheet_name(Some("Data".to_string()))
            .read_grid(&workbook_bytes())
            .unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid[0].is_empty());
        assert_eq!(grid[2], vec!["", "key", "en"]);
        assert_eq!(grid[3], vec!["", "items", "42"]);

        let layout = SheetLayout::new()
            .with_sheet_name(Some("Data".to_string()))
            .with_header_row(2)
            .with_data_start_row(3);
        let rows = SpreadsheetReader::new()
            .with_sheet_name(layout.sheet_name.clone())
            .read_rows(&workbook_bytes(), &layout, &["en".to_string()])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.as_deref(), Some("items"));
        assert_eq!(rows[0].values.get("en"), Some(&"42".to_string()));
        assert_eq!(rows[0].row_number, Some(4));
    }

    #[test]
    fn test_first_sheet_by_default() {
        let grid = SpreadsheetReader::new().read_grid(&workbook_bytes()).unwrap();
        assert_eq!(grid, vec![vec!["Release 2".to_string()]]);
    }

    #[test]
    fn test_unknown_sheet_lists_available_sheets() {
        let err = SpreadsheetReader::new()
            .with_sheet_name(Some("Strings".to_string()))
            .read_grid(&workbook_bytes())
            .unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("available: Cover, Data"));
    }

    #[test]
    fn test_garbage_bytes_are_parse_errors() {
        let err = SpreadsheetReader::new()
            .read_grid(b"definitely not a workbook")
            .unwrap_err();
        assert!(err.is_parse_error());
    }
}
