//! The source reader seam: anything that can turn file bytes into a grid of
//! cells can feed the conversion pipeline.

use std::{fs, io, path::Path};

use crate::{error::Error, layout::SheetLayout, types::RowRecord};

/// Parses a source file into rows of cell strings.
///
/// Implementations only have to provide [`SourceReader::read_grid`]; the
/// layout handling and file access come for free.
///
/// # Example
///
/// ```rust,no_run
/// use langsheet::{SheetLayout, SourceReader, formats::CsvReader};
///
/// let languages = vec!["en".to_string(), "ko".to_string()];
/// let rows = CsvReader::new().read_path("strings.csv", &SheetLayout::new(), &languages)?;
/// println!("{} rows", rows.len());
/// # Ok::<(), langsheet::Error>(())
/// ```
pub trait SourceReader {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Parses raw file bytes into a grid; row `i` of the grid is row `i + 1`
    /// of the file. Readers pad with empty rows where the file has lines or
    /// sheet rows that hold no record.
    fn read_grid(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, Error>;

    /// Parses raw bytes into row records using `layout`.
    fn read_rows(
        &self,
        bytes: &[u8],
        layout: &SheetLayout,
        languages: &[String],
    ) -> Result<Vec<RowRecord>, Error> {
        let grid = self.read_grid(bytes)?;
        layout.rows_from_grid(&grid, languages)
    }

    /// Reads and parses a file. A missing file is [`Error::SourceNotFound`].
    fn read_path(
        &self,
        path: impl AsRef<Path>,
        layout: &SheetLayout,
        languages: &[String],
    ) -> Result<Vec<RowRecord>, Error>
    where
        Self: Sized,
    {
        let bytes = read_source(path.as_ref())?;
        self.read_rows(&bytes, layout, languages)
    }
}

/// Reads a source file, mapping "not found" to [`Error::SourceNotFound`].
pub fn read_source(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::SourceNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })
}
