use langsheet::SourceFormat;
use std::path::{Path, PathBuf};

/// Validation context for a conversion run
pub struct ValidationContext {
    pub source_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<String>,
    pub acceleration_module: Option<PathBuf>,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationContext {
    pub fn new() -> Self {
        Self {
            source_path: None,
            output_dir: None,
            format: None,
            acceleration_module: None,
        }
    }

    pub fn with_source_path(mut self, path: PathBuf) -> Self {
        self.source_path = Some(path);
        self
    }

    pub fn with_output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }

    pub fn with_format(mut self, format: String) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_acceleration_module(mut self, path: PathBuf) -> Self {
        self.acceleration_module = Some(path);
        self
    }
}

/// Validate the source path is a file when it exists.
///
/// A missing source is not an error here: `watch` may start before the file
/// is created, and `convert` reports it when reading.
pub fn validate_source_path(path: &Path) -> Result<(), String> {
    if path.exists() && !path.is_file() {
        return Err(format!("Source path is not a file: {}", path.display()));
    }
    Ok(())
}

/// Validate the output directory is a directory or can be created
pub fn validate_output_dir(path: &Path) -> Result<(), String> {
    if path.exists() && !path.is_dir() {
        return Err(format!("Output path is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Validate format string
pub fn validate_format(format: &str) -> Result<(), String> {
    if format.trim().is_empty() {
        return Err("Format cannot be empty".to_string());
    }
    format.parse::<SourceFormat>().map(|_| ()).map_err(|_| {
        format!(
            "Unsupported format: {}. Supported formats: csv, tsv, xlsx, xlsm, xlsb, xls, ods",
            format
        )
    })
}

/// Split, trim and de-blank language codes given on the command line
pub fn parse_languages(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(String::from)
        .collect()
}

/// Validate a complete validation context
pub fn validate_context(context: &ValidationContext) -> Result<(), String> {
    if let Some(ref source) = context.source_path {
        validate_source_path(source).map_err(|e| format!("Source validation failed: {}", e))?;
    }

    if let Some(ref output) = context.output_dir {
        validate_output_dir(output).map_err(|e| format!("Output validation failed: {}", e))?;
    }

    if let Some(ref format) = context.format {
        validate_format(format).map_err(|e| format!("Format validation failed: {}", e))?;
    }

    // A missing module is not fatal; the loader falls back to the next strategy.
    if let Some(ref module) = context.acceleration_module {
        if !module.exists() {
            tracing::warn!(module = %module.display(), "acceleration module not found");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_source_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("strings.csv");
        fs::write(&file, "key,en\n").unwrap();

        assert!(validate_source_path(&file).is_ok());
        assert!(validate_source_path(&temp.path().join("later.csv")).is_ok());
        let err = validate_source_path(temp.path()).unwrap_err();
        assert!(err.contains("not a file"));
    }

    #[test]
    fn test_validate_output_dir() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("taken");
        fs::write(&file, "").unwrap();

        assert!(validate_output_dir(temp.path()).is_ok());
        assert!(validate_output_dir(&temp.path().join("new/dir")).is_ok());
        assert!(validate_output_dir(&file).is_err());
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("csv").is_ok());
        assert!(validate_format("XLSX").is_ok());
        assert!(validate_format("").is_err());
        assert!(validate_format("docx").unwrap_err().contains("Unsupported format"));
    }

    #[test]
    fn test_parse_languages() {
        let values = vec!["en, ko".to_string(), "ja,".to_string(), " ".to_string()];
        assert_eq!(parse_languages(&values), vec!["en", "ko", "ja"]);
    }

    #[test]
    fn test_validate_context() {
        let temp = TempDir::new().unwrap();
        let context = ValidationContext::new()
            .with_source_path(temp.path().join("strings.csv"))
            .with_output_dir(temp.path().join("out"))
            .with_format("csv".to_string())
            .with_acceleration_module(temp.path().join("missing-module"));
        assert!(validate_context(&context).is_ok());

        let context = ValidationContext::new().with_format("pdf".to_string());
        assert!(
            validate_context(&context)
                .unwrap_err()
                .starts_with("Format validation failed")
        );
    }
}
