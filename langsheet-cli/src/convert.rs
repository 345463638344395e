use crate::config_file::{ConfigFile, load_project_config};
use crate::validation::{self, ValidationContext};

use langsheet::config::DEFAULT_DEBOUNCE_MS;
use langsheet::writer::DEFAULT_FILE_NAME;
use langsheet::{ConversionReport, Converter, ConverterConfig, SheetLayout, SourceFormat};
use std::path::PathBuf;

/// Options shared by `convert` and `watch`; every field overrides the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub languages: Vec<String>,
    pub flat: bool,
    pub accelerate: bool,
    pub module: Option<PathBuf>,
    pub sheet: Option<String>,
    pub header_row: Option<usize>,
    pub data_start_row: Option<usize>,
    pub category_column: Option<usize>,
    pub key_column: Option<usize>,
    pub value_start_column: Option<usize>,
    pub file_name: Option<String>,
    pub format: Option<String>,
}

/// Merges the config file and flags into a validated converter config with
/// paths resolved against the project root.
pub fn resolve_config(options: &RunOptions) -> Result<ConverterConfig, String> {
    let root = match &options.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()
            .map_err(|e| format!("Cannot determine current directory: {}", e))?,
    };
    let file = load_project_config(&root, options.config.as_deref())?.config;
    let config = merge(options, file)?.resolve_paths(&root);

    let mut context = ValidationContext::new()
        .with_source_path(config.source_path.clone())
        .with_output_dir(config.output_dir.clone());
    if let Some(ref format) = options.format {
        context = context.with_format(format.clone());
    }
    if let Some(ref module) = config.acceleration_module {
        context = context.with_acceleration_module(module.clone());
    }
    validation::validate_context(&context)?;

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn merge(options: &RunOptions, file: ConfigFile) -> Result<ConverterConfig, String> {
    let source = options
        .source
        .clone()
        .or(file.source_path)
        .ok_or("No source file: pass --source or set sourcePath in the config file")?;
    let output_dir = options
        .output_dir
        .clone()
        .or(file.output_dir)
        .ok_or("No output directory: pass --output-dir or set outputDir in the config file")?;

    let mut languages = validation::parse_languages(&options.languages);
    if languages.is_empty() {
        languages = file.supported_languages.unwrap_or_default();
    }
    if languages.is_empty() {
        return Err(
            "No languages: pass --languages or set supportedLanguages in the config file"
                .to_string(),
        );
    }

    let format = match &options.format {
        Some(name) => Some(
            name.parse::<SourceFormat>()
                .map_err(|e| format!("Format validation failed: {}", e))?,
        ),
        None => file.format,
    };

    let header_row = options
        .header_row
        .or(file.header_row_index)
        .unwrap_or_default();
    let layout = SheetLayout::new()
        .with_sheet_name(options.sheet.clone().or(file.sheet_name))
        .with_header_row(header_row)
        .with_data_start_row(
            options
                .data_start_row
                .or(file.data_start_row_index)
                .unwrap_or(header_row + 1),
        )
        .with_category_column(options.category_column.or(file.category_column_index))
        .with_key_column(options.key_column.or(file.key_column_index))
        .with_value_start_column(options.value_start_column.or(file.value_start_column_index));

    Ok(ConverterConfig::new(source, output_dir, languages)
        .with_layout(layout)
        .with_nested_keys(!options.flat && file.use_nested_keys.unwrap_or(true))
        .with_acceleration(options.accelerate || file.use_acceleration.unwrap_or(false))
        .with_acceleration_module(options.module.clone().or(file.acceleration_module))
        .with_format(format)
        .with_file_name(
            options
                .file_name
                .clone()
                .or(file.file_name)
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        )
        .with_debounce_ms(file.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)))
}

/// One-shot conversion.
pub fn run_convert_command(options: &RunOptions) -> Result<ConversionReport, String> {
    let config = resolve_config(options)?;
    let converter = Converter::new(config).map_err(|e| e.to_string())?;
    converter.run().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(root: &std::path::Path) -> RunOptions {
        RunOptions {
            root: Some(root.to_path_buf()),
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_flags_only() {
        let temp = TempDir::new().unwrap();
        let config = resolve_config(&RunOptions {
            source: Some(PathBuf::from("strings.csv")),
            output_dir: Some(PathBuf::from("out")),
            languages: vec!["en,ko".to_string()],
            flat: true,
            ..options(temp.path())
        })
        .unwrap();

        assert_eq!(config.source_path, temp.path().join("strings.csv"));
        assert_eq!(config.output_dir, temp.path().join("out"));
        assert_eq!(config.supported_languages, vec!["en", "ko"]);
        assert!(!config.use_nested_keys);
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".langsheetrc.json"),
            r#"{
                "excelPath": "locales/strings.xlsx",
                "outputDir": "src/i18n",
                "supportLanguages": ["en", "ko"],
                "headerRowIndex": 2,
                "useAcceleration": true,
                "debounceMs": 500
            }"#,
        )
        .unwrap();

        let config = resolve_config(&RunOptions {
            output_dir: Some(PathBuf::from("public/locales")),
            languages: vec!["ja".to_string()],
            ..options(temp.path())
        })
        .unwrap();

        assert_eq!(config.source_path, temp.path().join("locales/strings.xlsx"));
        assert_eq!(config.output_dir, temp.path().join("public/locales"));
        assert_eq!(config.supported_languages, vec!["ja"]);
        assert_eq!(config.layout.header_row_index, 2);
        assert_eq!(config.layout.data_start_row_index, 3);
        assert!(config.use_acceleration);
        assert_eq!(config.debounce_ms, 500);
    }

    #[test]
    fn test_missing_required_options() {
        let temp = TempDir::new().unwrap();
        let err = resolve_config(&options(temp.path())).unwrap_err();
        assert!(err.contains("--source"));

        let err = resolve_config(&RunOptions {
            source: Some(PathBuf::from("strings.csv")),
            output_dir: Some(PathBuf::from("out")),
            ..options(temp.path())
        })
        .unwrap_err();
        assert!(err.contains("--languages"));
    }

    #[test]
    fn test_bad_format_flag() {
        let temp = TempDir::new().unwrap();
        let err = resolve_config(&RunOptions {
            source: Some(PathBuf::from("strings.csv")),
            output_dir: Some(PathBuf::from("out")),
            languages: vec!["en".to_string()],
            format: Some("docx".to_string()),
            ..options(temp.path())
        })
        .unwrap_err();
        assert!(err.contains("Format validation failed"));
    }

    #[test]
    fn test_run_convert_command() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("strings.csv"),
            "category,key,en\ncommon,ok,OK\n",
        )
        .unwrap();

        let report = run_convert_command(&RunOptions {
            source: Some(PathBuf::from("strings.csv")),
            output_dir: Some(PathBuf::from("out")),
            languages: vec!["en".to_string()],
            ..options(temp.path())
        })
        .unwrap();
        assert_eq!(report.files, vec![temp.path().join("out/translation.en.json")]);
    }
}
