//! Project config files: `.langsheetrc.json`, `langsheet.toml`, `langsheet.yaml`
//! or `langsheet.yml` in the project root.
//!
//! Every field is optional here; command-line flags fill in or override
//! whatever the file leaves out.

use std::{
    fs,
    path::{Path, PathBuf},
};

use langsheet::SourceFormat;
use serde::{Deserialize, Serialize};

/// Config file names, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".langsheetrc.json",
    "langsheet.toml",
    "langsheet.yaml",
    "langsheet.yml",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    #[serde(alias = "excelPath")]
    pub source_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    #[serde(alias = "supportLanguages")]
    pub supported_languages: Option<Vec<String>>,
    pub sheet_name: Option<String>,
    pub header_row_index: Option<usize>,
    pub data_start_row_index: Option<usize>,
    pub category_column_index: Option<usize>,
    pub key_column_index: Option<usize>,
    pub value_start_column_index: Option<usize>,
    pub use_nested_keys: Option<bool>,
    pub use_acceleration: Option<bool>,
    pub acceleration_module: Option<PathBuf>,
    pub format: Option<SourceFormat>,
    pub file_name: Option<String>,
    pub debounce_ms: Option<u64>,
}

/// A config file and where it came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadResult {
    pub config: ConfigFile,
    /// `None` when no file was found and defaults are used.
    pub path: Option<PathBuf>,
}

/// Finds the first config file in `root`. Parent directories are not searched.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Parses a config file, choosing the syntax by extension.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config file {}: {}", path.display(), e))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let parsed = match extension.as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
        "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        other => {
            return Err(format!(
                "Unsupported config file extension: {}. Expected: json, toml, yaml, yml",
                other
            ));
        }
    };
    parsed.map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
}

/// Loads `explicit` if given, otherwise whatever config file `root` holds.
pub fn load_project_config(root: &Path, explicit: Option<&Path>) -> Result<ConfigLoadResult, String> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(root),
    };
    match path {
        Some(path) => {
            let config = load_config_file(&path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult::default()),
    }
}
