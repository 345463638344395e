//! Converter configuration.
//!
//! Option names are camelCase so a config file reads the same as the build
//! plugin options it replaces; `excelPath` and `supportLanguages` are accepted
//! as aliases.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    formats::SourceFormat,
    layout::SheetLayout,
    tree::KeyMode,
    writer::{DEFAULT_FILE_NAME, LANG_PLACEHOLDER},
};

/// Default quiet period before a changed source is re-read.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

fn default_true() -> bool {
    true
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Everything a conversion run needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Spreadsheet or CSV file to read.
    #[serde(alias = "excelPath")]
    pub source_path: PathBuf,
    /// Directory receiving one JSON file per language.
    pub output_dir: PathBuf,
    /// Language codes, in output order.
    #[serde(alias = "supportLanguages")]
    pub supported_languages: Vec<String>,
    #[serde(flatten)]
    pub layout: SheetLayout,
    /// Nested objects when true, `category/key` strings when false.
    #[serde(default = "default_true")]
    pub use_nested_keys: bool,
    #[serde(default)]
    pub use_acceleration: bool,
    /// Where to look for the external acceleration module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration_module: Option<PathBuf>,
    /// Source format; inferred from the extension when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<SourceFormat>,
    /// Output file name template; `{lang}` is replaced by the language code.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl ConverterConfig {
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        supported_languages: Vec<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            output_dir: output_dir.into(),
            supported_languages,
            layout: SheetLayout::default(),
            use_nested_keys: true,
            use_acceleration: false,
            acceleration_module: None,
            format: None,
            file_name: default_file_name(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_nested_keys(mut self, use_nested_keys: bool) -> Self {
        self.use_nested_keys = use_nested_keys;
        self
    }

    pub fn with_acceleration(mut self, use_acceleration: bool) -> Self {
        self.use_acceleration = use_acceleration;
        self
    }

    pub fn with_acceleration_module(mut self, module: Option<PathBuf>) -> Self {
        self.acceleration_module = module;
        self
    }

    pub fn with_format(mut self, format: Option<SourceFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn key_mode(&self) -> KeyMode {
        KeyMode::from_nested_flag(self.use_nested_keys)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The configured format, or the one implied by the source extension.
    pub fn source_format(&self) -> Result<SourceFormat, Error> {
        match self.format {
            Some(format) => Ok(format),
            None => SourceFormat::from_path(&self.source_path),
        }
    }

    /// Makes relative paths relative to `root`.
    pub fn resolve_paths(mut self, root: &Path) -> Self {
        let resolve = |path: PathBuf| if path.is_relative() { root.join(path) } else { path };
        self.source_path = resolve(self.source_path);
        self.output_dir = resolve(self.output_dir);
        self.acceleration_module = self.acceleration_module.map(resolve);
        self
    }

    /// Rejects configurations that cannot produce a sensible run.
    ///
    /// Language codes that are not BCP-47 identifiers only produce a warning;
    /// any code that is safe in a file name is accepted.
    pub fn validate(&self) -> Result<(), Error> {
        if self.supported_languages.is_empty() {
            return Err(Error::config_error("supportedLanguages must not be empty"));
        }

        let mut seen = HashSet::new();
        for lang in &self.supported_languages {
            if lang.trim().is_empty() {
                return Err(Error::config_error("language codes must not be blank"));
            }
            if lang.contains(['/', '\\']) || lang.contains("..") {
                return Err(Error::config_error(format!(
                    "language code `{}` cannot be used in a file name",
                    lang
                )));
            }
            if !seen.insert(lang.as_str()) {
                return Err(Error::config_error(format!(
                    "language `{}` is listed more than once",
                    lang
                )));
            }
            if lang.parse::<LanguageIdentifier>().is_err() {
                tracing::warn!(language = %lang, "not a valid BCP-47 language identifier");
            }
        }

        if !self.file_name.contains(LANG_PLACEHOLDER) {
            return Err(Error::config_error(format!(
                "fileName `{}` must contain {}",
                self.file_name, LANG_PLACEHOLDER
            )));
        }

        self.layout.validate()
    }
}
