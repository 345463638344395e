//! Writes translation trees to disk, one JSON file per language.
//!
//! Files are fully regenerated on every run. Each one goes to a temporary
//! sibling first and is renamed into place, so a reader never sees a
//! half-written file. Writes are not transactional across languages.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{error::Error, tree::TranslationSet};

/// Placeholder replaced by the language code in file name templates.
pub const LANG_PLACEHOLDER: &str = "{lang}";

/// Default output file name template.
pub const DEFAULT_FILE_NAME: &str = "translation.{lang}.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputWriter {
    dir: PathBuf,
    file_name: String,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output path for one language.
    pub fn file_path(&self, language: &str) -> PathBuf {
        self.dir
            .join(self.file_name.replace(LANG_PLACEHOLDER, language))
    }

    /// Writes every language's tree and returns the paths written, in
    /// language order.
    pub fn write(&self, translations: &TranslationSet) -> Result<Vec<PathBuf>, Error> {
        create_dir(&self.dir)?;

        let mut written = Vec::with_capacity(translations.languages().len());
        for (language, tree) in translations.iter() {
            let path = self.file_path(language);
            if let Some(parent) = path.parent() {
                create_dir(parent)?;
            }
            let json = tree.to_json_pretty()?;
            write_atomic(&path, json.as_bytes())?;
            tracing::debug!(language, path = %path.display(), "wrote translations");
            written.push(path);
        }
        Ok(written)
    }
}

/// Writes `translations` into `dir` with the default file names.
pub fn write_translations(
    dir: impl Into<PathBuf>,
    translations: &TranslationSet,
) -> Result<Vec<PathBuf>, Error> {
    OutputWriter::new(dir).write(translations)
}

fn create_dir(dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    let result = fs::write(&temp, contents).and_then(|()| fs::rename(&temp, path));
    result.map_err(|source| {
        let _ = fs::remove_file(&temp);
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}
