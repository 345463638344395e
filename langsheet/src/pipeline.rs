//! The conversion run: read the source, build the trees, write the files.
//!
//! When acceleration is enabled the loaded accelerator gets the first try.
//! If none could be loaded, or a single call fails, that run quietly uses the
//! standard pipeline instead.

use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use crate::{
    accel::{AccelerationLoader, AccelerationOptions, try_convert},
    config::ConverterConfig,
    error::Error,
    formats::SourceFormat,
    traits::read_source,
    tree::{TranslationSet, build_translations},
    writer::OutputWriter,
};

/// Which path produced the translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine {
    Standard,
    /// Carries the accelerator's name.
    Accelerated(String),
}

impl Display for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Standard => write!(f, "standard"),
            Engine::Accelerated(name) => write!(f, "accelerated ({})", name),
        }
    }
}

/// Translations built from one source, before anything is written.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub translations: TranslationSet,
    pub engine: Engine,
    /// Source rows read; unknown when an accelerator did the work.
    pub rows: Option<usize>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub engine: Engine,
    /// Files written, in language order.
    pub files: Vec<PathBuf>,
    pub rows: Option<usize>,
}

/// Owns the configuration and, when acceleration is on, the loader.
#[derive(Debug)]
pub struct Converter {
    config: ConverterConfig,
    format: SourceFormat,
    loader: Option<AccelerationLoader>,
}

impl Converter {
    /// Validates `config` and prepares a converter. Relative paths are used
    /// as-is; see [`ConverterConfig::resolve_paths`].
    pub fn new(config: ConverterConfig) -> Result<Self, Error> {
        config.validate()?;
        let format = config.source_format()?;
        let loader = config.use_acceleration.then(AccelerationLoader::new);
        Ok(Self {
            config,
            format,
            loader,
        })
    }

    /// Replaces the acceleration loader. Only consulted when the
    /// configuration enables acceleration.
    pub fn with_loader(mut self, loader: AccelerationLoader) -> Self {
        if self.config.use_acceleration {
            self.loader = Some(loader);
        }
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn source_path(&self) -> &Path {
        &self.config.source_path
    }

    pub fn loader(&self) -> Option<&AccelerationLoader> {
        self.loader.as_ref()
    }

    /// Runs one full conversion.
    ///
    /// A missing or unreadable source, or a structural conflict, aborts the
    /// run before any output file is touched.
    pub fn run(&self) -> Result<ConversionReport, Error> {
        let bytes = read_source(&self.config.source_path)?;
        let conversion = self.convert_bytes(&bytes)?;

        let files = OutputWriter::new(&self.config.output_dir)
            .with_file_name(self.config.file_name.as_str())
            .write(&conversion.translations)?;

        tracing::info!(
            source = %self.config.source_path.display(),
            engine = %conversion.engine,
            files = files.len(),
            "conversion finished"
        );
        Ok(ConversionReport {
            engine: conversion.engine,
            files,
            rows: conversion.rows,
        })
    }

    /// Converts source bytes without touching the file system.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<Conversion, Error> {
        if let Some(conversion) = self.accelerated(bytes) {
            return Ok(conversion);
        }
        self.standard(bytes)
    }

    fn standard(&self, bytes: &[u8]) -> Result<Conversion, Error> {
        let layout = self.config.layout();
        let languages = &self.config.supported_languages;
        let reader = self.format.reader(layout);
        let rows = reader.read_rows(bytes, layout, languages)?;
        tracing::debug!(reader = reader.name(), rows = rows.len(), "source parsed");

        let translations = build_translations(&rows, languages, self.config.key_mode())?;
        Ok(Conversion {
            translations,
            engine: Engine::Standard,
            rows: Some(rows.len()),
        })
    }

    fn accelerated(&self, bytes: &[u8]) -> Option<Conversion> {
        let loader = self.loader.as_ref()?;
        let accelerator = loader
            .initialize(self.config.acceleration_module.as_deref())
            .accelerator()?;

        let languages = &self.config.supported_languages;
        let options = AccelerationOptions::new(
            self.config.layout(),
            languages,
            self.config.key_mode(),
            self.format,
        );
        let result = try_convert(accelerator, bytes, &options).and_then(|translations| {
            TranslationSet::from_translations(languages, self.config.key_mode(), translations)
                .map_err(|e| e.to_string())
        });

        match result {
            Ok(translations) => Some(Conversion {
                translations,
                engine: Engine::Accelerated(accelerator.name().to_string()),
                rows: None,
            }),
            Err(reason) => {
                tracing::info!(
                    module = accelerator.name(),
                    %reason,
                    "accelerated conversion failed, using standard pipeline"
                );
                None
            }
        }
    }
}
