#![forbid(unsafe_code)]
//! Localization spreadsheets to per-language i18n JSON.
//!
//! Reads a CSV, TSV or spreadsheet file whose rows carry a `category`, a `key`
//! and one column per language, and writes one JSON translation file per
//! language. Categories like `common/button` or `common.button` become nested
//! objects in the output.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use langsheet::{Converter, ConverterConfig};
//!
//! let config = ConverterConfig::new(
//!     "locales/strings.xlsx",
//!     "src/i18n",
//!     vec!["en".to_string(), "ko".to_string()],
//! );
//! let report = Converter::new(config)?.run()?;
//! println!("wrote {} files", report.files.len());
//! # Ok::<(), langsheet::Error>(())
//! ```
//!
//! # Pipeline
//!
//! - [`formats`]: source readers producing [`RowRecord`]s
//! - [`normalize`]: row records to key paths and per-language values
//! - [`tree`]: per-language translation trees with conflict detection
//! - [`writer`]: pretty-printed JSON output, one file per language
//! - [`accel`]: optional acceleration module tried before the pipeline above

pub mod accel;
pub mod config;
pub mod error;
pub mod formats;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod traits;
pub mod tree;
pub mod types;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    accel::{
        Acceleration, AccelerationLoader, AccelerationOptions, Accelerator, ConversionResult,
        LoaderState,
    },
    config::ConverterConfig,
    error::Error,
    formats::SourceFormat,
    layout::SheetLayout,
    normalize::normalize,
    pipeline::{Conversion, ConversionReport, Converter, Engine},
    traits::SourceReader,
    tree::{KeyMode, TranslationSet, TranslationTree},
    types::{KeyPath, NodeKind, NormalizedRow, RowRecord},
    writer::{OutputWriter, write_translations},
};
