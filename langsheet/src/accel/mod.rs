//! Optional acceleration module.
//!
//! An accelerator is a compiled converter that takes the raw source bytes and
//! returns finished translation trees. The [`AccelerationLoader`] resolves one
//! at most once by trying a fixed list of [`LoadStrategy`]s in order; the first
//! strategy that yields a handle exposing the [`ENTRY_POINT`] wins. When every
//! strategy fails, callers use the standard pipeline.
//!
//! ```text
//! Unloaded -> Probing -> Loaded
//!                     -> Unavailable
//! ```

#[cfg(feature = "native-accel")]
pub mod builtin;
pub mod external;

use std::{
    any::Any,
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::{
        OnceLock,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, formats::SourceFormat, layout::SheetLayout, tree::KeyMode};

/// The function every accelerator must expose.
pub const ENTRY_POINT: &str = "convert";

/// Options handed to an accelerator with each call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccelerationOptions {
    pub supported_languages: Vec<String>,
    pub sheet_name: Option<String>,
    pub header_row_index: usize,
    pub data_start_row_index: usize,
    pub category_column_index: Option<usize>,
    pub key_column_index: Option<usize>,
    pub value_start_column_index: Option<usize>,
    pub use_nested_keys: bool,
    pub format: SourceFormat,
}

impl AccelerationOptions {
    pub fn new(
        layout: &SheetLayout,
        languages: &[String],
        mode: KeyMode,
        format: SourceFormat,
    ) -> Self {
        Self {
            supported_languages: languages.to_vec(),
            sheet_name: layout.sheet_name.clone(),
            header_row_index: layout.header_row_index,
            data_start_row_index: layout.data_start_row_index,
            category_column_index: layout.category_column_index,
            key_column_index: layout.key_column_index,
            value_start_column_index: layout.value_start_column_index,
            use_nested_keys: mode == KeyMode::Nested,
            format,
        }
    }

    /// The sheet layout these options describe.
    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            sheet_name: self.sheet_name.clone(),
            header_row_index: self.header_row_index,
            data_start_row_index: self.data_start_row_index,
            category_column_index: self.category_column_index,
            key_column_index: self.key_column_index,
            value_start_column_index: self.value_start_column_index,
        }
    }

    pub fn key_mode(&self) -> KeyMode {
        KeyMode::from_nested_flag(self.use_nested_keys)
    }
}

/// What an accelerator returns: `{ success, translations, error }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    #[serde(default)]
    pub translations: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn ok(translations: HashMap<String, Value>) -> Self {
        Self {
            success: true,
            translations,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            translations: HashMap::new(),
            error: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<HashMap<String, Value>, String> {
        if self.success {
            Ok(self.translations)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "accelerator reported failure without a message".to_string()))
        }
    }
}

/// A loaded acceleration module.
pub trait Accelerator: Send + Sync + Debug {
    /// Human-readable origin, used in logs.
    fn name(&self) -> &str;

    /// Functions the module exposes. Must include [`ENTRY_POINT`].
    fn entry_points(&self) -> Vec<String>;

    fn convert(&self, bytes: &[u8], options: &AccelerationOptions) -> ConversionResult;
}

/// One way of locating and initializing an accelerator.
pub trait LoadStrategy: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Attempts to produce a handle. Failures are reported, never raised.
    fn load(&self, module_path: Option<&Path>) -> Result<Box<dyn Accelerator>, String>;
}

/// Why one strategy did not produce a usable handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub strategy: &'static str,
    pub reason: String,
}

impl Display for ProbeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Unloaded,
    Probing,
    Loaded,
    Unavailable,
}

/// Outcome of [`AccelerationLoader::initialize`].
#[derive(Debug)]
pub enum Acceleration {
    Loaded(Box<dyn Accelerator>),
    Unavailable(Vec<ProbeFailure>),
}

impl Acceleration {
    pub fn accelerator(&self) -> Option<&dyn Accelerator> {
        match self {
            Acceleration::Loaded(accelerator) => Some(accelerator.as_ref()),
            Acceleration::Unavailable(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Acceleration::Loaded(_))
    }

    /// One-line summary of every failed probe.
    pub fn describe_failures(&self) -> String {
        match self {
            Acceleration::Loaded(_) => String::new(),
            Acceleration::Unavailable(failures) if failures.is_empty() => {
                "no load strategies configured".to_string()
            }
            Acceleration::Unavailable(failures) => failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Resolves an accelerator once and caches the outcome.
#[derive(Debug)]
pub struct AccelerationLoader {
    strategies: Vec<Box<dyn LoadStrategy>>,
    outcome: OnceLock<Acceleration>,
    probing: AtomicBool,
}

impl Default for AccelerationLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelerationLoader {
    /// Loader with the standard strategies: the external module, then the
    /// built-in one when compiled with `native-accel`.
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut strategies: Vec<Box<dyn LoadStrategy>> =
            vec![Box::new(external::ExternalModule::new())];
        #[cfg(feature = "native-accel")]
        strategies.push(Box::new(builtin::BuiltinModule));
        Self::with_strategies(strategies)
    }

    /// Loader probing `strategies` in the given order.
    pub fn with_strategies(strategies: Vec<Box<dyn LoadStrategy>>) -> Self {
        Self {
            strategies,
            outcome: OnceLock::new(),
            probing: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> LoaderState {
        match self.outcome.get() {
            Some(Acceleration::Loaded(_)) => LoaderState::Loaded,
            Some(Acceleration::Unavailable(_)) => LoaderState::Unavailable,
            None if self.probing.load(Ordering::Acquire) => LoaderState::Probing,
            None => LoaderState::Unloaded,
        }
    }

    /// Probes the strategies on first call; later calls return the cached
    /// outcome whatever `module_path` they pass.
    pub fn initialize(&self, module_path: Option<&Path>) -> &Acceleration {
        self.outcome.get_or_init(|| {
            self.probing.store(true, Ordering::Release);
            let outcome = self.probe(module_path);
            self.probing.store(false, Ordering::Release);
            match &outcome {
                Acceleration::Loaded(accelerator) => {
                    tracing::info!(module = accelerator.name(), "acceleration module loaded");
                }
                Acceleration::Unavailable(_) => {
                    tracing::info!(
                        reason = %outcome.describe_failures(),
                        "acceleration unavailable, using standard pipeline"
                    );
                }
            }
            outcome
        })
    }

    /// Like [`initialize`](Self::initialize) but turns an unavailable module
    /// into [`Error::AccelerationUnavailable`].
    pub fn require(&self, module_path: Option<&Path>) -> Result<&dyn Accelerator, Error> {
        let outcome = self.initialize(module_path);
        outcome
            .accelerator()
            .ok_or_else(|| Error::AccelerationUnavailable(outcome.describe_failures()))
    }

    fn probe(&self, module_path: Option<&Path>) -> Acceleration {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            let attempt = panic::catch_unwind(AssertUnwindSafe(|| strategy.load(module_path)))
                .unwrap_or_else(|payload| {
                    Err(format!("panicked while loading: {}", panic_message(&*payload)))
                });
            let reason = match attempt {
                Ok(accelerator) if exposes_entry_point(accelerator.as_ref()) => {
                    tracing::debug!(strategy = strategy.name(), "probe succeeded");
                    return Acceleration::Loaded(accelerator);
                }
                Ok(accelerator) => format!(
                    "{} does not expose `{}`",
                    accelerator.name(),
                    ENTRY_POINT
                ),
                Err(reason) => reason,
            };
            tracing::debug!(strategy = strategy.name(), %reason, "probe failed");
            failures.push(ProbeFailure {
                strategy: strategy.name(),
                reason,
            });
        }
        Acceleration::Unavailable(failures)
    }
}

fn exposes_entry_point(accelerator: &dyn Accelerator) -> bool {
    accelerator
        .entry_points()
        .iter()
        .any(|name| name == ENTRY_POINT)
}

/// Runs one conversion, turning an error result or a panic into `Err`.
pub fn try_convert(
    accelerator: &dyn Accelerator,
    bytes: &[u8],
    options: &AccelerationOptions,
) -> Result<HashMap<String, Value>, String> {
    panic::catch_unwind(AssertUnwindSafe(|| accelerator.convert(bytes, options)))
        .map_err(|payload| format!("{} panicked: {}", accelerator.name(), panic_message(&*payload)))?
        .into_result()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
