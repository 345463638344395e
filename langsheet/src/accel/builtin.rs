//! In-process accelerator compiled in with the `native-accel` feature.
//!
//! Converts straight from the cell grid to translation trees in one pass,
//! without collecting row records first.

use std::path::Path;

use super::{AccelerationOptions, Accelerator, ConversionResult, ENTRY_POINT, LoadStrategy};
use crate::{Error, tree::TranslationSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinModule;

impl LoadStrategy for BuiltinModule {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn load(&self, _module_path: Option<&Path>) -> Result<Box<dyn Accelerator>, String> {
        Ok(Box::new(NativeAccelerator))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeAccelerator;

impl NativeAccelerator {
    fn run(&self, bytes: &[u8], options: &AccelerationOptions) -> Result<TranslationSet, Error> {
        let layout = options.layout();
        layout.validate()?;
        let languages = &options.supported_languages;
        let grid = options.format.reader(&layout).read_grid(bytes)?;

        let mut set = TranslationSet::new(languages, options.key_mode());
        let Some(header) = grid.get(layout.header_row_index) else {
            return if grid.is_empty() {
                Ok(set)
            } else {
                Err(Error::parse_error(format!(
                    "header row {} not found ({} rows in source)",
                    layout.header_row_index + 1,
                    grid.len()
                )))
            };
        };
        let columns = layout.resolve_columns(header, languages)?;
        for (index, cells) in grid.iter().enumerate().skip(layout.data_start_row_index) {
            set.insert_record(&columns.record(cells, index + 1))?;
        }
        Ok(set)
    }
}

impl Accelerator for NativeAccelerator {
    fn name(&self) -> &str {
        "builtin"
    }

    fn entry_points(&self) -> Vec<String> {
        vec![ENTRY_POINT.to_string()]
    }

    fn convert(&self, bytes: &[u8], options: &AccelerationOptions) -> ConversionResult {
        match self.run(bytes, options) {
            Ok(set) => ConversionResult::ok(set.into_translations()),
            Err(e) => ConversionResult::failed(e.to_string()),
        }
    }
}
