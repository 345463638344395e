//! CLI library for testing purposes

pub mod config_file;
pub mod convert;
pub mod validation;
pub mod watch;

pub use config_file::{ConfigFile, find_config_file, load_config_file};
pub use convert::{RunOptions, resolve_config, run_convert_command};
pub use watch::run_watch_command;
