//! Configuration for the VOPL tools.
//!
//! Settings persist to disk as `config.ron`. Every section falls back to its
//! defaults when missing, and command-line flags override loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CatalogConfig, Config, DebugConfig, ExportConfig, GridConfig};
pub use error::ConfigError;
