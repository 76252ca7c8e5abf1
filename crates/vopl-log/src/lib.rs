//! Logging setup for the VOPL tools.
//!
//! Installs a `tracing` subscriber with a console layer and, when requested,
//! a JSON file layer. The filter comes from `RUST_LOG` if set, otherwise from
//! the config's `debug.log_level`.

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vopl_config::Config;

/// Filter used when neither `RUST_LOG` nor the config provides one.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written into the log directory.
pub const LOG_FILE_NAME: &str = "vopl.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file
/// * `file_logging` - write [`LOG_FILE_NAME`] into `log_dir` as well
/// * `config` - source of the fallback log level
///
/// Console output goes to stderr so command output on stdout stays clean.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(log_dir: Option<&Path>, file_logging: bool, config: Option<&Config>) {
    let filter_str = filter_from_config(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if file_logging
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        let _ = subscriber.with(file_layer).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Filter string taken from `config`, falling back to [`DEFAULT_FILTER`].
fn filter_from_config(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_filter_from_config() {
        assert_eq!(filter_from_config(None), "info");

        let mut config = Config::default();
        config.debug.log_level = "debug,vopl_voxel=trace".to_string();
        assert_eq!(filter_from_config(Some(&config)), "debug,vopl_voxel=trace");

        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_from_config(Some(&config)), "info");
    }

    #[test]
    fn test_env_filter_parsing() {
        for filter_str in ["info", "debug,vopl_voxel=trace", "warn,vopl_app=debug", "error"] {
            let result = EnvFilter::try_new(filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {filter_str}");
        }
    }

    #[test]
    fn test_init_with_file_logging() {
        let dir = tempfile::tempdir().unwrap();
        init_logging(Some(dir.path()), true, None);
        tracing::info!("file logging smoke test");
        assert!(dir.path().join(LOG_FILE_NAME).exists());
    }
}
