//! Command-line overrides shared by the VOPL binaries.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Global flags. Values given here override `config.ron`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Grid width in cells.
    #[arg(long, global = true)]
    pub width: Option<u32>,

    /// Grid height in cells (number of layers).
    #[arg(long, global = true)]
    pub height: Option<u32>,

    /// Grid depth in cells (rows per layer).
    #[arg(long, global = true)]
    pub depth: Option<u32>,

    /// Chunk id written into updates documents.
    #[arg(long, global = true)]
    pub chunk_id: Option<String>,

    /// Log filter (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.grid.width = w;
        }
        if let Some(h) = args.height {
            self.grid.height = h;
        }
        if let Some(d) = args.depth {
            self.grid.depth = d;
        }
        if let Some(ref id) = args.chunk_id {
            self.export.chunk_id = id.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: CliArgs,
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(4),
            chunk_id: Some("scene".to_string()),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.grid.width, 4);
        assert_eq!(config.export.chunk_id, "scene");
        // Non-overridden fields retain defaults
        assert_eq!(config.grid.height, 16);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flags_parse() {
        let harness = Harness::try_parse_from([
            "vopl",
            "--width",
            "8",
            "--depth",
            "2",
            "--log-level",
            "debug",
            "--config",
            "/tmp/vopl",
        ])
        .unwrap();
        assert_eq!(harness.args.width, Some(8));
        assert_eq!(harness.args.height, None);
        assert_eq!(harness.args.depth, Some(2));
        assert_eq!(harness.args.log_level.as_deref(), Some("debug"));
        assert_eq!(harness.args.config, Some(PathBuf::from("/tmp/vopl")));
    }
}
