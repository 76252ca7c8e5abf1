//! The `vopl` command-line tool.

mod commands;
mod platform;

use std::process::ExitCode;

use clap::Parser;
use vopl_config::{CliArgs, Config};

use crate::commands::{AppError, Command};
use crate::platform::AppDirs;

/// Converts VOPL voxel grids between VPI18 and updates JSON.
#[derive(Parser, Debug)]
#[command(name = "vopl", version, about)]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("vopl: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let dirs = AppDirs::resolve(cli.args.config.as_deref())?;
    dirs.create()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(&cli.args);
    config.validate()?;

    vopl_log::init_logging(
        Some(&dirs.log_dir),
        config.debug.log_to_file,
        Some(&config),
    );
    tracing::debug!("config dir {}", dirs.config_dir.display());

    let stdout = std::io::stdout();
    commands::run(&cli.command, &config, &mut stdout.lock())
}
