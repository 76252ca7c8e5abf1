//! Subcommands of the `vopl` binary.
//!
//! Every command reads whole files, converts through an in-memory
//! [`VoxelGrid`], and writes whole files. Grids are read as updates JSON when
//! the path ends in `.json` and as a VPI18 bitstream otherwise.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};
use thiserror::Error;
use vopl_config::{Config, ConfigError};
use vopl_voxel::{
    CatalogError, ExampleCatalog, ExampleSummary, GridError, UpdatesDocument, UpdatesError,
    VoxelGrid, updates, vpi18,
};

use crate::platform::PlatformError;

/// Output encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// 18-bit packed bitstream.
    Vpi18,
    /// Sparse updates JSON.
    Updates,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Convert a VPI18 bitstream into an updates document.
    Vpi18ToUpdates {
        /// VPI18 file to read.
        input: PathBuf,
        /// Updates JSON file to write.
        output: PathBuf,
    },
    /// Convert an updates document into a VPI18 bitstream.
    UpdatesToVpi18 {
        /// Updates JSON file to read.
        input: PathBuf,
        /// VPI18 file to write.
        output: PathBuf,
    },
    /// Apply a patch (VPI18 or updates JSON) onto a base grid.
    Apply {
        /// Base grid file.
        base: PathBuf,
        /// Patch file.
        patch: PathBuf,
        /// Result file.
        output: PathBuf,
        /// Output encoding.
        #[arg(long, value_enum, default_value_t = Format::Vpi18)]
        format: Format,
    },
    /// Write the cells that became non-empty or changed color between two grids.
    Diff {
        /// Earlier grid file.
        before: PathBuf,
        /// Later grid file.
        after: PathBuf,
        /// Updates JSON file to write.
        output: PathBuf,
    },
    /// List the example catalog.
    Examples {
        /// Catalog file (defaults to the configured path).
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Render one catalog example into a grid file.
    Example {
        /// Example id.
        id: String,
        /// File to write.
        output: PathBuf,
        /// Catalog file (defaults to the configured path).
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output encoding.
        #[arg(long, value_enum, default_value_t = Format::Vpi18)]
        format: Format,
    },
}

/// Failures surfaced to the user.
#[derive(Debug, Error)]
pub enum AppError {
    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An updates document could not be parsed or written.
    #[error("{}: {source}", path.display())]
    Updates {
        /// File involved.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: UpdatesError,
    },
    /// The example catalog failed to load.
    #[error("{}: {source}", path.display())]
    Catalog {
        /// Catalog file.
        path: PathBuf,
        /// Underlying catalog error.
        #[source]
        source: CatalogError,
    },
    /// The example listing could not be rendered as JSON.
    #[error("cannot render example listing: {0}")]
    Listing(#[from] serde_json::Error),
    /// The requested example does not exist.
    #[error("no example with id '{0}'")]
    UnknownExample(String),
    /// Grid comparison failed.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Application directories could not be resolved.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Runs `command`, writing any listing to `out`.
pub fn run(command: &Command, config: &Config, out: &mut dyn Write) -> Result<(), AppError> {
    match command {
        Command::Vpi18ToUpdates { input, output } => {
            let grid = read_vpi18(input, config)?;
            write_grid(output, &grid, Format::Updates, config)
        }
        Command::UpdatesToVpi18 { input, output } => {
            let grid = read_updates(input, config)?;
            write_grid(output, &grid, Format::Vpi18, config)
        }
        Command::Apply {
            base,
            patch,
            output,
            format,
        } => {
            let mut grid = read_grid(base, config)?;
            let applied = apply_patch(patch, &mut grid)?;
            tracing::info!("applied {applied} cells from {}", patch.display());
            write_grid(output, &grid, *format, config)
        }
        Command::Diff {
            before,
            after,
            output,
        } => {
            let before = read_grid(before, config)?;
            let after = read_grid(after, config)?;
            let changes = updates::diff(&before, &after)?;
            tracing::info!("{} cells changed", changes.len());
            let document = updates::encode(changes, &config.export.chunk_id);
            write_updates(output, &document, config)
        }
        Command::Examples { catalog, json } => {
            let catalog = load_catalog(catalog.as_deref(), config)?;
            let list = catalog.list();
            let path = PathBuf::from("<stdout>");
            let write_err = |source| AppError::Write {
                path: path.clone(),
                source,
            };
            if *json {
                let text = render_listing(&list)?;
                writeln!(out, "{text}").map_err(write_err)?;
            } else {
                for summary in list {
                    writeln!(out, "{}\t{}", summary.id, summary.name).map_err(write_err)?;
                }
            }
            Ok(())
        }
        Command::Example {
            id,
            output,
            catalog,
            format,
        } => {
            let catalog = load_catalog(catalog.as_deref(), config)?;
            let example = catalog
                .get_by_id(id)
                .ok_or_else(|| AppError::UnknownExample(id.clone()))?;
            let mut grid = VoxelGrid::new(config.grid.extents());
            example.apply_to(&mut grid);
            write_grid(output, &grid, *format, config)
        }
    }
}

fn render_listing(list: &[ExampleSummary]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(list)?)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_text(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_document(path: &Path) -> Result<UpdatesDocument, AppError> {
    UpdatesDocument::from_json(&read_text(path)?).map_err(|source| AppError::Updates {
        path: path.to_path_buf(),
        source,
    })
}

fn read_vpi18(path: &Path, config: &Config) -> Result<VoxelGrid, AppError> {
    let mut grid = VoxelGrid::new(config.grid.extents());
    vpi18::apply_to_grid(&read_bytes(path)?, &mut grid);
    Ok(grid)
}

fn read_updates(path: &Path, config: &Config) -> Result<VoxelGrid, AppError> {
    let mut grid = VoxelGrid::new(config.grid.extents());
    updates::apply_to_grid(&read_document(path)?, &mut grid);
    Ok(grid)
}

/// Reads a grid, picking the codec from the file extension.
fn read_grid(path: &Path, config: &Config) -> Result<VoxelGrid, AppError> {
    if is_json(path) {
        read_updates(path, config)
    } else {
        read_vpi18(path, config)
    }
}

fn apply_patch(path: &Path, grid: &mut VoxelGrid) -> Result<usize, AppError> {
    if is_json(path) {
        Ok(updates::apply_to_grid(&read_document(path)?, grid))
    } else {
        Ok(vpi18::apply_to_grid(&read_bytes(path)?, grid))
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    std::fs::write(path, contents).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_updates(path: &Path, document: &UpdatesDocument, config: &Config) -> Result<(), AppError> {
    let text = if config.export.pretty {
        document.to_json_pretty()
    } else {
        document.to_json()
    }
    .map_err(|source| AppError::Updates {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, text.as_bytes())
}

fn write_grid(path: &Path, grid: &VoxelGrid, format: Format, config: &Config) -> Result<(), AppError> {
    tracing::debug!(
        "writing {} cells to {} as {format:?}",
        grid.count_non_empty(),
        path.display()
    );
    match format {
        Format::Vpi18 => write_file(path, &vpi18::encode_grid(grid)),
        Format::Updates => {
            let document = updates::encode_grid(grid, &config.export.chunk_id);
            write_updates(path, &document, config)
        }
    }
}

fn load_catalog(path: Option<&Path>, config: &Config) -> Result<ExampleCatalog, AppError> {
    let path = path.map_or_else(|| PathBuf::from(&config.catalog.path), Path::to_path_buf);
    let source = read_text(&path)?;
    ExampleCatalog::load(&source, config.grid.extents())
        .map_err(|source| AppError::Catalog { path, source })
}
