//! Errors raised while loading, validating, or writing `config.ron`.

use std::path::PathBuf;

/// Configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`Config`](crate::Config).
    #[error("malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The config could not be rendered as RON.
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// A grid dimension is zero.
    #[error("grid dimensions must be non-zero, got {width}x{height}x{depth}")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
        /// Configured depth.
        depth: u32,
    },

    /// The grid has more cells than a `u32` index can address.
    #[error("grid {width}x{height}x{depth} has more cells than a u32 index can address")]
    GridTooLarge {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
        /// Configured depth.
        depth: u32,
    },
}
