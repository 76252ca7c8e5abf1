//! Directory resolution for the `vopl` binary.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors resolving or creating application directories.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// A directory could not be created.
    #[error("cannot create {}: {source}", path.display())]
    Io {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Where `vopl` keeps its config and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds `vopl.log` when file logging is on.
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "vopl";

impl AppDirs {
    /// Resolves directories, using `config_override` in place of the OS
    /// config location when given.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if there is no override and the
    /// OS does not expose a configuration directory.
    pub fn resolve(config_override: Option<&Path>) -> Result<Self, PlatformError> {
        let root = match config_override {
            Some(path) => path.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(PlatformError::NoConfigDir)?
                .join(APP_NAME),
        };
        Ok(Self::with_root(&root))
    }

    /// Directories rooted under `root`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
        }
    }

    /// Creates the config directory on disk. The log directory is created
    /// lazily by the logger.
    pub fn create(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir).map_err(|source| PlatformError::Io {
            path: self.config_dir.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dirs = AppDirs::resolve(Some(Path::new("/tmp/vopl-test"))).unwrap();
        assert_eq!(dirs.config_dir, PathBuf::from("/tmp/vopl-test"));
        assert_eq!(dirs.log_dir, PathBuf::from("/tmp/vopl-test/logs"));
    }

    #[test]
    fn test_create_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let dirs = AppDirs::with_root(&temp.path().join("nested"));
        dirs.create().unwrap();
        assert!(dirs.config_dir.is_dir());
    }
}
