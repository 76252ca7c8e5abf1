//! Configuration structs with defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vopl_voxel::{DEFAULT_SIZE, GridExtents};

use crate::error::ConfigError;

const FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Grid dimensions shared by every codec.
    pub grid: GridConfig,
    /// Export settings.
    pub export: ExportConfig,
    /// Example catalog settings.
    pub catalog: CatalogConfig,
    /// Logging settings.
    pub debug: DebugConfig,
}

/// Grid dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Cells along X.
    pub width: u32,
    /// Cells along Y.
    pub height: u32,
    /// Cells along Z.
    pub depth: u32,
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Chunk id written into updates documents.
    pub chunk_id: String,
    /// Indent updates JSON output.
    pub pretty: bool,
}

/// Example catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to `examples.json`, relative to the working directory.
    pub path: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,vopl_voxel=trace").
    pub log_level: String,
    /// Also write JSON logs to the log directory.
    pub log_to_file: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            depth: DEFAULT_SIZE,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            chunk_id: "0".to_string(),
            pretty: true,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "examples.json".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl GridConfig {
    /// Extents described by this section.
    pub fn extents(&self) -> GridExtents {
        GridExtents::new(self.width, self.height, self.depth)
    }
}

// --- Validation / Load / Save / Reload ---

impl Config {
    /// Checks values that serde cannot.
    ///
    /// Grids larger than 4096 cells are accepted, but VPI18 export can only
    /// address the first 4096 of them. Grids whose cells cannot all be given a
    /// `u32` index are rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridConfig {
            width,
            height,
            depth,
        } = self.grid;
        if width == 0 || height == 0 || depth == 0 {
            return Err(ConfigError::EmptyGrid {
                width,
                height,
                depth,
            });
        }
        if !self.grid.extents().fits_u32_index() {
            return Err(ConfigError::GridTooLarge {
                width,
                height,
                depth,
            });
        }
        if self.grid.extents().volume() > 4096 {
            tracing::warn!(
                "grid {width}x{height}x{depth} exceeds the 4096 cells VPI18 can address"
            );
        }
        Ok(())
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
            tracing::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            tracing::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Re-reads the file; returns `Some(new_config)` only if it changed.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(FILE_NAME))?;
        new_config.validate()?;

        if &new_config != self {
            tracing::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ron::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(2))
                .unwrap();
        assert!(ron_str.contains("width: 16"));
        assert!(ron_str.contains("chunk_id: \"0\""));
    }

    #[test]
    fn test_default_extents() {
        assert_eq!(Config::default().grid.extents(), GridExtents::default());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(grid: (width: 4))").unwrap();
        assert_eq!(config.grid.extents(), GridExtents::new(4, 16, 16));
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut config = Config::default();
        config.grid.depth = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyGrid { depth: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let mut config = Config::default();
        config.grid.width = 70_000;
        config.grid.height = 70_000;
        config.grid.depth = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooLarge { width: 70_000, .. })
        ));

        config.grid.width = 64;
        config.grid.height = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(FILE_NAME).exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.grid.width = 8;
        config.export.chunk_id = "scene-1".to_string();
        config.debug.log_to_file = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.catalog.path = "other.json".to_string();
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().catalog.path, "other.json");
    }

    #[test]
    fn test_reload_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::default().reload(dir.path()),
            Err(ConfigError::Read { .. })
        ));
    }
}
