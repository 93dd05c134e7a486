use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::store::CategoryConfig;
use crate::catalog::ButtonCatalog;
use crate::persist::DEFAULT_RECORD_KEY;
use crate::state::{StoreSettings, DEFAULT_CHANNEL_CAPACITY, DEFAULT_SLOT_COUNT};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub storage: StorageConfig,
    /// Keypad category overrides; unlisted categories keep the stock buttons
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<CategoryConfig>,
}

impl Config {
    /// Load configuration from the default location or create it
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {:?}", path))?;
            let config: Config =
                toml::from_str(&contents).with_context(|| format!("parsing config {:?}", path))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config/box-grid/config.toml"))
    }

    /// Settings for the box store
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            slot_count: self.grid.slot_count,
            channel_capacity: self.grid.channel_capacity,
            record_key: self.storage.record_key.clone(),
        }
    }

    /// Keypad catalog with config overrides applied
    pub fn button_catalog(&self) -> Result<ButtonCatalog> {
        Ok(ButtonCatalog::from_config(&self.catalog)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of boxes
    pub slot_count: usize,
    /// Events buffered per subscriber
    pub channel_capacity: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding persisted records (defaults to ~/.box-grid)
    pub dir: Option<PathBuf>,
    /// Name of the box record
    pub record_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            record_key: DEFAULT_RECORD_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    /// Resolved storage directory
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let home = std::env::var("HOME")?;
                Ok(PathBuf::from(home).join(".box-grid"))
            }
        }
    }
}
