//! Configuration service implementation.
//!
//! Loads the import configuration from `config.toml`
//! (`~/.config/missions/config.toml` unless a path is given).

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use mission_core::MissionError;
use mission_core::config::ImportConfig;
use mission_core::error::Result;

use crate::paths::MissionPaths;
use crate::storage::write_atomic_sync;

/// Configuration service that loads and caches the import configuration.
///
/// A missing or empty file yields the defaults; a malformed file is an error.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<ImportConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the given file.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading the default config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the user config directory cannot be determined.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(MissionPaths::config_file()?))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<ImportConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Writes the configuration atomically and refreshes the cache.
    pub fn save_config(&self, config: &ImportConfig) -> Result<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| MissionError::config(format!("Failed to serialize config: {}", e)))?;
        write_atomic_sync(&self.config_path, toml_string.as_bytes())?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn load_config(&self) -> Result<ImportConfig> {
        if !self.config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                self.config_path.display()
            );
            return Ok(ImportConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        if content.trim().is_empty() {
            return Ok(ImportConfig::default());
        }

        let config: ImportConfig = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", self.config_path.display());
        Ok(config)
    }
}
