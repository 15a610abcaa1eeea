//! Default locations for mission configuration and storage.
//!
//! ```text
//! ~/.config/missions/          # Config directory
//! └── config.toml              # Import configuration
//!
//! ~/.local/share/missions/     # Data directory
//! └── store/                   # JSON mission store
//!     ├── <mission-id>.json
//!     └── ...
//! ```

use std::path::PathBuf;

use mission_core::MissionError;
use mission_core::error::Result;

const APP_DIR: &str = "missions";

/// Platform-appropriate paths, resolved through `dirs`.
pub struct MissionPaths;

impl MissionPaths {
    /// Returns the mission configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| MissionError::config("Cannot find the user config directory"))
    }

    /// Returns the path of `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory of the JSON mission store.
    pub fn store_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join("store"))
            .ok_or_else(|| MissionError::config("Cannot find the user data directory"))
    }
}
