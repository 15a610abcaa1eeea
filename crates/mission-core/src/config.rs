//! Import configuration model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Generation from which exports use the current extension.
pub const DEFAULT_CUTOVER_GENERATION: u32 = 10;

/// Extension used by exports older than the cutover generation.
pub const DEFAULT_LEGACY_EXTENSION: &str = "cesar";

/// Extension used by exports at or after the cutover generation.
pub const DEFAULT_CURRENT_EXTENSION: &str = "metis";

/// Which era a file extension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEra {
    Legacy,
    Current,
}

/// Settings for the import pipeline and bootstrap seeding.
///
/// Stored as TOML:
///
/// ```toml
/// legacy_extension = "cesar"
/// current_extension = "metis"
/// extension_cutover_generation = 10
/// seed_directory = "/srv/missions/seeds"
/// store_directory = "/srv/missions/store"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Extension (without the dot) of pre-cutover exports.
    pub legacy_extension: String,
    /// Extension (without the dot) of post-cutover exports.
    pub current_extension: String,
    /// First generation that must carry the current extension.
    pub extension_cutover_generation: u32,
    /// Directory whose missions are imported into an empty store at bootstrap.
    pub seed_directory: Option<PathBuf>,
    /// Directory backing the JSON mission store; the user data directory when absent.
    pub store_directory: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            legacy_extension: DEFAULT_LEGACY_EXTENSION.to_string(),
            current_extension: DEFAULT_CURRENT_EXTENSION.to_string(),
            extension_cutover_generation: DEFAULT_CUTOVER_GENERATION,
            seed_directory: None,
            store_directory: None,
        }
    }
}

impl ImportConfig {
    /// Classifies a file name by its final extension, ignoring case.
    pub fn era_of(&self, file_name: &str) -> Option<FileEra> {
        let (_, extension) = file_name.rsplit_once('.')?;
        if extension.eq_ignore_ascii_case(&self.legacy_extension) {
            Some(FileEra::Legacy)
        } else if extension.eq_ignore_ascii_case(&self.current_extension) {
            Some(FileEra::Current)
        } else {
            None
        }
    }

    /// The era a document of the given generation must be exported in.
    pub fn era_for_generation(&self, generation: u32) -> FileEra {
        if generation < self.extension_cutover_generation {
            FileEra::Legacy
        } else {
            FileEra::Current
        }
    }

    /// The extension string for an era.
    pub fn extension_for(&self, era: FileEra) -> &str {
        match era {
            FileEra::Legacy => &self.legacy_extension,
            FileEra::Current => &self.current_extension,
        }
    }
}
