//! Wiring shared by the subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use mission_application::{ImportCoordinator, MissionImporter};
use mission_core::config::ImportConfig;
use mission_core::id::UuidIdGenerator;
use mission_core::mission::MissionRepository;
use mission_infrastructure::paths::MissionPaths;
use mission_infrastructure::{ConfigService, InMemoryMissionRepository, JsonDirMissionRepository};

/// Loads the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ImportConfig> {
    let service = match path {
        Some(path) => ConfigService::new(path),
        None => ConfigService::at_default_location()?,
    };
    service
        .get_config()
        .with_context(|| format!("Failed to load {}", service.config_path().display()))
}

/// Picks the store directory: flag, then config, then the user data directory.
pub fn store_dir(config: &ImportConfig, flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag.or(config.store_directory.as_deref()) {
        return Ok(dir.to_path_buf());
    }
    Ok(MissionPaths::store_dir()?)
}

/// An importer backed by the directory store.
pub async fn persistent_importer(
    config: ImportConfig,
    store: Option<&Path>,
) -> Result<Arc<MissionImporter>> {
    let dir = store_dir(&config, store)?;
    let repository = JsonDirMissionRepository::new(&dir)
        .await
        .with_context(|| format!("Failed to open mission store {}", dir.display()))?;
    tracing::debug!("Using mission store {}", dir.display());
    Ok(importer(config, Arc::new(repository)))
}

/// An importer that never persists, for dry runs.
pub fn dry_run_importer(config: ImportConfig) -> Arc<MissionImporter> {
    importer(config, Arc::new(InMemoryMissionRepository::new()))
}

pub fn coordinator(importer: Arc<MissionImporter>) -> ImportCoordinator {
    ImportCoordinator::new(importer)
}

fn importer(config: ImportConfig, repository: Arc<dyn MissionRepository>) -> Arc<MissionImporter> {
    Arc::new(MissionImporter::new(
        repository,
        Arc::new(UuidIdGenerator),
        config,
    ))
}

/// Reads a file for the dry-run commands, returning its name and text.
pub async fn read_named(file: &Path) -> Result<(String, String)> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    Ok((name, text))
}
