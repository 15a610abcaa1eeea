//! Bootstrap seeding of an empty mission store.

use std::path::Path;

use mission_core::error::Result;
use mission_core::import::{ImportFile, ImportSummary};

use crate::import::ImportCoordinator;

/// Imports a directory of mission files into a store that holds none yet.
pub struct MissionSeeder {
    coordinator: ImportCoordinator,
}

impl MissionSeeder {
    pub fn new(coordinator: ImportCoordinator) -> Self {
        Self { coordinator }
    }

    /// Seeds from the configured seed directory, if there is one.
    pub async fn seed_from_config(&self) -> Result<Option<ImportSummary>> {
        let importer = self.coordinator.importer();
        match importer.config().seed_directory.clone() {
            Some(dir) => self.seed_if_empty(&dir).await,
            None => {
                tracing::debug!("No seed directory configured, skipping seeding");
                Ok(None)
            }
        }
    }

    /// Imports every recognized file in `dir` when the store is empty.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(summary))`: The store was empty and the directory was imported
    /// - `Ok(None)`: The store already held missions; nothing was imported
    /// - `Err`: The store could not be listed or the directory could not be read
    pub async fn seed_if_empty(&self, dir: &Path) -> Result<Option<ImportSummary>> {
        let importer = self.coordinator.importer();
        let existing = importer.repository().list_all().await?;
        if !existing.is_empty() {
            tracing::info!(
                "Mission store already holds {} mission(s), skipping seeding",
                existing.len()
            );
            return Ok(None);
        }

        let files = self.seed_files(dir).await?;
        tracing::info!(
            "Seeding {} mission file(s) from {}",
            files.len(),
            dir.display()
        );
        Ok(Some(self.coordinator.import_all(files).await))
    }

    /// Lists files with a recognized extension, in name order.
    async fn seed_files(&self, dir: &Path) -> Result<Vec<ImportFile>> {
        let config = self.coordinator.importer().config();
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let recognized = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| config.era_of(name).is_some());
            if recognized && entry.file_type().await?.is_file() {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths.into_iter().map(ImportFile::from_path).collect())
    }
}
