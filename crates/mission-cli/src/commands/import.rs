use std::path::{Path, PathBuf};

use anyhow::Result;
use mission_core::config::ImportConfig;
use mission_core::import::ImportFile;

use super::context;

/// Imports the files and prints the batch summary as JSON.
///
/// Returns false when any file failed.
pub async fn run(config: ImportConfig, files: Vec<PathBuf>, store: Option<&Path>) -> Result<bool> {
    let importer = context::persistent_importer(config, store).await?;
    let files = files.into_iter().map(ImportFile::from_path).collect();

    let summary = context::coordinator(importer).import_all(files).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(summary.failed_import_count == 0)
}
