use std::path::Path;

use anyhow::Result;
use mission_core::config::ImportConfig;

use super::context;

/// Prints the file migrated to the latest generation, without storing it.
pub async fn run(config: ImportConfig, file: &Path) -> Result<bool> {
    let (name, text) = context::read_named(file).await?;
    let importer = context::dry_run_importer(config);

    match importer.migrate_only(&name, &text) {
        Ok(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}: {}", name, e);
            Ok(false)
        }
    }
}
