use std::path::Path;

use anyhow::{Context, Result};
use mission_application::MissionSeeder;
use mission_core::config::ImportConfig;

use super::context;

/// Seeds an empty store and prints the summary; a non-empty store is left alone.
pub async fn run(config: ImportConfig, dir: Option<&Path>, store: Option<&Path>) -> Result<bool> {
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| config.seed_directory.clone())
        .context("No seed directory given (use --dir or set seed_directory in config.toml)")?;

    let importer = context::persistent_importer(config, store).await?;
    let seeder = MissionSeeder::new(context::coordinator(importer));

    match seeder.seed_if_empty(&dir).await? {
        Some(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(summary.failed_import_count == 0)
        }
        None => {
            println!("Mission store is not empty, nothing seeded");
            Ok(true)
        }
    }
}
