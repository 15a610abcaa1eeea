use std::path::Path;

use anyhow::Result;
use mission_core::config::ImportConfig;
use mission_core::mission::Mission;

use super::context;

/// Checks that the file migrates, validates, and decodes into the stored schema.
pub async fn run(config: ImportConfig, file: &Path) -> Result<bool> {
    let (name, text) = context::read_named(file).await?;
    let importer = context::dry_run_importer(config);

    let checked = importer
        .migrate_only(&name, &text)
        .and_then(Mission::from_document);

    match checked {
        Ok(mission) => {
            println!(
                "{}: valid mission \"{}\" ({} forces, {} nodes, {} prototypes)",
                name,
                mission.name,
                mission.forces.len(),
                mission.node_count(),
                mission.prototypes.len()
            );
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}: {}", name, e);
            Ok(false)
        }
    }
}
