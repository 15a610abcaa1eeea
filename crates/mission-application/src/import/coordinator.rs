//! Batch fan-out and result aggregation.

use std::sync::Arc;

use futures::future::join_all;
use mission_core::import::{ImportFile, ImportOutcome, ImportResult, ImportSummary};

use super::pipeline::MissionImporter;

/// Imports a batch of files concurrently and aggregates one summary.
///
/// All pipelines of a batch are polled together on the caller's task; the
/// batch itself never fails, whatever happens to individual files.
#[derive(Clone)]
pub struct ImportCoordinator {
    importer: Arc<MissionImporter>,
}

impl ImportCoordinator {
    pub fn new(importer: Arc<MissionImporter>) -> Self {
        Self { importer }
    }

    pub fn importer(&self) -> &Arc<MissionImporter> {
        &self.importer
    }

    /// Imports every file and returns the batch summary.
    ///
    /// Failures appear in settlement order, not input order.
    pub async fn import_all(&self, files: Vec<ImportFile>) -> ImportSummary {
        let result = ImportResult::new(files.len());
        tracing::info!("Importing {} mission file(s)", files.len());

        let pipelines = files.iter().map(|file| {
            let result = &result;
            async move {
                let outcome = self.importer.import_one(file).await;
                log_outcome(&outcome);
                result.record(&outcome);
            }
        });
        join_all(pipelines).await;

        let summary = result.summary();
        tracing::info!(
            "Import finished: {} succeeded, {} failed",
            summary.successful_import_count,
            summary.failed_import_count
        );
        summary
    }

    /// Imports a single file through the same accounting as a batch.
    pub async fn import_file(&self, file: ImportFile) -> ImportSummary {
        self.import_all(vec![file]).await
    }
}

fn log_outcome(outcome: &ImportOutcome) {
    match outcome {
        ImportOutcome::Succeeded {
            file_name,
            mission_id,
            mission_name,
        } => tracing::info!(
            "Imported \"{}\" from {} as {}",
            mission_name,
            file_name,
            mission_id
        ),
        ImportOutcome::Failed { file_name, error } => {
            tracing::warn!("Failed to import {}: {}", file_name, error)
        }
    }
}
