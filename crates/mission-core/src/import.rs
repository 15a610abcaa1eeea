//! Import inputs, per-file outcomes and the per-batch result accumulator.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::MissionError;

/// Where an uploaded file's contents live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Contents must be read from disk.
    Path(PathBuf),
    /// Contents were already extracted by the caller.
    Bytes(Vec<u8>),
}

/// One file handed to the importer.
#[derive(Debug, Clone)]
pub struct ImportFile {
    /// Original file name, used for the extension check and in failure reports.
    pub name: String,
    pub source: FileSource,
}

impl ImportFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes.into()),
        }
    }
}

/// Terminal state of one file's pipeline.
#[derive(Debug, Clone)]
pub enum ImportOutcome {
    Succeeded {
        file_name: String,
        mission_id: String,
        mission_name: String,
    },
    Failed {
        file_name: String,
        error: MissionError,
    },
}

impl ImportOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Succeeded { file_name, .. } | Self::Failed { file_name, .. } => file_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// A failed file and the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedImport {
    pub file_name: String,
    pub error_message: String,
}

/// Final accounting for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub successful_import_count: usize,
    pub failed_import_count: usize,
    /// Not ordered by input: files settle concurrently.
    pub failed_import_error_messages: Vec<FailedImport>,
}

/// Replaces backticks so messages render safely in markdown-aware clients.
pub fn sanitize_message(message: &str) -> String {
    message.replace('`', "'")
}

/// Shared accumulator for a batch whose files settle concurrently.
///
/// Counters are atomic and the failure list is append-only behind a lock.
/// The summary may only be read once every expected file has been recorded.
#[derive(Debug)]
pub struct ImportResult {
    expected: usize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    failures: Mutex<Vec<FailedImport>>,
}

impl ImportResult {
    /// Creates an accumulator for a batch of `expected` files.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a failure; the message is sanitized here.
    pub fn record_failure(&self, file_name: impl Into<String>, error_message: &str) {
        let failure = FailedImport {
            file_name: file_name.into(),
            error_message: sanitize_message(error_message),
        };
        // Push before counting so a settled batch always has its full list.
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure);
        self.failed.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a terminal outcome.
    pub fn record(&self, outcome: &ImportOutcome) {
        match outcome {
            ImportOutcome::Succeeded { .. } => self.record_success(),
            ImportOutcome::Failed { file_name, error } => {
                self.record_failure(file_name.clone(), &error.to_string())
            }
        }
    }

    /// Number of files that reached a terminal state.
    pub fn settled(&self) -> usize {
        self.succeeded.load(Ordering::Acquire) + self.failed.load(Ordering::Acquire)
    }

    pub fn is_settled(&self) -> bool {
        self.settled() >= self.expected
    }

    /// Returns the batch summary.
    ///
    /// # Panics
    ///
    /// Panics if called before every expected file has been recorded. Reading
    /// a partial result is a programming error, not a recoverable condition.
    pub fn summary(&self) -> ImportSummary {
        let settled = self.settled();
        assert!(
            settled >= self.expected,
            "Import result read before all files settled ({} of {} settled)",
            settled,
            self.expected
        );

        ImportSummary {
            successful_import_count: self.succeeded.load(Ordering::Acquire),
            failed_import_count: self.failed.load(Ordering::Acquire),
            failed_import_error_messages: self
                .failures
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_path() {
        let file = ImportFile::from_path("/tmp/uploads/mission.metis");
        assert_eq!(file.name, "mission.metis");
        assert!(matches!(file.source, FileSource::Path(_)));
    }

    #[test]
    fn test_sanitize_replaces_backticks() {
        assert_eq!(
            sanitize_message("unknown field `extra`, expected `name`"),
            "unknown field 'extra', expected 'name'"
        );
    }

    #[test]
    fn test_summary_after_all_settled() {
        let result = ImportResult::new(3);
        result.record_success();
        result.record_failure("a.cesar", "bad `thing`");
        result.record(&ImportOutcome::Failed {
            file_name: "b.metis".to_string(),
            error: MissionError::MissingGeneration,
        });
        assert!(result.is_settled());

        let summary = result.summary();
        assert_eq!(summary.successful_import_count, 1);
        assert_eq!(summary.failed_import_count, 2);
        assert_eq!(summary.failed_import_error_messages.len(), 2);
        assert_eq!(summary.failed_import_error_messages[0].error_message, "bad 'thing'");
    }

    #[test]
    #[should_panic(expected = "before all files settled")]
    fn test_summary_before_settled_panics() {
        let result = ImportResult::new(2);
        result.record_success();
        let _ = result.summary();
    }

    #[test]
    fn test_empty_batch_is_settled() {
        let result = ImportResult::new(0);
        assert_eq!(result.summary(), ImportSummary::default());
    }

    #[test]
    fn test_summary_serializes_with_wire_names() {
        let result = ImportResult::new(1);
        result.record_failure("x.cesar", "nope");
        let json = serde_json::to_value(result.summary()).unwrap();
        assert_eq!(json["successfulImportCount"], 0);
        assert_eq!(json["failedImportCount"], 1);
        assert_eq!(json["failedImportErrorMessages"][0]["fileName"], "x.cesar");
        assert_eq!(json["failedImportErrorMessages"][0]["errorMessage"], "nope");
    }
}
