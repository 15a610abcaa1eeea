//! The per-file import pipeline.
//!
//! ```text
//! reading → parsing → validating-envelope → migrating → persisting → {succeeded | failed}
//! ```
//!
//! Every stage returns `Result`; [`MissionImporter::import_one`] folds the
//! first error into a failed [`ImportOutcome`], so nothing escapes a file's
//! pipeline.

use std::sync::Arc;

use mission_core::MissionError;
use mission_core::config::ImportConfig;
use mission_core::error::Result;
use mission_core::id::IdGenerator;
use mission_core::import::{FileSource, ImportFile, ImportOutcome};
use mission_core::mission::{MissionRepository, StoredMission, StructuralValidator};
use mission_infrastructure::migration::{
    MigrationChain, MigrationRegistry, build_migration_registry, read_generation,
    strip_generation,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// How the strict decoder names a property it does not know.
static UNKNOWN_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new("unknown field `([^`]+)`").expect("unknown field pattern is valid"));

/// Runs single files through migration and into the repository.
#[derive(Clone)]
pub struct MissionImporter {
    config: ImportConfig,
    registry: Arc<MigrationRegistry>,
    validator: StructuralValidator,
    repository: Arc<dyn MissionRepository>,
}

impl MissionImporter {
    /// Creates an importer with the full generation chain.
    ///
    /// # Arguments
    ///
    /// * `repository` - Persistence collaborator receiving migrated documents
    /// * `ids` - Identifier source for the steps that mint ids
    /// * `config` - Extension and cutover settings
    pub fn new(
        repository: Arc<dyn MissionRepository>,
        ids: Arc<dyn IdGenerator>,
        config: ImportConfig,
    ) -> Self {
        Self::with_registry(repository, Arc::new(build_migration_registry(ids)), config)
    }

    /// Creates an importer around an existing registry.
    pub fn with_registry(
        repository: Arc<dyn MissionRepository>,
        registry: Arc<MigrationRegistry>,
        config: ImportConfig,
    ) -> Self {
        Self {
            config,
            registry,
            validator: StructuralValidator::new(),
            repository,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<dyn MissionRepository> {
        &self.repository
    }

    /// Imports one file. Never fails: errors become a failed outcome.
    pub async fn import_one(&self, file: &ImportFile) -> ImportOutcome {
        match self.run(file).await {
            Ok(stored) => ImportOutcome::Succeeded {
                file_name: file.name.clone(),
                mission_id: stored.id,
                mission_name: stored.mission.name,
            },
            Err(error) => ImportOutcome::Failed {
                file_name: file.name.clone(),
                error,
            },
        }
    }

    /// Runs every stage except persistence and returns the migrated document.
    ///
    /// The returned document no longer carries the generation marker.
    pub fn migrate_only(&self, file_name: &str, text: &str) -> Result<Value> {
        let mut document = parse_document(text)?;
        self.check_envelope(file_name, &document)?;

        self.registry.migrate_to_latest(&mut document)?;
        self.validator.validate(&document)?;

        strip_generation(&mut document);
        Ok(document)
    }

    async fn run(&self, file: &ImportFile) -> Result<StoredMission> {
        let text = read_text(&file.source).await?;
        let document = self.migrate_only(&file.name, &text)?;
        self.repository
            .create(document)
            .await
            .map_err(explain_rejection)
    }

    /// Checks the generation marker against the file extension.
    fn check_envelope(&self, file_name: &str, document: &Value) -> Result<()> {
        let generation = read_generation(document)?;

        let era = self
            .config
            .era_of(file_name)
            .ok_or_else(|| MissionError::UnrecognizedExtension {
                file_name: file_name.to_string(),
                legacy: self.config.legacy_extension.clone(),
                current: self.config.current_extension.clone(),
            })?;

        let expected = self.config.era_for_generation(generation);
        if era != expected {
            return Err(MissionError::ExtensionMismatch {
                found: self.config.extension_for(era).to_string(),
                expected: self.config.extension_for(expected).to_string(),
                generation,
            });
        }

        self.registry.check_supported(generation)
    }
}

/// Loads a file's contents as text.
async fn read_text(source: &FileSource) -> Result<String> {
    let bytes = match source {
        FileSource::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|e| MissionError::unreadable(e.to_string()))?,
        FileSource::Bytes(bytes) => bytes.clone(),
    };

    let text = String::from_utf8(bytes)
        .map_err(|e| MissionError::unreadable(format!("not UTF-8 text ({})", e)))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Parses document text, reporting the character offset of a syntax error.
pub fn parse_document(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| MissionError::Parse {
        offset: char_offset(text, e.line(), e.column()),
        message: e.to_string(),
    })
}

/// Converts the parser's one-based line and column into a zero-based char offset.
fn char_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let line_start: usize = text
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let byte_offset = (line_start + column.saturating_sub(1)).min(text.len());

    Some(
        text.char_indices()
            .take_while(|(index, _)| *index < byte_offset)
            .count(),
    )
}

/// Rewrites an unknown-property rejection into an actionable message.
fn explain_rejection(error: MissionError) -> MissionError {
    let unknown = match &error {
        MissionError::SchemaViolation(message) => UNKNOWN_FIELD
            .captures(message)
            .map(|captures| captures[1].to_string()),
        _ => None,
    };

    match unknown {
        Some(name) => MissionError::UnrecognizedProperty { name },
        None => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::id::SequentialIdGenerator;
    use mission_infrastructure::InMemoryMissionRepository;
    use serde_json::json;

    fn importer() -> (MissionImporter, Arc<InMemoryMissionRepository>) {
        let repository = Arc::new(InMemoryMissionRepository::new());
        let importer = MissionImporter::new(
            repository.clone(),
            Arc::new(SequentialIdGenerator::new("gen")),
            ImportConfig::default(),
        );
        (importer, repository)
    }

    fn current_document(generation: u32) -> Value {
        json!({
            "schemaBuildNumber": generation,
            "name": "Current",
            "versionNumber": 2,
            "resourceLabel": "Credits",
            "structure": { "k1": {} },
            "prototypes": [ { "_id": "p1", "structureKey": "k1", "depthPadding": 0 } ],
            "forces": [ {
                "_id": "f1",
                "name": "Blue",
                "color": "#52b1ff",
                "initialResources": 100.0,
                "revealAllNodes": false,
                "nodes": [ {
                    "_id": "n1",
                    "prototypeId": "p1",
                    "name": "Node",
                    "color": "#ffffff",
                    "description": "",
                    "preExecutionText": "",
                    "executable": false,
                    "device": false,
                    "actions": []
                } ]
            } ]
        })
    }

    #[test]
    fn test_char_offset() {
        assert_eq!(char_offset("{\"a\": x}", 1, 7), Some(6));
        assert_eq!(char_offset("{\n  \"a\": x\n}", 2, 8), Some(9));
        assert_eq!(char_offset("{\"é\": x}", 1, 8), Some(6));
        assert_eq!(char_offset("", 0, 0), None);
    }

    #[test]
    fn test_parse_error_carries_offset() {
        // The parser stops at the closing brace where a value was expected.
        let err = parse_document("{\"name\": }").unwrap_err();
        match &err {
            MissionError::Parse { offset, .. } => assert_eq!(*offset, Some(9)),
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().contains("syntax error at position 9"));

        let err = parse_document("{\n  \"é\": }").unwrap_err();
        assert!(matches!(err, MissionError::Parse { offset: Some(9), .. }));
    }

    #[test]
    fn test_explain_unknown_field() {
        let rejected = MissionError::schema_violation(
            "unknown field `legacyFlag`, expected one of `name`, `forces`",
        );
        let explained = explain_rejection(rejected);
        assert!(matches!(
            explained,
            MissionError::UnrecognizedProperty { ref name } if name == "legacyFlag"
        ));

        let other = explain_rejection(MissionError::schema_violation("missing field `nodes`"));
        assert!(matches!(other, MissionError::SchemaViolation(_)));
    }

    #[test]
    fn test_envelope_rules() {
        let (importer, _) = importer();
        let text = |g: u32| current_document(g).to_string();

        assert!(importer.migrate_only("ok.metis", &text(17)).is_ok());
        assert!(matches!(
            importer.migrate_only("old.cesar", &text(17)),
            Err(MissionError::ExtensionMismatch { generation: 17, .. })
        ));
        assert!(matches!(
            importer.migrate_only("mission.json", &text(17)),
            Err(MissionError::UnrecognizedExtension { .. })
        ));
        assert!(matches!(
            importer.migrate_only("future.metis", &text(18)),
            Err(MissionError::UnsupportedGeneration { found: 18, latest: 17 })
        ));
        assert!(matches!(
            importer.migrate_only("bare.metis", "{\"name\": \"x\"}"),
            Err(MissionError::MissingGeneration)
        ));
    }

    #[test]
    fn test_migrate_only_strips_generation() {
        let (importer, _) = importer();
        let document = importer
            .migrate_only("ok.METIS", &current_document(17).to_string())
            .unwrap();
        assert!(document.get("schemaBuildNumber").is_none());
        assert_eq!(document["name"], "Current");
    }

    #[tokio::test]
    async fn test_import_one_persists() {
        let (importer, repository) = importer();
        let file = ImportFile::from_bytes("ok.metis", current_document(17).to_string());

        let outcome = importer.import_one(&file).await;
        match outcome {
            ImportOutcome::Succeeded {
                mission_id,
                mission_name,
                ..
            } => {
                assert_eq!(mission_name, "Current");
                assert!(repository.find_by_id(&mission_id).await.unwrap().is_some());
            }
            ImportOutcome::Failed { error, .. } => panic!("import failed: {}", error),
        }
    }

    #[tokio::test]
    async fn test_leftover_property_is_explained() {
        let (importer, repository) = importer();
        let mut document = current_document(17);
        document["legacyFlag"] = json!(true);
        let file = ImportFile::from_bytes("extra.metis", document.to_string());

        let outcome = importer.import_one(&file).await;
        match outcome {
            ImportOutcome::Failed { error, .. } => {
                assert!(error.to_string().starts_with("The property \"legacyFlag\""));
            }
            ImportOutcome::Succeeded { .. } => panic!("leftover property was accepted"),
        }
        assert!(repository.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_bytes() {
        let (importer, _) = importer();
        let file = ImportFile::from_bytes("binary.metis", vec![0xff, 0xfe, 0x00]);
        let outcome = importer.import_one(&file).await;
        assert!(matches!(
            outcome,
            ImportOutcome::Failed {
                error: MissionError::Unreadable { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_path_is_unreadable() {
        let (importer, _) = importer();
        let file = ImportFile::from_path("/definitely/not/here.metis");
        let outcome = importer.import_one(&file).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.file_name(), "here.metis");
    }
}
