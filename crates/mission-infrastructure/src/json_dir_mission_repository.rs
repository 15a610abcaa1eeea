//! Directory-backed MissionRepository implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use mission_core::MissionError;
use mission_core::error::Result;
use mission_core::mission::{MissionRepository, StoredMission};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::admission::admit;
use crate::paths::MissionPaths;
use crate::storage::write_atomic;

/// Mission store with one JSON file per mission.
///
/// Directory structure:
/// ```text
/// base_dir/
/// ├── 550e8400-e29b-41d4-a716-446655440000.json
/// └── 6ba7b810-9dad-11d1-80b4-00c04fd430c8.json
/// ```
///
/// Writes go through a temporary file and a rename, and are serialized so an
/// update never interleaves with another write to the same file.
#[derive(Debug)]
pub struct JsonDirMissionRepository {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirMissionRepository {
    /// Opens (creating if needed) a store rooted at `base_dir`.
    pub async fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        tokio::fs::create_dir_all(&base_dir).await.map_err(|e| {
            MissionError::io(format!(
                "Failed to create mission store {}: {}",
                base_dir.display(),
                e
            ))
        })?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Opens the store at the default data location.
    pub async fn default_location() -> Result<Self> {
        Self::new(MissionPaths::store_dir()?).await
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves the file for an id, refusing ids that could escape the store.
    fn file_for(&self, mission_id: &str) -> Option<PathBuf> {
        let safe = !mission_id.is_empty()
            && mission_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.base_dir.join(format!("{}.json", mission_id)))
    }

    async fn read(&self, path: &Path) -> Result<Option<StoredMission>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored = serde_json::from_str(&content).map_err(|e| {
            MissionError::internal(format!("Corrupted mission file {}: {}", path.display(), e))
        })?;
        Ok(Some(stored))
    }

    async fn write(&self, stored: &StoredMission) -> Result<()> {
        let path = self
            .file_for(&stored.id)
            .ok_or_else(|| MissionError::internal(format!("Unsafe mission id '{}'", stored.id)))?;
        let json = serde_json::to_vec_pretty(stored)
            .map_err(|e| MissionError::internal(format!("Failed to serialize mission: {}", e)))?;
        write_atomic(&path, &json).await.map_err(|e| {
            MissionError::io(format!("Failed to save mission {}: {}", stored.id, e))
        })
    }
}

#[async_trait]
impl MissionRepository for JsonDirMissionRepository {
    async fn create(&self, document: Value) -> Result<StoredMission> {
        let mission = admit(document)?;
        let now = Utc::now();
        let stored = StoredMission {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            mission,
        };

        let _guard = self.write_lock.lock().await;
        self.write(&stored).await?;
        tracing::debug!("Stored mission {} ({})", stored.id, stored.display_name());
        Ok(stored)
    }

    async fn update(&self, mission_id: &str, document: Value) -> Result<StoredMission> {
        let mission = admit(document)?;

        let _guard = self.write_lock.lock().await;
        let existing = match self.file_for(mission_id) {
            Some(path) => self.read(&path).await?,
            None => None,
        }
        .ok_or_else(|| MissionError::not_found("mission", mission_id))?;

        let stored = StoredMission {
            id: existing.id,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            mission,
        };
        self.write(&stored).await?;
        Ok(stored)
    }

    async fn find_by_id(&self, mission_id: &str) -> Result<Option<StoredMission>> {
        match self.file_for(mission_id) {
            Some(path) => self.read(&path).await,
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<StoredMission>> {
        let mut entries = tokio::fs::read_dir(&self.base_dir).await?;
        let mut missions = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_mission_file = path.extension().is_some_and(|ext| ext == "json")
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_mission_file {
                continue;
            }

            match self.read(&path).await {
                Ok(Some(stored)) => missions.push(stored),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unreadable mission file: {}", e),
            }
        }

        missions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(missions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_repository() -> (JsonDirMissionRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonDirMissionRepository::new(temp_dir.path()).await.unwrap();
        (repo, temp_dir)
    }

    fn document(name: &str) -> Value {
        json!({
            "name": name,
            "versionNumber": 3,
            "resourceLabel": "Credits",
            "structure": { "k1": { "k2": {} } },
            "prototypes": [
                { "_id": "p1", "structureKey": "k1", "depthPadding": 0 },
                { "_id": "p2", "structureKey": "k2", "depthPadding": 20 }
            ],
            "forces": [ {
                "_id": "f1",
                "name": "Red Team",
                "color": "#f9484f",
                "initialResources": 75.5,
                "revealAllNodes": true,
                "nodes": [
                    {
                        "_id": "n1",
                        "prototypeId": "p1",
                        "name": "Gateway",
                        "color": "#ffffff",
                        "description": "",
                        "preExecutionText": "",
                        "executable": false,
                        "device": false,
                        "actions": []
                    },
                    {
                        "_id": "n2",
                        "prototypeId": "p2",
                        "name": "Server",
                        "color": "#65eb59",
                        "description": "<p>Target</p>",
                        "preExecutionText": "",
                        "executable": true,
                        "device": true,
                        "actions": [ {
                            "_id": "a1",
                            "name": "Exploit",
                            "description": "",
                            "processTime": 2000,
                            "successChance": 0.75,
                            "resourceCost": 10.0,
                            "postExecutionSuccessText": "<p>In.</p>",
                            "postExecutionFailureText": "<p>Out.</p>",
                            "effects": [ {
                                "_id": "e1",
                                "name": "Notify",
                                "description": "",
                                "targetId": "output-panel",
                                "args": { "message": "breached" }
                            } ]
                        } ]
                    }
                ]
            } ]
        })
    }

    #[tokio::test]
    async fn test_create_writes_one_file() {
        let (repo, temp_dir) = create_test_repository().await;
        let stored = repo.create(document("Alpha")).await.unwrap();

        let path = temp_dir.path().join(format!("{}.json", stored.id));
        assert!(path.exists());

        let found = repo.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.mission.node_count(), 2);
    }

    #[tokio::test]
    async fn test_missions_survive_reopen() {
        let (repo, temp_dir) = create_test_repository().await;
        let stored = repo.create(document("Persistent")).await.unwrap();
        drop(repo);

        let reopened = JsonDirMissionRepository::new(temp_dir.path()).await.unwrap();
        let all = reopened.list_all().await.unwrap();
        assert_eq!(all, vec![stored]);
    }

    #[tokio::test]
    async fn test_schema_violation_writes_nothing() {
        let (repo, temp_dir) = create_test_repository().await;
        let mut document = document("Alpha");
        document["forces"][0]["nodes"][1]["actions"][0]["externalTarget"] = json!("x");

        let err = repo.create(document).await.unwrap_err();
        assert!(err.is_schema_violation());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_file() {
        let (repo, _temp_dir) = create_test_repository().await;
        let stored = repo.create(document("Alpha")).await.unwrap();

        let updated = repo.update(&stored.id, document("Beta")).await.unwrap();
        assert_eq!(updated.created_at, stored.created_at);

        let found = repo.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(found.display_name(), "Beta");
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (repo, _temp_dir) = create_test_repository().await;
        let err = repo.update("does-not-exist", document("Alpha")).await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo.update("../escape", document("Alpha")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_skips_foreign_and_corrupt_files() {
        let (repo, temp_dir) = create_test_repository().await;
        repo.create(document("Alpha")).await.unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(temp_dir.path().join("broken.json"), "{").unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].display_name(), "Alpha");
    }
}
