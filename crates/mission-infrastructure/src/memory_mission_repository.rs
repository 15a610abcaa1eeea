//! In-memory MissionRepository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use mission_core::MissionError;
use mission_core::error::Result;
use mission_core::mission::{MissionRepository, StoredMission};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::admission::admit;

/// Mission store held in process memory.
///
/// Used when no store directory is configured, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryMissionRepository {
    missions: RwLock<HashMap<String, StoredMission>>,
}

impl InMemoryMissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MissionRepository for InMemoryMissionRepository {
    async fn create(&self, document: Value) -> Result<StoredMission> {
        let mission = admit(document)?;
        let now = Utc::now();
        let stored = StoredMission {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            mission,
        };

        self.missions
            .write()
            .await
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, mission_id: &str, document: Value) -> Result<StoredMission> {
        let mut missions = self.missions.write().await;
        let existing = missions
            .get(mission_id)
            .ok_or_else(|| MissionError::not_found("mission", mission_id))?;

        let stored = StoredMission {
            id: existing.id.clone(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
            mission: admit(document)?,
        };
        missions.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, mission_id: &str) -> Result<Option<StoredMission>> {
        Ok(self.missions.read().await.get(mission_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<StoredMission>> {
        let mut missions: Vec<StoredMission> =
            self.missions.read().await.values().cloned().collect();
        missions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(missions)
    }
}
