//! Mission repository trait.
//!
//! Defines the persistence collaborator the import pipeline hands migrated
//! documents to.

use async_trait::async_trait;
use serde_json::Value;

use super::model::StoredMission;
use crate::error::Result;

/// Repository for mission persistence.
///
/// Implementations decode documents strictly against the stored schema and
/// reject them with [`MissionError::SchemaViolation`](crate::error::MissionError::SchemaViolation)
/// when a property is unknown, missing, or of the wrong type. The caller does
/// not retry rejected documents.
#[async_trait]
pub trait MissionRepository: Send + Sync {
    /// Stores a new mission from a migrated document.
    ///
    /// # Returns
    ///
    /// - `Ok(StoredMission)`: Mission stored with a fresh ID
    /// - `Err(SchemaViolation)`: Document does not match the stored schema
    async fn create(&self, document: Value) -> Result<StoredMission>;

    /// Replaces an existing mission with a full document.
    ///
    /// # Returns
    ///
    /// - `Ok(StoredMission)`: Mission replaced, `created_at` preserved
    /// - `Err(NotFound)`: No mission with this ID
    /// - `Err(SchemaViolation)`: Document does not match the stored schema
    async fn update(&self, mission_id: &str, document: Value) -> Result<StoredMission>;

    /// Finds a mission by its ID.
    async fn find_by_id(&self, mission_id: &str) -> Result<Option<StoredMission>>;

    /// Lists all stored missions.
    async fn list_all(&self) -> Result<Vec<StoredMission>>;
}
