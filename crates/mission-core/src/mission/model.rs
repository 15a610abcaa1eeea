//! Strongly-typed mission tree, as stored after migration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MissionError, Result};

/// A fully migrated mission.
///
/// Decoding is strict: unknown properties and missing required properties are
/// rejected, which is how the stored schema catches leftovers that migration
/// did not account for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Mission {
    pub name: String,
    pub version_number: u32,
    pub resource_label: String,
    /// Adjacency tree keyed by structure keys. Leaves are empty objects.
    pub structure: Map<String, Value>,
    pub prototypes: Vec<Prototype>,
    pub forces: Vec<Force>,
}

/// Layout record shared by every node instantiated at one structure position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Prototype {
    #[serde(rename = "_id")]
    pub id: String,
    pub structure_key: String,
    pub depth_padding: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Force {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub color: String,
    pub initial_resources: f64,
    pub reveal_all_nodes: bool,
    pub nodes: Vec<MissionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MissionNode {
    #[serde(rename = "_id")]
    pub id: String,
    pub prototype_id: String,
    pub name: String,
    pub color: String,
    pub description: String,
    pub pre_execution_text: String,
    pub executable: bool,
    pub device: bool,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Action {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    /// Milliseconds.
    pub process_time: u64,
    /// Probability in `[0, 1]`.
    pub success_chance: f64,
    pub resource_cost: f64,
    pub post_execution_success_text: String,
    pub post_execution_failure_text: String,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Effect {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_id: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl Mission {
    /// Strictly decodes a migrated document.
    ///
    /// The decoder message is kept verbatim so callers can recognize
    /// `unknown field` rejections.
    pub fn from_document(document: Value) -> Result<Self> {
        serde_json::from_value(document).map_err(|e| MissionError::schema_violation(e.to_string()))
    }

    /// Encodes the mission back into a dynamic document.
    pub fn to_document(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| MissionError::internal(e.to_string()))
    }

    /// Iterates every node across all forces.
    pub fn nodes(&self) -> impl Iterator<Item = &MissionNode> {
        self.forces.iter().flat_map(|force| force.nodes.iter())
    }

    pub fn node_count(&self) -> usize {
        self.forces.iter().map(|force| force.nodes.len()).sum()
    }
}

/// A mission as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMission {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub mission: Mission,
}

impl StoredMission {
    /// The name shown to users for this mission.
    pub fn display_name(&self) -> &str {
        &self.mission.name
    }
}
