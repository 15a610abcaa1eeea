//! Schema migration for imported mission documents.
//!
//! Exported missions carry a generation marker (`schemaBuildNumber`). On
//! import the document is upgraded, in place, through every step whose target
//! generation is above the marker:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    MigrationRegistry                          │
//! │   (ordered by target generation, iterated by one runner)      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  2 AddVersionNumber        10 IntroduceForces                 │
//! │  3 AddResourceLabel        11 MoveInitialResourcesToForces    │
//! │  4 MapLegacyNodeColors     12 RenameNodeStructure             │
//! │  5 WrapRichText            13 UnifyEffectTargets              │
//! │  6 ClearPlaceholderText    14 AssignStructureKeys             │
//! │  7 RenameLegacyIdFields    15 RegenerateLegacyIds             │
//! │  8 AddActionEffects        16 ExtractPrototypes               │
//! │  9 AddNodeDevice           17 AddForceRevealAllNodes          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Adding a Generation
//!
//! 1. Implement [`MigrationStep`] for a new struct in `steps/`, returning the
//!    new generation from `target_generation()`
//! 2. Append it to the list in [`build_migration_registry()`]
//! 3. Bump [`LATEST_GENERATION`]
//!
//! Registration panics if a step is appended out of order.

mod registry;
pub mod steps;
mod traits;

// Public API
pub use registry::MigrationRegistry;
pub use traits::{Generation, MigrationChain, MigrationReport, MigrationStep};

use std::sync::Arc;

use mission_core::MissionError;
use mission_core::error::Result;
use mission_core::id::IdGenerator;
use serde_json::Value;

use crate::document::Object;
use steps::*;

/// Name of the generation marker in exported documents.
pub const GENERATION_FIELD: &str = "schemaBuildNumber";

/// Generation produced by the last registered step.
pub const LATEST_GENERATION: Generation = 17;

/// Reads the generation marker of a parsed document.
///
/// # Errors
///
/// - `MissingGeneration` if the document is not an object or has no marker
/// - `InvalidGeneration` if the marker is not a non-negative integer
pub fn read_generation(document: &Value) -> Result<Generation> {
    match document.get(GENERATION_FIELD) {
        None | Some(Value::Null) => Err(MissionError::MissingGeneration),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|g| Generation::try_from(g).ok())
            .ok_or_else(|| MissionError::InvalidGeneration {
                found: n.to_string(),
            }),
        Some(Value::String(s)) => Err(MissionError::InvalidGeneration { found: s.clone() }),
        Some(other) => Err(MissionError::InvalidGeneration {
            found: other.to_string(),
        }),
    }
}

pub(crate) fn write_generation(root: &mut Object, generation: Generation) {
    root.insert(GENERATION_FIELD.to_string(), Value::from(generation));
}

/// Removes the transport-only generation marker before persistence.
pub fn strip_generation(document: &mut Value) -> Option<Value> {
    document.as_object_mut()?.remove(GENERATION_FIELD)
}

/// Builds the registry holding every generation step ever shipped.
///
/// # Arguments
///
/// * `ids` - Identifier source for the steps that mint ids (15 and 16)
pub fn build_migration_registry(ids: Arc<dyn IdGenerator>) -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();

    registry.register_all(vec![
        Arc::new(AddVersionNumber),
        Arc::new(AddResourceLabel),
        Arc::new(MapLegacyNodeColors),
        Arc::new(WrapRichText),
        Arc::new(ClearPlaceholderText),
        Arc::new(RenameLegacyIdFields),
        Arc::new(AddActionEffects),
        Arc::new(AddNodeDevice),
        Arc::new(IntroduceForces),
        Arc::new(MoveInitialResourcesToForces),
        Arc::new(RenameNodeStructure),
        Arc::new(UnifyEffectTargets),
        Arc::new(AssignStructureKeys),
        Arc::new(RegenerateLegacyIds::new(ids.clone())),
        Arc::new(ExtractPrototypes::new(ids)),
        Arc::new(AddForceRevealAllNodes),
    ]);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::id::SequentialIdGenerator;
    use mission_core::mission::{Mission, StructuralValidator};
    use serde_json::json;

    fn registry() -> MigrationRegistry {
        build_migration_registry(Arc::new(SequentialIdGenerator::new("gen")))
    }

    /// A mission as the very first editor exported it.
    fn generation_zero() -> Value {
        json!({
            "name": "Legacy Mission",
            "initialResources": 50,
            "schemaBuildNumber": 0,
            "nodeStructure": {
                "5f8d0d55b54764421b7156c3": { "5f8d0d55b54764421b7156c4": {} }
            },
            "nodeData": [
                {
                    "nodeID": "5f8d0d55b54764421b7156c3",
                    "name": "Root",
                    "color": "green",
                    "description": "Root node",
                    "preExecutionText": "Node has not been executed.",
                    "depthPadding": 0,
                    "executable": false,
                    "actions": []
                },
                {
                    "nodeID": "5f8d0d55b54764421b7156c4",
                    "name": "Child",
                    "color": "teal",
                    "description": "",
                    "preExecutionText": "",
                    "depthPadding": 20,
                    "executable": true,
                    "actions": [ {
                        "actionID": "5f8d0d55b54764421b7156c5",
                        "name": "Hack",
                        "description": "Enter your description here.",
                        "processTime": 5000,
                        "successChance": 0.5,
                        "resourceCost": 5,
                        "postExecutionSuccessText": "Done",
                        "postExecutionFailureText": "Failed"
                    } ]
                }
            ]
        })
    }

    /// The same mission, as the generation-9 editor would have exported it.
    fn generation_nine() -> Value {
        json!({
            "name": "Legacy Mission",
            "versionNumber": 1,
            "resourceLabel": "Resources",
            "initialResources": 50,
            "schemaBuildNumber": 9,
            "nodeStructure": {
                "5f8d0d55b54764421b7156c3": { "5f8d0d55b54764421b7156c4": {} }
            },
            "nodeData": [
                {
                    "_id": "5f8d0d55b54764421b7156c3",
                    "name": "Root",
                    "color": "#65eb59",
                    "description": "<p>Root node</p>",
                    "preExecutionText": "",
                    "depthPadding": 0,
                    "executable": false,
                    "device": false,
                    "actions": []
                },
                {
                    "_id": "5f8d0d55b54764421b7156c4",
                    "name": "Child",
                    "color": "teal",
                    "description": "",
                    "preExecutionText": "",
                    "depthPadding": 20,
                    "executable": true,
                    "device": false,
                    "actions": [ {
                        "_id": "5f8d0d55b54764421b7156c5",
                        "name": "Hack",
                        "description": "",
                        "processTime": 5000,
                        "successChance": 0.5,
                        "resourceCost": 5,
                        "postExecutionSuccessText": "<p>Done</p>",
                        "postExecutionFailureText": "<p>Failed</p>",
                        "effects": []
                    } ]
                }
            ]
        })
    }

    #[test]
    fn test_registry_covers_every_generation_in_order() {
        let registry = registry();
        assert_eq!(registry.latest_generation(), LATEST_GENERATION);
        let targets: Vec<Generation> = registry.steps().map(|s| s.target_generation()).collect();
        assert_eq!(targets, (2..=LATEST_GENERATION).collect::<Vec<_>>());
    }

    #[test]
    fn test_read_generation() {
        assert_eq!(read_generation(&json!({ "schemaBuildNumber": 12 })).unwrap(), 12);
        assert!(matches!(
            read_generation(&json!({ "name": "x" })),
            Err(MissionError::MissingGeneration)
        ));
        assert!(matches!(
            read_generation(&json!({ "schemaBuildNumber": null })),
            Err(MissionError::MissingGeneration)
        ));
        assert!(matches!(
            read_generation(&json!({ "schemaBuildNumber": -1 })),
            Err(MissionError::InvalidGeneration { .. })
        ));
        assert!(matches!(
            read_generation(&json!({ "schemaBuildNumber": 2.5 })),
            Err(MissionError::InvalidGeneration { .. })
        ));
        assert!(matches!(
            read_generation(&json!({ "schemaBuildNumber": "12" })),
            Err(MissionError::InvalidGeneration { .. })
        ));
        assert!(matches!(
            read_generation(&json!([1, 2, 3])),
            Err(MissionError::MissingGeneration)
        ));
    }

    #[test]
    fn test_generation_zero_reaches_final_shape() {
        let mut document = generation_zero();
        let report = registry().migrate_to_latest(&mut document).unwrap();
        assert_eq!(report.from, 0);
        assert_eq!(report.to, LATEST_GENERATION);
        assert_eq!(report.applied.len(), 16);

        assert_eq!(strip_generation(&mut document), Some(json!(LATEST_GENERATION)));
        StructuralValidator::new().validate(&document).unwrap();
        let mission = Mission::from_document(document).unwrap();

        assert_eq!(mission.version_number, 1);
        assert_eq!(mission.resource_label, "Resources");
        assert_eq!(mission.forces.len(), 1);
        let force = &mission.forces[0];
        assert_eq!(force.name, DEFAULT_FORCE_NAME);
        assert_eq!(force.initial_resources, 50.0);
        assert!(!force.reveal_all_nodes);

        let root = &force.nodes[0];
        assert_eq!(root.color, "#65eb59");
        assert_eq!(root.description, "<p>Root node</p>");
        assert_eq!(root.pre_execution_text, "");
        assert!(!root.device);

        let child = &force.nodes[1];
        assert_eq!(child.color, "teal");
        assert_eq!(child.actions[0].description, "");
        assert_eq!(child.actions[0].post_execution_success_text, "<p>Done</p>");
        assert!(child.actions[0].effects.is_empty());

        assert_eq!(mission.prototypes.len(), 2);
        assert_eq!(mission.prototypes[0].structure_key, "5f8d0d55b54764421b7156c3");
        assert_eq!(mission.prototypes[1].depth_padding, 20);
        assert_eq!(child.prototype_id, mission.prototypes[1].id);
        assert!(!needs_fresh_id(Some(&json!(child.id))));
    }

    #[test]
    fn test_older_generation_converges_with_newer_export() {
        let mut from_zero = generation_zero();
        let mut from_nine = generation_nine();
        registry().migrate_to_latest(&mut from_zero).unwrap();
        registry().migrate_to_latest(&mut from_nine).unwrap();
        assert_eq!(from_zero, from_nine);
    }

    #[test]
    fn test_migrating_twice_changes_nothing() {
        let registry = registry();
        let mut document = generation_zero();
        registry.migrate_to_latest(&mut document).unwrap();
        let once = document.clone();

        let report = registry.migrate_to_latest(&mut document).unwrap();
        assert!(report.is_noop());
        assert_eq!(document, once);
    }

    #[test]
    fn test_missing_node_data_fails_at_generation_ten() {
        let mut document = generation_zero();
        document.as_object_mut().unwrap().remove("nodeData");
        let err = registry().migrate_to_latest(&mut document).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("generation 10"), "{}", message);
        assert!(message.contains("nodeData"), "{}", message);
    }
}
