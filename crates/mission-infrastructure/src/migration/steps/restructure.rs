//! Steps that rename, move or regroup parts of the document.

use anyhow::{Result, bail};
use serde_json::{Value, json};

use crate::document::{
    Object, actions_mut, effects_mut, force_nodes_mut, kind, legacy_nodes_mut, objects_mut,
    rename_key,
};
use crate::migration::traits::{Generation, MigrationStep};

/// Name given to the force that wraps a pre-force mission's nodes.
pub const DEFAULT_FORCE_NAME: &str = "Friendly Force";

/// Color given to the force that wraps a pre-force mission's nodes.
pub const DEFAULT_FORCE_COLOR: &str = "#52b1ff";

/// Starting resources for forces of missions that never declared any.
pub const DEFAULT_INITIAL_RESOURCES: f64 = 100.0;

/// Generation 7: `nodeID` and `actionID` become `_id`.
#[derive(Debug)]
pub struct RenameLegacyIdFields;

impl MigrationStep for RenameLegacyIdFields {
    fn target_generation(&self) -> Generation {
        7
    }

    fn description(&self) -> &str {
        "Rename nodeID and actionID to _id"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for node in legacy_nodes_mut(root) {
            rename_key(node, "nodeID", "_id");
            for action in actions_mut(node) {
                rename_key(action, "actionID", "_id");
            }
        }
        Ok(())
    }
}

/// Generation 10: the flat node list is grouped under a single force.
#[derive(Debug)]
pub struct IntroduceForces;

impl MigrationStep for IntroduceForces {
    fn target_generation(&self) -> Generation {
        10
    }

    fn description(&self) -> &str {
        "Group nodeData into a single force"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        if root.get("forces").is_some_and(Value::is_array) && !root.contains_key("nodeData") {
            return Ok(());
        }

        let nodes = match root.remove("nodeData") {
            Some(nodes @ Value::Array(_)) => nodes,
            Some(other) => bail!("nodeData must be an array, found {}", kind(&other)),
            None => bail!("the mission has no nodeData list to group into a force"),
        };

        root.insert(
            "forces".to_string(),
            json!([{
                "name": DEFAULT_FORCE_NAME,
                "color": DEFAULT_FORCE_COLOR,
                "nodes": nodes,
            }]),
        );
        Ok(())
    }
}

/// Generation 11: `initialResources` moves from the mission to each force.
#[derive(Debug)]
pub struct MoveInitialResourcesToForces;

impl MigrationStep for MoveInitialResourcesToForces {
    fn target_generation(&self) -> Generation {
        11
    }

    fn description(&self) -> &str {
        "Move initialResources from the mission to its forces"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        let resources = root
            .remove("initialResources")
            .unwrap_or_else(|| json!(DEFAULT_INITIAL_RESOURCES));

        for force in objects_mut(root, "forces") {
            if !force.contains_key("initialResources") {
                force.insert("initialResources".to_string(), resources.clone());
            }
        }
        Ok(())
    }
}

/// Generation 12: `nodeStructure` is renamed to `structure`.
#[derive(Debug)]
pub struct RenameNodeStructure;

impl MigrationStep for RenameNodeStructure {
    fn target_generation(&self) -> Generation {
        12
    }

    fn description(&self) -> &str {
        "Rename nodeStructure to structure"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        if !root.contains_key("nodeStructure") && !root.contains_key("structure") {
            bail!("the mission has no nodeStructure");
        }
        rename_key(root, "nodeStructure", "structure");
        Ok(())
    }
}

/// Generation 13: effect targets are unified into `targetId`.
///
/// Effects used to name their target either externally (`externalTarget`, a
/// target id string) or internally (`internalTarget`, an embedded target
/// object). Both alternates are removed.
#[derive(Debug)]
pub struct UnifyEffectTargets;

impl UnifyEffectTargets {
    fn unify(effect: &mut Object) -> Result<()> {
        let external = effect.remove("externalTarget");
        let internal = effect.remove("internalTarget");
        if effect.contains_key("targetId") {
            return Ok(());
        }

        let target_id = match (external, internal) {
            (Some(Value::String(id)), _) if !id.is_empty() => id,
            (_, Some(Value::Object(target))) => match target.get("_id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => bail!("an internal effect target has no _id"),
            },
            (_, Some(Value::String(id))) if !id.is_empty() => id,
            _ => {
                let name = effect.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
                bail!("effect \"{}\" has neither an external nor an internal target", name)
            }
        };

        effect.insert("targetId".to_string(), Value::String(target_id));
        Ok(())
    }
}

impl MigrationStep for UnifyEffectTargets {
    fn target_generation(&self) -> Generation {
        13
    }

    fn description(&self) -> &str {
        "Unify external and internal effect targets into targetId"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for node in force_nodes_mut(root) {
            for action in actions_mut(node) {
                for effect in effects_mut(action) {
                    Self::unify(effect)?;
                }
            }
        }
        Ok(())
    }
}
