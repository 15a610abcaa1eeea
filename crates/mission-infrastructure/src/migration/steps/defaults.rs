//! Steps that fill in fields older generations never wrote.

use anyhow::{Result, bail};
use serde_json::{Value, json};

use crate::document::{
    Object, actions_mut, id_string, insert_default, legacy_nodes_mut, objects_mut,
};
use crate::migration::traits::{Generation, MigrationStep};

/// Generation 2: missions gain a `versionNumber`, starting at 1.
#[derive(Debug)]
pub struct AddVersionNumber;

impl MigrationStep for AddVersionNumber {
    fn target_generation(&self) -> Generation {
        2
    }

    fn description(&self) -> &str {
        "Add mission versionNumber"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        insert_default(root, "versionNumber", json!(1));
        Ok(())
    }
}

/// Generation 3: missions gain a configurable resource label.
#[derive(Debug)]
pub struct AddResourceLabel;

impl MigrationStep for AddResourceLabel {
    fn target_generation(&self) -> Generation {
        3
    }

    fn description(&self) -> &str {
        "Add mission resourceLabel"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        insert_default(root, "resourceLabel", json!("Resources"));
        Ok(())
    }
}

/// Generation 8: actions gain an (empty) effect list.
#[derive(Debug)]
pub struct AddActionEffects;

impl MigrationStep for AddActionEffects {
    fn target_generation(&self) -> Generation {
        8
    }

    fn description(&self) -> &str {
        "Add effects to actions"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for node in legacy_nodes_mut(root) {
            for action in actions_mut(node) {
                insert_default(action, "effects", json!([]));
            }
        }
        Ok(())
    }
}

/// Generation 9: nodes gain the `device` flag.
#[derive(Debug)]
pub struct AddNodeDevice;

impl MigrationStep for AddNodeDevice {
    fn target_generation(&self) -> Generation {
        9
    }

    fn description(&self) -> &str {
        "Add device flag to nodes"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for node in legacy_nodes_mut(root) {
            insert_default(node, "device", Value::Bool(false));
        }
        Ok(())
    }
}

/// Generation 14: nodes gain a `structureKey`, initially their own id.
///
/// Until now the structure map was keyed by node ids. Copying the id out
/// keeps the structure intact when ids are regenerated at generation 15.
/// A node with neither a structure key nor a usable id fails the step.
#[derive(Debug)]
pub struct AssignStructureKeys;

impl MigrationStep for AssignStructureKeys {
    fn target_generation(&self) -> Generation {
        14
    }

    fn description(&self) -> &str {
        "Assign node structure keys from node ids"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for (force_index, force) in objects_mut(root, "forces").enumerate() {
            for (node_index, node) in objects_mut(force, "nodes").enumerate() {
                if node.contains_key("structureKey") {
                    continue;
                }
                match id_string(node.get("_id")) {
                    Some(key) => {
                        node.insert("structureKey".to_string(), Value::String(key));
                    }
                    None => {
                        let name = node.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
                        bail!(
                            "node {} (\"{}\") of force {} has no id to derive a structure key from",
                            node_index,
                            name,
                            force_index
                        )
                    }
                }
            }
        }
        Ok(())
    }
}

/// Generation 17: forces gain `revealAllNodes`.
#[derive(Debug)]
pub struct AddForceRevealAllNodes;

impl MigrationStep for AddForceRevealAllNodes {
    fn target_generation(&self) -> Generation {
        17
    }

    fn description(&self) -> &str {
        "Add revealAllNodes to forces"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for force in objects_mut(root, "forces") {
            insert_default(force, "revealAllNodes", Value::Bool(false));
        }
        Ok(())
    }
}
