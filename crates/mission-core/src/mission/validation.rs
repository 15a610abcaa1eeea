//! Referential-integrity checks for a fully migrated mission document.
//!
//! The validator reads the dynamic document rather than the typed
//! [`Mission`](super::model::Mission): it runs before the document is cast into
//! the stored schema, and it only looks at the fields that carry references.
//! The first violation found is returned.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single referential-integrity violation, naming the offending key or id.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureViolation {
    #[error("\"{path}\" is missing or has the wrong type.")]
    MalformedDocument { path: String },

    #[error("The structure entry \"{key}\" is not an object.")]
    NotAnObject { key: String },

    #[error("The structure key \"{key}\" is not declared by any prototype.")]
    UndeclaredStructureKey { key: String },

    #[error("The structure key \"{key}\" is used more than once.")]
    DuplicateStructureKey { key: String },

    #[error("The prototype structure key \"{key}\" is not reachable from the structure.")]
    UnreachablePrototype { key: String },

    #[error("The prototype ID \"{id}\" is used more than once.")]
    DuplicatePrototypeId { id: String },

    #[error("The node ID \"{id}\" is used more than once.")]
    DuplicateNodeId { id: String },

    #[error("The action ID \"{action_id}\" is used more than once in node \"{node_id}\".")]
    DuplicateActionId { node_id: String, action_id: String },

    #[error("The node \"{node_id}\" references the unknown prototype \"{prototype_id}\".")]
    UnknownPrototype {
        node_id: String,
        prototype_id: String,
    },

    #[error("The executable node \"{node_id}\" has no actions.")]
    ExecutableWithoutActions { node_id: String },
}

/// Checks structure/prototype consistency and identifier uniqueness.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a migrated document.
    ///
    /// Order of checks:
    /// 1. prototypes (unique ids and structure keys)
    /// 2. the structure walk, from the root
    /// 3. every declared key is reachable from the root
    /// 4. node and action identifiers, prototype references, executable nodes
    pub fn validate(&self, document: &Value) -> Result<(), StructureViolation> {
        let prototypes = array_at(document, "prototypes")?;
        let mut declared_keys: Vec<&str> = Vec::with_capacity(prototypes.len());
        let mut prototype_ids: HashSet<&str> = HashSet::with_capacity(prototypes.len());

        for (i, prototype) in prototypes.iter().enumerate() {
            let path = format!("prototypes[{}]", i);
            let id = str_field(prototype, "_id", &path)?;
            let key = str_field(prototype, "structureKey", &path)?;
            if !prototype_ids.insert(id) {
                return Err(StructureViolation::DuplicatePrototypeId { id: id.to_string() });
            }
            if declared_keys.contains(&key) {
                return Err(StructureViolation::DuplicateStructureKey {
                    key: key.to_string(),
                });
            }
            declared_keys.push(key);
        }

        let root = document
            .get("structure")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("structure"))?;
        let declared: HashSet<&str> = declared_keys.iter().copied().collect();
        let mut visited: HashSet<&str> = HashSet::with_capacity(declared.len());
        walk_structure(root, &declared, &mut visited)?;

        if let Some(key) = declared_keys.iter().find(|key| !visited.contains(*key)) {
            return Err(StructureViolation::UnreachablePrototype {
                key: key.to_string(),
            });
        }

        self.validate_nodes(document, &prototype_ids)
    }

    fn validate_nodes(
        &self,
        document: &Value,
        prototype_ids: &HashSet<&str>,
    ) -> Result<(), StructureViolation> {
        let mut node_ids: HashSet<&str> = HashSet::new();

        for (f, force) in array_at(document, "forces")?.iter().enumerate() {
            let force_path = format!("forces[{}]", f);
            let nodes = force
                .get("nodes")
                .and_then(Value::as_array)
                .ok_or_else(|| malformed(format!("{}.nodes", force_path)))?;

            for (n, node) in nodes.iter().enumerate() {
                let node_path = format!("{}.nodes[{}]", force_path, n);
                let node_id = str_field(node, "_id", &node_path)?;
                if !node_ids.insert(node_id) {
                    return Err(StructureViolation::DuplicateNodeId {
                        id: node_id.to_string(),
                    });
                }

                let prototype_id = str_field(node, "prototypeId", &node_path)?;
                if !prototype_ids.contains(prototype_id) {
                    return Err(StructureViolation::UnknownPrototype {
                        node_id: node_id.to_string(),
                        prototype_id: prototype_id.to_string(),
                    });
                }

                let actions = node
                    .get("actions")
                    .and_then(Value::as_array)
                    .ok_or_else(|| malformed(format!("{}.actions", node_path)))?;
                let mut action_ids: HashSet<&str> = HashSet::with_capacity(actions.len());
                for (a, action) in actions.iter().enumerate() {
                    let action_id = str_field(action, "_id", &format!("{}.actions[{}]", node_path, a))?;
                    if !action_ids.insert(action_id) {
                        return Err(StructureViolation::DuplicateActionId {
                            node_id: node_id.to_string(),
                            action_id: action_id.to_string(),
                        });
                    }
                }

                let executable = node.get("executable").and_then(Value::as_bool).unwrap_or(false);
                if executable && actions.is_empty() {
                    return Err(StructureViolation::ExecutableWithoutActions {
                        node_id: node_id.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn walk_structure<'a>(
    level: &'a Map<String, Value>,
    declared: &HashSet<&str>,
    visited: &mut HashSet<&'a str>,
) -> Result<(), StructureViolation> {
    for (key, child) in level {
        let Some(children) = child.as_object() else {
            return Err(StructureViolation::NotAnObject { key: key.clone() });
        };
        if !declared.contains(key.as_str()) {
            return Err(StructureViolation::UndeclaredStructureKey { key: key.clone() });
        }
        if !visited.insert(key.as_str()) {
            return Err(StructureViolation::DuplicateStructureKey { key: key.clone() });
        }
        walk_structure(children, declared, visited)?;
    }
    Ok(())
}

fn malformed(path: impl Into<String>) -> StructureViolation {
    StructureViolation::MalformedDocument { path: path.into() }
}

fn array_at<'a>(document: &'a Value, key: &str) -> Result<&'a Vec<Value>, StructureViolation> {
    document
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(key))
}

fn str_field<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a str, StructureViolation> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("{}.{}", path, key)))
}
