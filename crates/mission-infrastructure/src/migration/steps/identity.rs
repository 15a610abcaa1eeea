//! Steps that mint identifiers: legacy id replacement and prototype extraction.
//!
//! These are the only steps that use the identifier generator.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use mission_core::id::IdGenerator;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use crate::document::{Object, actions_mut, effects_mut, force_nodes_mut, kind, objects_mut};
use crate::migration::traits::{Generation, MigrationStep};

/// Ids minted by the old document database: 24 hexadecimal characters.
static LEGACY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[0-9a-fA-F]{24}$").expect("legacy id pattern is valid"));

/// Returns true if `value` is absent or looks like a legacy database id.
pub fn needs_fresh_id(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(id)) => id.is_empty() || LEGACY_ID.is_match(id),
        _ => true,
    }
}

/// Generation 15: legacy database ids are replaced with opaque ids.
///
/// Forces, nodes, actions and effects whose `_id` is missing, empty, not a
/// string, or shaped like a legacy database id get a fresh one. Ids that are
/// already opaque are preserved. Structure keys are untouched, so the
/// structure map stays valid.
#[derive(Debug)]
pub struct RegenerateLegacyIds {
    ids: Arc<dyn IdGenerator>,
}

impl RegenerateLegacyIds {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    fn refresh(&self, object: &mut Object) {
        if needs_fresh_id(object.get("_id")) {
            object.insert("_id".to_string(), Value::String(self.ids.generate_id()));
        }
    }
}

impl MigrationStep for RegenerateLegacyIds {
    fn target_generation(&self) -> Generation {
        15
    }

    fn description(&self) -> &str {
        "Replace legacy database ids with generated ids"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        for force in objects_mut(root, "forces") {
            self.refresh(force);
        }
        for node in force_nodes_mut(root) {
            self.refresh(node);
            for action in actions_mut(node) {
                self.refresh(action);
                for effect in effects_mut(action) {
                    self.refresh(effect);
                }
            }
        }
        Ok(())
    }
}

/// Generation 16: per-node layout moves into shared prototypes.
///
/// Each node's `structureKey` and `depthPadding` are extracted into a
/// prototype. Nodes sharing a structure key (the same position instantiated
/// by several forces) share one prototype; the first node seen decides its
/// padding. A missing padding is 0; any padding that is not an integer
/// fails the step. Nodes keep a `prototypeId` reference and lose both fields.
#[derive(Debug)]
pub struct ExtractPrototypes {
    ids: Arc<dyn IdGenerator>,
}

impl ExtractPrototypes {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl MigrationStep for ExtractPrototypes {
    fn target_generation(&self) -> Generation {
        16
    }

    fn description(&self) -> &str {
        "Extract node layout into shared prototypes"
    }

    fn apply(&self, root: &mut Object) -> Result<()> {
        let mut prototypes: Vec<Value> = match root.remove("prototypes") {
            Some(Value::Array(existing)) => existing,
            _ => Vec::new(),
        };
        let mut by_key: HashMap<String, String> = prototypes
            .iter()
            .filter_map(|p| {
                let key = p.get("structureKey")?.as_str()?;
                let id = p.get("_id")?.as_str()?;
                Some((key.to_string(), id.to_string()))
            })
            .collect();

        for node in force_nodes_mut(root) {
            let key = match node.remove("structureKey") {
                Some(Value::String(key)) if !key.is_empty() => key,
                _ => {
                    let id = node.get("_id").and_then(Value::as_str).unwrap_or("<unknown>");
                    bail!("node \"{}\" has no structure key", id)
                }
            };
            let padding = match node.remove("depthPadding") {
                None => 0,
                Some(value) => match value.as_i64() {
                    Some(padding) => padding,
                    None => {
                        let id = node.get("_id").and_then(Value::as_str).unwrap_or("<unknown>");
                        bail!(
                            "node \"{}\" has a depth padding that is {}, not an integer",
                            id,
                            kind(&value)
                        )
                    }
                },
            };

            let prototype_id = by_key
                .entry(key.clone())
                .or_insert_with(|| {
                    let id = self.ids.generate_id();
                    prototypes.push(json!({
                        "_id": id,
                        "structureKey": key,
                        "depthPadding": padding,
                    }));
                    id
                })
                .clone();

            node.insert("prototypeId".to_string(), Value::String(prototype_id));
        }

        root.insert("prototypes".to_string(), Value::Array(prototypes));
        Ok(())
    }
}
