//! Helpers for editing in-flight mission documents.
//!
//! Before migration finishes a document is plain JSON whose shape depends on
//! its generation. These helpers walk the parts migration steps touch and
//! silently skip entries that are not objects; steps that need a container to
//! exist check for it themselves.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

/// An object inside a mission document.
pub type Object = Map<String, Value>;

/// The document root as an object.
pub fn root_mut(document: &mut Value) -> Result<&mut Object> {
    match document {
        Value::Object(root) => Ok(root),
        other => bail!("the mission document must be an object, found {}", kind(other)),
    }
}

/// Every object in the array stored under `key`.
pub fn objects_mut<'a>(parent: &'a mut Object, key: &str) -> impl Iterator<Item = &'a mut Object> {
    parent
        .get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

/// Nodes of a pre-force document (`nodeData[]`).
pub fn legacy_nodes_mut(root: &mut Object) -> impl Iterator<Item = &mut Object> {
    objects_mut(root, "nodeData")
}

/// Nodes of every force (`forces[].nodes[]`).
pub fn force_nodes_mut(root: &mut Object) -> impl Iterator<Item = &mut Object> {
    objects_mut(root, "forces").flat_map(|force| objects_mut(force, "nodes"))
}

pub fn actions_mut(node: &mut Object) -> impl Iterator<Item = &mut Object> {
    objects_mut(node, "actions")
}

pub fn effects_mut(action: &mut Object) -> impl Iterator<Item = &mut Object> {
    objects_mut(action, "effects")
}

/// Inserts `value` under `key` unless the key is already present.
pub fn insert_default(object: &mut Object, key: &str, value: Value) {
    if !object.contains_key(key) {
        object.insert(key.to_string(), value);
    }
}

/// Moves the value under `from` to `to`. An existing `to` wins and the old
/// key is dropped.
pub fn rename_key(object: &mut Object, from: &str, to: &str) {
    if let Some(value) = object.remove(from) {
        if !object.contains_key(to) {
            object.insert(to.to_string(), value);
        }
    }
}

/// Applies `f` to the string stored under `key`, if there is one.
pub fn map_string(object: &mut Object, key: &str, f: impl FnOnce(&str) -> Option<String>) {
    if let Some(Value::String(current)) = object.get_mut(key) {
        if let Some(replacement) = f(current) {
            *current = replacement;
        }
    }
}

/// A scalar identifier rendered as a string. Numbers are accepted because
/// early exports stored numeric ids.
pub fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A short name for the JSON type of `value`.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_must_be_object() {
        let mut document = json!([1, 2]);
        let err = root_mut(&mut document).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_force_nodes_span_all_forces() {
        let mut document = json!({
            "forces": [
                { "nodes": [ { "_id": "a" }, 7 ] },
                { "nodes": [ { "_id": "b" } ] },
                { "name": "no nodes" }
            ]
        });
        let root = root_mut(&mut document).unwrap();
        let ids: Vec<String> = force_nodes_mut(root)
            .map(|node| node["_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_rename_keeps_existing_target() {
        let mut object = json!({ "old": 1, "new": 2 }).as_object().unwrap().clone();
        rename_key(&mut object, "old", "new");
        assert_eq!(Value::Object(object), json!({ "new": 2 }));
    }

    #[test]
    fn test_id_string() {
        assert_eq!(id_string(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(id_string(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(id_string(Some(&json!(""))), None);
        assert_eq!(id_string(None), None);
    }
}
