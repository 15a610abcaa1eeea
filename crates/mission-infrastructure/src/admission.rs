//! Schema gate shared by every mission store.

use mission_core::error::Result;
use mission_core::mission::{Mission, StructuralValidator};
use serde_json::Value;

/// Checks a document against the stored schema and integrity rules.
///
/// Strict decoding runs first so that unknown or mistyped properties surface
/// as schema violations rather than as structural ones.
pub(crate) fn admit(document: Value) -> Result<Mission> {
    let mission = Mission::from_document(document.clone())?;
    StructuralValidator::new().validate(&document)?;
    Ok(mission)
}
