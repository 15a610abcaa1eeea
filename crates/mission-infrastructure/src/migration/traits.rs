//! Core traits for the migration framework.
//!
//! This module defines the abstractions for upgrading dynamically-shaped
//! mission documents one generation at a time.

use anyhow::Result;
use mission_core::error::Result as MissionResult;
use serde_json::Value;

use crate::document::Object;

/// Schema generation number carried by every exported mission.
pub type Generation = u32;

/// A single generation upgrade.
///
/// A step transforms a document of generation `target_generation() - 1` (or
/// any older generation that earlier steps have already upgraded) into the
/// shape of `target_generation()`, editing it in place. The runner only
/// invokes a step when the document's generation is below its target, so a
/// step never sees a document it has already upgraded.
pub trait MigrationStep: Send + Sync + std::fmt::Debug {
    /// Returns the generation this step upgrades documents to.
    fn target_generation(&self) -> Generation;

    /// Returns a human-readable description of this step.
    ///
    /// Used for logging and error context.
    fn description(&self) -> &str;

    /// Transforms the document root in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is too malformed for this step to
    /// transform (for example, a container no historical format omits).
    fn apply(&self, root: &mut Object) -> Result<()>;
}

/// Outcome of running a document through the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Generation declared by the document before migration.
    pub from: Generation,
    /// Generation of the document after migration.
    pub to: Generation,
    /// Target generations of the steps that ran, in order.
    pub applied: Vec<Generation>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// An ordered chain of steps that upgrades documents to the latest generation.
///
/// Implementations must run every step whose target exceeds the document's
/// generation, in ascending order, without skipping any.
pub trait MigrationChain {
    /// Migrates a document in place and updates its generation marker.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The generation marker is missing or invalid
    /// - The document is newer than the latest registered generation
    /// - Any step in the chain fails
    fn migrate_to_latest(&self, document: &mut Value) -> MissionResult<MigrationReport>;

    /// Returns the target generations that a document at `from` would pass through.
    ///
    /// Primarily used for debugging and dry runs.
    fn pending_generations(&self, from: Generation) -> Vec<Generation>;
}
