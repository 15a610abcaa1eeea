//! Migration registry for the linear generation chain.
//!
//! Each step is tagged with the generation it upgrades a document to. Steps
//! are registered in ascending order and the runner relies on that order
//! instead of sorting.

use std::sync::Arc;

use anyhow::Context;
use mission_core::MissionError;
use mission_core::error::Result;
use serde_json::Value;

use super::traits::{Generation, MigrationChain, MigrationReport, MigrationStep};
use super::{read_generation, write_generation};
use crate::document::root_mut;

/// Registry holding the ordered chain of migration steps.
///
/// # Example
///
/// ```ignore
/// let mut registry = MigrationRegistry::new();
/// registry.register(Arc::new(AddVersionNumber));   // → 2
/// registry.register(Arc::new(AddResourceLabel));   // → 3
///
/// // A generation-1 document passes through both steps
/// let report = registry.migrate_to_latest(&mut document)?;
/// assert_eq!(report.applied, vec![2, 3]);
/// ```
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    /// Steps in ascending target-generation order.
    steps: Vec<Arc<dyn MigrationStep>>,
}

impl MigrationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Registers a single step, validating the ordering.
    ///
    /// # Panics
    ///
    /// Panics if the step's target generation is not strictly greater than
    /// the previously registered step's target.
    pub fn register(&mut self, step: Arc<dyn MigrationStep>) {
        if let Some(last) = self.steps.last() {
            assert!(
                step.target_generation() > last.target_generation(),
                "Migration chain out of order: generation {} ('{}') registered after generation {} ('{}')",
                step.target_generation(),
                step.description(),
                last.target_generation(),
                last.description()
            );
        }

        self.steps.push(step);
    }

    /// Registers multiple steps at once, in the order given.
    ///
    /// # Panics
    ///
    /// Panics if any step breaks the ascending order.
    pub fn register_all(&mut self, steps: Vec<Arc<dyn MigrationStep>>) {
        for step in steps {
            self.register(step);
        }
    }

    /// The generation every migrated document ends at.
    ///
    /// An empty registry only accepts generation-0 documents.
    pub fn latest_generation(&self) -> Generation {
        self.steps.last().map(|s| s.target_generation()).unwrap_or(0)
    }

    /// Returns true if no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Iterates the registered steps in order.
    pub fn steps(&self) -> impl Iterator<Item = &Arc<dyn MigrationStep>> {
        self.steps.iter()
    }

    /// Confirms a declared generation can be migrated by this registry.
    pub fn check_supported(&self, generation: Generation) -> Result<()> {
        let latest = self.latest_generation();
        if generation > latest {
            return Err(MissionError::UnsupportedGeneration {
                found: generation,
                latest,
            });
        }
        Ok(())
    }
}

impl MigrationChain for MigrationRegistry {
    fn migrate_to_latest(&self, document: &mut Value) -> Result<MigrationReport> {
        let from = read_generation(document)?;
        self.check_supported(from)?;

        let mut report = MigrationReport {
            from,
            to: from,
            applied: Vec::new(),
        };

        let pending = self.pending_generations(from);
        if pending.is_empty() {
            tracing::debug!(
                "Document is already at generation {}, no migration needed",
                from
            );
            return Ok(report);
        }

        tracing::info!(
            "Starting migration from generation {} to {} ({} steps)",
            from,
            self.latest_generation(),
            pending.len()
        );

        let root = root_mut(document)?;
        for step in &self.steps {
            let current = report.to;
            if current >= step.target_generation() {
                continue;
            }

            tracing::debug!(
                "Migration step {} -> {} ({})",
                current,
                step.target_generation(),
                step.description()
            );

            step.apply(root).with_context(|| {
                format!(
                    "Migration to generation {} ({}) failed",
                    step.target_generation(),
                    step.description()
                )
            })?;

            write_generation(root, step.target_generation());
            report.to = step.target_generation();
            report.applied.push(step.target_generation());
        }

        tracing::info!(
            "Migration completed successfully: {} -> {}",
            report.from,
            report.to
        );

        Ok(report)
    }

    fn pending_generations(&self, from: Generation) -> Vec<Generation> {
        self.steps
            .iter()
            .map(|s| s.target_generation())
            .filter(|target| *target > from)
            .collect()
    }
}
