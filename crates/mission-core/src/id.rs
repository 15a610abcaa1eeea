//! Identifier generation for documents that need fresh ids.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Produces opaque string identifiers.
///
/// Migration steps that mint identifiers receive one of these instead of
/// calling a global generator, so tests can supply a deterministic source.
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    /// Returns a new identifier, distinct from every previous one.
    fn generate_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic identifiers of the form `<prefix>-<n>`, counting from 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_distinct() {
        let ids = UuidIdGenerator;
        assert_ne!(ids.generate_id(), ids.generate_id());
        assert!(Uuid::parse_str(&ids.generate_id()).is_ok());
    }

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialIdGenerator::new("node");
        assert_eq!(ids.generate_id(), "node-1");
        assert_eq!(ids.generate_id(), "node-2");
    }
}
