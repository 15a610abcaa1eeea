//! Mission file import: one pipeline per file, one coordinator per batch.

mod coordinator;
mod pipeline;

pub use coordinator::ImportCoordinator;
pub use pipeline::{MissionImporter, parse_document};
