//! Application layer for mission import.
//!
//! This crate wires the migration engine and a persistence collaborator into
//! the per-file import pipeline, the batch coordinator, and bootstrap seeding.

pub mod import;
pub mod seeding;

pub use import::{ImportCoordinator, MissionImporter};
pub use seeding::MissionSeeder;
