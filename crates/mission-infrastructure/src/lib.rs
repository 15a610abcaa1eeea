#![recursion_limit = "256"]

pub mod config_service;
pub mod document;
pub mod json_dir_mission_repository;
pub mod memory_mission_repository;
pub mod migration;
pub mod paths;
pub mod storage;

mod admission;

pub use crate::config_service::ConfigService;
pub use crate::json_dir_mission_repository::JsonDirMissionRepository;
pub use crate::memory_mission_repository::InMemoryMissionRepository;
pub use crate::migration::{
    GENERATION_FIELD, LATEST_GENERATION, MigrationChain, MigrationRegistry,
    build_migration_registry,
};
