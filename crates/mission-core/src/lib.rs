pub mod config;
pub mod error;
pub mod id;
pub mod import;
pub mod mission;

// Re-export common error type
pub use error::{ErrorClass, MissionError};
