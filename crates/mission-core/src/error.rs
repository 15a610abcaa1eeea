//! Error types for mission import and persistence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mission::validation::StructureViolation;

/// Broad classification of an error, used by outer surfaces to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller supplied something unusable (bad file, bad shape).
    BadRequest,
    /// The requested entity does not exist.
    NotFound,
    /// The server could not complete the request (including stored-schema violations).
    Internal,
}

/// A shared error type for the mission subsystem.
///
/// Every variant renders as a human-readable message; the import pipeline
/// records those messages per file instead of propagating them.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MissionError {
    /// The file could not be read, or its bytes are not text.
    #[error("File is unreadable or corrupted: {message}")]
    Unreadable { message: String },

    /// The file text is not a well-formed document.
    #[error("{}", describe_parse_failure(.offset, .message))]
    Parse {
        offset: Option<usize>,
        message: String,
    },

    /// The document declares no generation.
    #[error("The file does not declare a schema build number.")]
    MissingGeneration,

    /// The generation marker is present but is not a non-negative integer.
    #[error("The schema build number \"{found}\" is not a non-negative integer.")]
    InvalidGeneration { found: String },

    /// The document declares a generation this build cannot migrate from.
    #[error(
        "The schema build number {found} is newer than the latest supported build number ({latest})."
    )]
    UnsupportedGeneration { found: u32, latest: u32 },

    /// The file name carries neither recognized extension.
    #[error("The file \"{file_name}\" does not have a recognized extension (expected .{legacy} or .{current}).")]
    UnrecognizedExtension {
        file_name: String,
        legacy: String,
        current: String,
    },

    /// The file extension disagrees with the declared generation.
    #[error(
        "The file extension .{found} does not match schema build number {generation} (expected .{expected})."
    )]
    ExtensionMismatch {
        found: String,
        expected: String,
        generation: u32,
    },

    /// A migration step could not transform the document.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// The migrated document violates referential integrity.
    #[error("Invalid mission structure: {0}")]
    Structure(#[from] StructureViolation),

    /// The persistence layer rejected the document against the stored schema.
    #[error("Mission failed schema validation: {0}")]
    SchemaViolation(String),

    /// A schema violation caused by a property the stored schema does not know.
    #[error(
        "The property \"{name}\" is not recognized by the current mission schema. Remove it from the file and import again."
    )]
    UnrecognizedProperty { name: String },

    /// Entity not found.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error outside of file reading (store directories, config files).
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_parse_failure(offset: &Option<usize>, message: &str) -> String {
    match offset {
        Some(offset) => format!(
            "The file contains invalid JSON (syntax error at position {}): {}",
            offset, message
        ),
        None => format!("The file contains invalid JSON: {}", message),
    }
}

impl MissionError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Unreadable error
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self::Unreadable {
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Creates a SchemaViolation error
    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::SchemaViolation(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a schema violation raised by persistence
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            Self::SchemaViolation(_) | Self::UnrecognizedProperty { .. }
        )
    }

    /// Check if this error was caused by the file envelope (extension or generation marker)
    pub fn is_envelope(&self) -> bool {
        matches!(
            self,
            Self::MissingGeneration
                | Self::InvalidGeneration { .. }
                | Self::UnsupportedGeneration { .. }
                | Self::UnrecognizedExtension { .. }
                | Self::ExtensionMismatch { .. }
        )
    }

    /// Returns the broad class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::SchemaViolation(_)
            | Self::UnrecognizedProperty { .. }
            | Self::Io { .. }
            | Self::Config(_)
            | Self::Internal(_) => ErrorClass::Internal,
            _ => ErrorClass::BadRequest,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MissionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for MissionError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Migration steps report through anyhow; the full context chain is kept.
impl From<anyhow::Error> for MissionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Migration(format!("{:#}", err))
    }
}

/// A type alias for `Result<T, MissionError>`.
pub type Result<T> = std::result::Result<T, MissionError>;
