//! Error types for the Gramforge engine.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Gramforge workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. External-collaborator
/// faults (validation, customization, lexicon import) are explicit variants
/// so the workflow engine can match on them instead of intercepting panics.
#[derive(Error, Debug, Clone, Serialize)]
pub enum GramforgeError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Session allocation or resolution error
    #[error("Session error: {0}")]
    Session(String),

    /// Choices document error (malformed content, unreadable file)
    #[error("Choices document error: {0}")]
    Document(String),

    /// Fault raised by the external validation call
    #[error("Validation fault: {0}")]
    Validation(String),

    /// Fault raised by the external customization call
    #[error("Customization fault: {0}")]
    Customize(String),

    /// Fault raised during lexicon import
    #[error("Lexicon import fault: {0}")]
    Import(String),

    /// Archive pool error (snapshot allocation or copy)
    #[error("Archive error: {0}")]
    Archive(String),

    /// Page rendering error
    #[error("Render error: {0}")]
    Render(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GramforgeError {
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

    /// Creates a Session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    /// Creates a Document error
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document(message.into())
    }

    /// Creates a Validation fault
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Customize fault
    pub fn customize(message: impl Into<String>) -> Self {
        Self::Customize(message.into())
    }

    /// Creates an Import fault
    pub fn import(message: impl Into<String>) -> Self {
        Self::Import(message.into())
    }

    /// Creates an Archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive(message.into())
    }

    /// Creates a Render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation fault
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a customization fault
    pub fn is_customize(&self) -> bool {
        matches!(self, Self::Customize(_))
    }
}

impl From<std::io::Error> for GramforgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GramforgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GramforgeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for GramforgeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (transitional, used at binary edges)
impl From<anyhow::Error> for GramforgeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, GramforgeError>`.
pub type Result<T> = std::result::Result<T, GramforgeError>;
