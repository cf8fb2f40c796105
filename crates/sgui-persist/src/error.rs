//! Persistence error types

use sgui_engine::PluginKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from encoding, decoding, saving or loading documents
#[derive(Debug, Error)]
pub enum PersistError {
    /// Document structure does not match the expected layout
    #[error("corrupt document at {at}: {reason}")]
    CorruptDocument { at: String, reason: String },

    /// Binding refers to a plugin type that is not registered
    #[error("{kind} schema index {index} at {at} is out of range ({count} registered)")]
    SchemaIndexOutOfRange {
        kind: PluginKind,
        index: usize,
        count: usize,
        at: String,
    },

    /// Number cannot be represented in the document
    #[error("value at {0} is not a finite number")]
    NonFiniteNumber(String),

    /// Re-reading a saved file did not reproduce the workspace
    #[error("saved file {} does not match the workspace", .0.display())]
    VerificationFailed(PathBuf),

    /// Text is not valid JSON
    #[error("invalid document syntax: {0}")]
    Syntax(#[from] serde_json::Error),

    /// File could not be read or written
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    pub(crate) fn corrupt(at: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptDocument {
            at: at.into(),
            reason: reason.into(),
        }
    }
}
