//! Top-level error type

use sgui_engine::{BatchAborted, EngineError};
use sgui_namespace::{NamespaceError, NodePath, PathError};
use sgui_persist::PersistError;
use sgui_schema::SchemaError;
use std::path::PathBuf;

/// Main SGUI error type
#[derive(Debug, thiserror::Error)]
pub enum SguiError {
    /// Malformed path
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Namespace operation failed
    #[error("namespace error: {0}")]
    Namespace(#[from] NamespaceError),

    /// Field values do not fit the schema
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Resolution or execution failed
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Save or load failed
    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),

    /// Run of all functions stopped early
    #[error("{0}")]
    Batch(#[from] Box<BatchAborted>),

    /// Function binding names an output its type does not declare
    #[error("function has no output named '{0}'")]
    UndeclaredOutput(String),

    /// Output destination cannot hold an object
    #[error("output '{output}' cannot be written to {destination}: {source}")]
    InvalidDestination {
        /// Output name
        output: String,
        /// Rejected destination
        destination: NodePath,
        /// Why the write would fail
        #[source]
        source: NamespaceError,
    },

    /// Save requested before the session has a file
    #[error("workspace has no file yet")]
    NoCurrentFile,

    /// Configuration text is invalid
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("cannot read configuration {}: {source}", path.display())]
    ConfigIo {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl SguiError {
    /// Check if the error is a broken, mistyped or cyclic reference
    #[inline]
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        match self {
            Self::Engine(err) => err.is_resolution(),
            Self::Batch(aborted) => aborted.source.is_resolution(),
            _ => false,
        }
    }

    /// Check if the error came from malformed user input rather than I/O
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Schema(_) | Self::UndeclaredOutput(_) | Self::InvalidDestination { .. }
        ) || self.is_resolution()
    }
}

/// Result alias for SGUI operations
pub type Result<T> = std::result::Result<T, SguiError>;
