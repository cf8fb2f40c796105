//! Engine error types

use crate::plugin::PluginError;
use crate::runner::RunState;
use sgui_namespace::{NamespaceError, NodePath};
use sgui_schema::SchemaError;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Which plugin list a schema index points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    /// Object types
    Object,
    /// Function types
    Function,
}

impl Display for PluginKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Function => f.write_str("function"),
        }
    }
}

/// Errors from registration, resolution and execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Referenced path does not exist
    #[error("broken reference: {0} does not exist")]
    BrokenReference(NodePath),

    /// Referenced path is a folder
    #[error("{0} is a folder, not an object")]
    ReferencedFolder(NodePath),

    /// Referenced object has the wrong type
    #[error("{path} is a {found} object, expected {expected}")]
    TypeMismatch {
        path: NodePath,
        expected: String,
        found: String,
    },

    /// Object references loop back on themselves
    #[error("cyclic reference: {}", render_cycle(.0))]
    CyclicReference(Vec<NodePath>),

    /// Reference chain deeper than the configured limit
    #[error("reference chain deeper than {0} levels")]
    DepthExceeded(usize),

    /// Declared input has no value in the binding
    #[error("binding has no value for input '{0}'")]
    MissingField(String),

    /// Value does not fit its declared kind
    #[error(transparent)]
    Shape(#[from] SchemaError),

    /// Schema index not registered
    #[error("{kind} schema index {index} is out of range ({count} registered)")]
    SchemaIndexOutOfRange {
        kind: PluginKind,
        index: usize,
        count: usize,
    },

    /// Plugin type name already registered
    #[error("{kind} type '{name}' is already registered")]
    DuplicateType { kind: PluginKind, name: String },

    /// Plugin type name not registered
    #[error("no {kind} type named '{name}'")]
    UnknownType { kind: PluginKind, name: String },

    /// Plugin descriptor failed validation
    #[error("invalid schema for '{type_name}': {source}")]
    InvalidSchema {
        type_name: String,
        #[source]
        source: SchemaError,
    },

    /// Plugin construct or execute routine failed
    #[error("'{type_name}' failed: {source}")]
    PluginExecution {
        type_name: String,
        #[source]
        source: PluginError,
    },

    /// Function declared a destination but produced nothing for it
    #[error("function did not produce output '{0}'")]
    MissingOutput(String),

    /// Produced fields do not fit the output type
    #[error("output '{output}' does not fit its type: {source}")]
    InvalidOutput {
        output: String,
        #[source]
        source: SchemaError,
    },

    /// Functions kept queueing executions past the configured limit
    #[error("more than {0} follow-up executions in one run")]
    FollowUpLimit(usize),

    /// Run state change not permitted
    #[error("illegal run state transition {from:?} -> {to:?}")]
    IllegalTransition { from: RunState, to: RunState },

    /// Writing outputs into the namespace failed
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
}

impl EngineError {
    /// Check if this error came from following a reference
    ///
    /// These are recoverable during form-save: the user fixes the field.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Self::BrokenReference(_)
                | Self::ReferencedFolder(_)
                | Self::TypeMismatch { .. }
                | Self::CyclicReference(_)
                | Self::DepthExceeded(_)
        )
    }
}

fn render_cycle(cycle: &[NodePath]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
