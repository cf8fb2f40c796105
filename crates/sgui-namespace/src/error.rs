//! Namespace error types

use crate::path::{NodePath, PathError};
use thiserror::Error;

/// Errors from namespace operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// Nothing exists at the path
    #[error("path not found: {0}")]
    PathNotFound(NodePath),

    /// A prefix of the path is a leaf, so nothing can live beneath it
    #[error("cannot create '{path}': '{blocking}' is not a folder")]
    InvalidIntermediatePath { path: NodePath, blocking: NodePath },

    /// Target name already taken
    #[error("name conflict at {0}")]
    NameConflict(NodePath),

    /// A leaf would overwrite a folder
    #[error("a folder already exists at {0}")]
    FolderOccupied(NodePath),

    /// Only a folder may be stored at the root
    #[error("the root must be a folder")]
    RootMustBeFolder,

    /// Operation needs a named node, not the root
    #[error("operation is not valid on the root")]
    RootPath,

    /// Path names a folder where a leaf was expected
    #[error("{0} is a folder, not an entity")]
    NotABinding(NodePath),

    /// Depth limit exceeded
    #[error("{path} exceeds the maximum depth of {max}")]
    TooDeep { path: NodePath, max: usize },

    /// Destination lies inside the node being moved
    #[error("cannot move {from} into {to}")]
    CyclicMove { from: NodePath, to: NodePath },

    /// New order is not a permutation of the folder's children
    #[error("new order does not match the children of {0}")]
    ReorderMismatch(NodePath),

    /// Invalid entity name
    #[error(transparent)]
    InvalidName(#[from] PathError),
}
