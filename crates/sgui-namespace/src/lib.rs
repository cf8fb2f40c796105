//! SGUI Namespace
//!
//! Path-addressed, insertion-ordered trees of folders and entities.
//!
//! # Core Concepts
//!
//! - [`NodePath`]: Separator-delimited address such as `\Inputs\X`
//! - [`Namespace<B>`]: Tree of [`Folder`]s holding leaves of type `B`
//! - [`NamespaceError`]: Failures shared by every tree operation
//!
//! # Example
//!
//! ```rust
//! use sgui_namespace::{Namespace, Node, NodePath};
//!
//! let mut ns = Namespace::new();
//! let path: NodePath = "\\Inputs\\X".parse().unwrap();
//! ns.set(&path, Node::Leaf(5)).unwrap();
//! assert_eq!(ns.binding(&path).unwrap(), &5);
//! ```

mod error;
mod path;
mod tree;

pub use error::NamespaceError;
pub use path::{validate_name, NodePath, PathError, SEPARATOR};
pub use tree::{EntryKind, Folder, Namespace, Node};

/// Common imports
pub mod prelude {
    pub use crate::{EntryKind, Folder, Namespace, NamespaceError, Node, NodePath};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
