//! SGUI Core
//!
//! The editing session that ties the namespaces, plugin registry and file
//! persistence together, plus the bundled demo plugins.
//!
//! # Core Concepts
//!
//! - [`Workspace`]: Owns both namespaces and validates every form save
//! - [`WorkspaceConfig`]: Resolution depth, save verification and file format
//! - [`SguiError`]: Aggregates the errors of every layer
//! - [`demo`]: `Debug`, `AddNumbers` and `Plot` plugin types
//!
//! # Example
//!
//! ```rust
//! use sgui_core::{demo, Workspace};
//! use sgui_engine::{Destinations, HeadlessHost};
//! use sgui_namespace::NodePath;
//! use sgui_schema::{FieldMap, FieldValue};
//! use std::sync::Arc;
//!
//! let host = HeadlessHost::new();
//! let mut ws = Workspace::new(Arc::new(demo::demo_registry().unwrap()));
//!
//! let x: NodePath = "\\Inputs\\X".parse().unwrap();
//! let mut value = FieldMap::new();
//! value.insert("Value".into(), FieldValue::text("5"));
//! ws.create_object(&host, &x, 0, value).unwrap();
//!
//! let mut inputs = FieldMap::new();
//! inputs.insert("Value 1".into(), FieldValue::path(x.clone()));
//! inputs.insert("Value 2".into(), FieldValue::text("7"));
//! let mut outputs = Destinations::new();
//! outputs.insert("Result".into(), Some("\\Z".parse().unwrap()));
//! let add: NodePath = "\\Add".parse().unwrap();
//! ws.create_function(&host, &add, 0, inputs, outputs).unwrap();
//!
//! ws.execute_function(&host, &add).unwrap();
//! let z = ws.materialize_object(&"\\Z".parse().unwrap()).unwrap();
//! assert_eq!(z.as_text(), Some("12"));
//! ```

mod config;
pub mod demo;
mod error;
mod workspace;

pub use config::WorkspaceConfig;
pub use error::{Result, SguiError};
pub use workspace::{Workspace, INVALID_INPUT_TITLE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
