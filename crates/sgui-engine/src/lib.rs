//! SGUI Engine
//!
//! Plugin registry, reference resolution and function execution.
//!
//! # Core Concepts
//!
//! - [`Registry`]: Object and function types addressed by schema index
//! - [`ObjectBinding`] / [`FunctionBinding`]: Saved plugin instances
//! - [`Resolver`]: Follows path references and materializes objects
//! - [`Executor`]: Runs one function binding, all-or-nothing
//! - [`BatchRunner`]: Runs every function binding in order
//! - [`Host`]: Notifications, drawing surfaces and console for plugins
//!
//! # Example
//!
//! ```rust
//! use sgui_engine::{ObjectBinding, ObjectNamespace, Registry, Resolver};
//! use sgui_namespace::{Node, NodePath};
//!
//! let registry = Registry::new();
//! let mut objects = ObjectNamespace::new();
//! let x: NodePath = "\\Inputs\\X".parse().unwrap();
//! objects.set(&x, Node::Leaf(ObjectBinding::string("5"))).unwrap();
//!
//! let mut resolver = Resolver::new(&registry, &objects);
//! assert_eq!(resolver.resolve_text(&x).unwrap(), "5");
//! ```

mod binding;
mod error;
mod execute;
mod host;
mod object;
mod plugin;
mod registry;
mod resolve;
mod resolved;
mod runner;

pub use binding::{FunctionBinding, FunctionNamespace, ObjectBinding, ObjectNamespace};
pub use error::{EngineError, PluginKind};
pub use execute::{ExecutionReport, Executor};
pub use host::{DrawingSurface, HeadlessHost, Host, RecordedSurface, Series, SurfaceHandle};
pub use object::{RuntimeObject, StringObject, STRING_INDEX, STRING_TYPE};
pub use plugin::{
    Destinations, ExecutionContext, FollowUp, FunctionOutputs, FunctionType, ObjectType, PluginError, StringType,
};
pub use registry::{RegisteredFunction, RegisteredObject, Registry};
pub use resolve::{reference_cycle, Resolver, DEFAULT_MAX_DEPTH};
pub use resolved::{ResolvedInputs, ResolvedValue};
pub use runner::{
    allowed_transitions, validate_transition, BatchAborted, BatchReport, BatchRunner, RunEntry, RunState,
    DEFAULT_MAX_FOLLOW_UPS,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
