//! SGUI Schema
//!
//! Declarative contracts for plugin types and the values stored against them.
//!
//! # Core Concepts
//!
//! - [`SchemaDescriptor`]: Ordered inputs and outputs of a plugin type
//! - [`InputKind`]: `raw`, `object`, `file`, `dropdown`, `disabled`, lists of
//!   those, or a [`DynamicKind`] computed from earlier inputs
//! - [`FieldValue`]: Literal, path reference, or list of values

mod descriptor;
mod error;
mod kind;
mod value;

pub use descriptor::SchemaDescriptor;
pub use error::SchemaError;
pub use kind::{BaseKind, DynamicKind, EffectiveKind, InputKind, OutputSpec};
pub use value::{FieldMap, FieldValue, Literal};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
