//! SGUI Persist
//!
//! Stores the objects and functions namespaces as one JSON document.
//!
//! # Core Concepts
//!
//! - [`encode`] / [`decode`]: Namespaces to and from a JSON value
//! - [`Document`]: The decoded pair of namespaces
//! - [`save_to_file`] / [`load_from_file`]: File I/O with optional verification
//!
//! Decoding checks every schema index against the [`Registry`] before
//! anything is built, so a bad document never yields a partial workspace.
//!
//! [`Registry`]: sgui_engine::Registry

mod codec;
mod error;
mod file;

pub use codec::{
    decode, decode_str, encode, encode_string, Document, FUNCTIONS_KEY, FUNCTION_INDEX_KEY, INPUTS_KEY,
    OBJECTS_KEY, OBJECT_INDEX_KEY, OUTPUTS_KEY, PATH_KEY,
};
pub use error::PersistError;
pub use file::{load_from_file, save_to_file, with_extension, SaveOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
