//! Saving and loading workspace files

use crate::codec::{decode_str, encode_string, Document};
use crate::error::PersistError;
use sgui_engine::{FunctionNamespace, ObjectNamespace, Registry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How a document is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Indent the JSON
    pub pretty: bool,
    /// Re-read the file after writing and compare it to the workspace
    pub verify: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            verify: true,
        }
    }
}

/// Write both namespaces to `path`
///
/// # Errors
/// - [`PersistError::Io`] if the file cannot be written
/// - [`PersistError::VerificationFailed`] if the re-read document differs
pub fn save_to_file(
    path: &Path,
    objects: &ObjectNamespace,
    functions: &FunctionNamespace,
    registry: &Registry,
    options: SaveOptions,
) -> Result<(), PersistError> {
    let text = encode_string(objects, functions, options.pretty)?;
    fs::write(path, text).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), objects = objects.len(), functions = functions.len(), "saved workspace");

    if options.verify {
        let reloaded = load_from_file(path, registry)?;
        if reloaded.objects != *objects || reloaded.functions != *functions {
            warn!(path = %path.display(), "saved file does not round-trip");
            return Err(PersistError::VerificationFailed(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Read a document from `path`
///
/// # Errors
/// [`PersistError::Io`] if the file cannot be read, otherwise as [`decode_str`]
pub fn load_from_file(path: &Path, registry: &Registry) -> Result<Document, PersistError> {
    let text = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = decode_str(&text, registry)?;
    info!(path = %path.display(), "loaded workspace");
    Ok(doc)
}

/// Append `extension` unless `path` already carries it
#[must_use]
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == extension) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}
