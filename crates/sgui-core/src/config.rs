//! Workspace configuration

use crate::error::SguiError;
use serde::{Deserialize, Serialize};
use sgui_engine::DEFAULT_MAX_DEPTH;
use sgui_persist::SaveOptions;
use std::path::Path;

/// Session settings, loadable from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Deepest chain of object references followed before giving up
    pub max_resolution_depth: usize,
    /// Re-read every saved file and compare it to the session
    pub verify_after_save: bool,
    /// Extension appended to saved files
    pub file_extension: String,
    /// Indent saved JSON
    pub pretty_json: bool,
}

impl WorkspaceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With resolution depth limit
    #[inline]
    #[must_use]
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// With save verification on or off
    #[inline]
    #[must_use]
    pub fn with_verify_after_save(mut self, verify: bool) -> Self {
        self.verify_after_save = verify;
        self
    }

    /// With file extension (no leading dot)
    #[inline]
    #[must_use]
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// With pretty or compact JSON
    #[inline]
    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Options passed to the file writer
    #[must_use]
    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            pretty: self.pretty_json,
            verify: self.verify_after_save,
        }
    }

    /// Parse TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// [`SguiError::Config`] for invalid TOML
    pub fn from_toml_str(text: &str) -> Result<Self, SguiError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// [`SguiError::ConfigIo`] if unreadable, otherwise as [`Self::from_toml_str`]
    pub fn from_file(path: &Path) -> Result<Self, SguiError> {
        let text = std::fs::read_to_string(path).map_err(|source| SguiError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_DEPTH,
            verify_after_save: true,
            file_extension: "sgui".to_string(),
            pretty_json: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.max_resolution_depth, 64);
        assert!(config.verify_after_save);
        assert_eq!(config.file_extension, "sgui");
        assert_eq!(config.save_options(), SaveOptions::default());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = WorkspaceConfig::from_toml_str("max_resolution_depth = 8\npretty_json = false\n").unwrap();
        assert_eq!(
            config,
            WorkspaceConfig::new().with_max_resolution_depth(8).with_pretty_json(false)
        );
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            WorkspaceConfig::from_toml_str("max_resolution_depth = \"deep\""),
            Err(SguiError::Config(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = WorkspaceConfig::new().with_file_extension("json").with_verify_after_save(false);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(WorkspaceConfig::from_toml_str(&text).unwrap(), config);
    }
}
