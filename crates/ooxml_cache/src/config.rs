//! Cache configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CacheError, PathCase};

/// File name looked up by [`CacheConfig::discover`].
pub const CONFIG_FILE: &str = ".ooxml-cache.json";

/// Configuration for a [`FileCache`](crate::FileCache).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheConfig {
    /// Base directory for cache roots.
    ///
    /// Falls back to the platform cache directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_root: Option<PathBuf>,

    /// How cache paths are compared.
    #[serde(default)]
    pub path_case: PathCase,
}

impl CacheConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a JSON file.
    ///
    /// A relative `storageRoot` is resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CacheError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_json(&content)?;

        if let Some(root) = config.storage_root.take() {
            config.storage_root = Some(match path.parent() {
                Some(parent) if root.is_relative() => parent.join(root),
                _ => root,
            });
        }

        Ok(config)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, CacheError> {
        serde_json::from_str(json)
            .map_err(|e| CacheError::config(format!("Invalid config: {}", e)))
    }

    /// Looks for [`CONFIG_FILE`] in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let candidate = dir.as_ref().join(CONFIG_FILE);
        if candidate.is_file() {
            debug!("Found config at {}", candidate.display());
            Some(candidate)
        } else {
            None
        }
    }

    /// Returns the storage root, falling back to the platform cache directory.
    pub fn resolve_storage_root(&self) -> Result<PathBuf, CacheError> {
        match &self.storage_root {
            Some(root) => Ok(root.clone()),
            None => dirs::cache_dir().ok_or(CacheError::DirResolutionFailed),
        }
    }
}
