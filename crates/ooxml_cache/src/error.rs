//! Cache error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Tier;

/// Errors that can occur in the cache system.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to read a tier file.
    #[error("Failed to read {tier} cache file {}: {source}", path.display())]
    Read {
        tier: Tier,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a tier file.
    #[error("Failed to write {tier} cache file {}: {source}", path.display())]
    Write {
        tier: Tier,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to delete a tier file.
    #[error("Failed to delete {tier} cache file {}: {source}", path.display())]
    Delete {
        tier: Tier,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to clear or recreate the cache root.
    #[error("Failed to reset cache root {}: {source}", path.display())]
    Reset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to enumerate a tier.
    #[error("Failed to list {tier} cache files: {source}")]
    List {
        tier: Tier,
        #[source]
        source: io::Error,
    },

    /// Logical path cannot be used as a cache key.
    #[error("Invalid logical path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Document identifier has no usable file name.
    #[error("Invalid document name: '{0}'")]
    InvalidDocumentName(String),

    /// Tier name not recognised.
    #[error("Unknown cache tier: '{0}'")]
    UnknownTier(String),

    /// No platform cache directory to fall back on.
    #[error("Cache directory resolution failed")]
    DirResolutionFailed,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Creates an invalid logical path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the tier whose file operation failed, if any.
    ///
    /// Multi-tier operations stop at the first failing tier, so this tells the
    /// caller which tiers are stale.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Read { tier, .. }
            | Self::Write { tier, .. }
            | Self::Delete { tier, .. }
            | Self::List { tier, .. } => Some(*tier),
            _ => None,
        }
    }

    /// Returns the kind of the underlying I/O error, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Delete { source, .. }
            | Self::Reset { source, .. }
            | Self::List { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
