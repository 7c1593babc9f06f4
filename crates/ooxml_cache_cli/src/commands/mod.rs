//! Command implementations

pub mod parts;
pub mod paths;
pub mod session;

use miette::{IntoDiagnostic, Result, miette};
use ooxml_cache::{CacheConfig, FileCache};
use tracing::{debug, info};

use crate::cli::Cli;

/// Builds the cache selected by the global arguments.
pub fn open_cache(cli: &Cli) -> Result<FileCache> {
    let mut config = if let Some(ref path) = cli.config {
        CacheConfig::from_file(path).into_diagnostic()?
    } else {
        find_config()?
    };

    if let Some(ref root) = cli.storage_root {
        config.storage_root = Some(root.clone());
    }

    let document = cli
        .document
        .as_deref()
        .ok_or_else(|| miette!("No document given. Use --document <FILE>."))?;

    let cache = FileCache::from_config(&config, document).into_diagnostic()?;
    debug!("Using cache root {}", cache.cache_root().display());
    Ok(cache)
}

pub fn find_config() -> Result<CacheConfig> {
    if let Some(path) = CacheConfig::discover(".") {
        info!("Using config: {}", path.display());
        return CacheConfig::from_file(&path).into_diagnostic();
    }

    debug!("No config file found, using defaults");
    Ok(CacheConfig::new())
}
