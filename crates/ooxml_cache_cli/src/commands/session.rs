//! Whole-cache commands

use miette::{IntoDiagnostic, Result};
use ooxml_cache::FileCache;
use tracing::info;

pub fn run_list(cache: &FileCache) -> Result<bool> {
    for logical_path in cache.cached_paths().into_diagnostic()? {
        println!("{}", logical_path);
    }
    Ok(false)
}

pub fn run_reset(cache: &FileCache) -> Result<bool> {
    cache.reset().into_diagnostic()?;
    info!("Cache cleaned");
    Ok(false)
}
