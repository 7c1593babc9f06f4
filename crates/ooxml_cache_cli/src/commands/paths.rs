//! Path mapping commands

use std::path::Path;

use miette::Result;
use ooxml_cache::{FileCache, Tier};
use tracing::warn;

pub fn run_path(cache: &FileCache, logical_path: &str, tier: Tier) -> Result<bool> {
    println!("{}", cache.tier_cache_path(tier, logical_path).display());
    Ok(false)
}

/// Prints `<tier> <part path>`; a path outside the cache is echoed unchanged
/// and reported through the exit status.
pub fn run_resolve(cache: &FileCache, path: &Path) -> Result<bool> {
    match cache.classify(path) {
        Some(cached) => {
            println!("{} {}", cached.tier, cached.logical_path);
            Ok(false)
        }
        None => {
            warn!("{} is not a cache file", path.display());
            println!("{}", cache.logical_path_from_cache_path(path));
            Ok(true)
        }
    }
}
