//! Part commands

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use miette::{IntoDiagnostic, Result, miette};
use ooxml_cache::{FileCache, Tier};
use tracing::info;

fn read_source(source: &Path) -> Result<Vec<u8>> {
    if source == Path::new("-") {
        let mut contents = Vec::new();
        io::stdin()
            .read_to_end(&mut contents)
            .map_err(|e| miette!("Failed to read part contents from stdin: {}", e))?;
        return Ok(contents);
    }

    fs::read(source).map_err(|e| miette!("Failed to read {}: {}", source.display(), e))
}

pub fn run_create(
    cache: &FileCache,
    logical_path: &str,
    source: &Path,
    empty_compare: bool,
) -> Result<bool> {
    let contents = read_source(source)?;

    if empty_compare {
        cache
            .create_cached_files_with_empty_compare(logical_path, &contents)
            .into_diagnostic()?;
        info!("Cached {} as a new part", logical_path);
    } else {
        cache
            .create_cached_files(logical_path, &contents)
            .into_diagnostic()?;
        info!("Cached {}", logical_path);
    }

    Ok(false)
}

pub fn run_update(
    cache: &FileCache,
    logical_path: &str,
    source: &Path,
    no_compare: bool,
) -> Result<bool> {
    let contents = read_source(source)?;

    if no_compare {
        cache
            .update_cached_files_no_compare(logical_path, &contents)
            .into_diagnostic()?;
        info!("Updated {} (compare baseline kept)", logical_path);
    } else {
        cache
            .update_cached_files(logical_path, &contents)
            .into_diagnostic()?;
        info!("Updated {}", logical_path);
    }

    Ok(false)
}

pub fn run_pin(cache: &FileCache, logical_path: &str, source: &Path) -> Result<bool> {
    let contents = read_source(source)?;
    cache
        .update_compare_file(logical_path, &contents)
        .into_diagnostic()?;
    info!("Pinned compare baseline of {}", logical_path);
    Ok(false)
}

pub fn run_show(cache: &FileCache, logical_path: &str, tier: Tier) -> Result<bool> {
    let contents = cache
        .get_cached_file(tier, logical_path)
        .into_diagnostic()?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&contents).into_diagnostic()?;
    stdout.flush().into_diagnostic()?;
    Ok(false)
}

pub fn run_delete(cache: &FileCache, logical_path: &str) -> Result<bool> {
    cache.delete_cached_files(logical_path).into_diagnostic()?;
    info!("Deleted {}", logical_path);
    Ok(false)
}
