//! Storage backends for cache files.
//!
//! [`FileCache`](crate::FileCache) never touches the filesystem directly; it
//! goes through a [`CacheStore`]. [`FsStore`] is the real backend and
//! [`MemoryStore`] keeps everything in a map, for tests and dry runs.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;
use walkdir::WalkDir;

/// File primitives the cache is built on.
///
/// Implementations must be safe to share between threads: operations on
/// different cache files may run concurrently.
pub trait CacheStore: Send + Sync {
    /// Reads the whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes the whole file, creating missing parent directories.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Deletes a file. Returns `Ok(false)` when there was nothing to delete.
    fn delete(&self, path: &Path) -> io::Result<bool>;

    /// Recursively removes a directory. Returns `Ok(false)` when it did not exist.
    fn remove_dir_all(&self, path: &Path) -> io::Result<bool>;

    /// Creates a directory and all of its parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Lists every file below `dir`. A missing directory yields an empty list.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Store backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

fn ignore_not_found(result: io::Result<()>) -> io::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl CacheStore for FsStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn delete(&self, path: &Path) -> io::Result<bool> {
        ignore_not_found(fs::remove_file(path))
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<bool> {
        ignore_not_found(fs::remove_dir_all(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !dir.exists() {
            debug!("Nothing to list at {}", dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Store that keeps files in memory.
///
/// Directories are implicit: a directory exists while a file below it exists,
/// or after it was created explicitly.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: Vec<PathBuf>,
}

impl MemoryState {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|dir| dir.starts_with(path))
            || self
                .files
                .keys()
                .any(|file| file != path && file.starts_with(path))
    }

    /// Fails when an ancestor of `path` is stored as a file, as the
    /// filesystem does when creating the parent directories.
    fn check_no_file_above(&self, path: &Path) -> io::Result<()> {
        match path
            .ancestors()
            .skip(1)
            .find(|ancestor| self.files.contains_key(*ancestor))
        {
            Some(file) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", file.display()),
            )),
            None => Ok(()),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a file is stored at `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.inner.lock().files.contains_key(path)
    }

    /// Returns whether `path` exists as a directory.
    pub fn dir_exists(&self, path: &Path) -> bool {
        self.inner.lock().is_dir(path)
    }

    /// Returns the number of stored files.
    pub fn len(&self) -> usize {
        self.inner.lock().files.len()
    }

    /// Returns true if no files are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().files.is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.lock().files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.inner.lock();
        state.check_no_file_above(path)?;
        if state.is_dir(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            ));
        }

        state.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn delete(&self, path: &Path) -> io::Result<bool> {
        Ok(self.inner.lock().files.remove(path).is_some())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<bool> {
        let mut state = self.inner.lock();
        let files_before = state.files.len();
        let dirs_before = state.dirs.len();

        state.files.retain(|file, _| !file.starts_with(path));
        state.dirs.retain(|dir| !dir.starts_with(path));

        Ok(state.files.len() != files_before || state.dirs.len() != dirs_before)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.inner.lock();
        if state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ));
        }
        state.check_no_file_above(path)?;
        if !state.dirs.iter().any(|dir| dir == path) {
            state.dirs.push(path.to_path_buf());
        }
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .inner
            .lock()
            .files
            .keys()
            .filter(|file| file.starts_with(dir) && file.as_path() != dir)
            .cloned()
            .collect())
    }
}
