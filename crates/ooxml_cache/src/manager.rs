//! Three-tier cache for the parts of one document.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::path::validate_logical_path;
use crate::{
    CacheConfig, CacheError, CachePaths, CacheStore, CachedPath, FsStore, PathCase, Tier,
};

/// Keeps the `normal`, `prev` and `compare` copies of every part in sync.
///
/// Operations on different logical paths are independent. Operations on the
/// same logical path must be serialized by the caller: [`update_cached_files`]
/// reads `normal` before rewriting it and holds no lock in between.
///
/// [`update_cached_files`]: FileCache::update_cached_files
#[derive(Debug)]
pub struct FileCache<S = FsStore> {
    paths: CachePaths,
    store: S,
}

impl FileCache<FsStore> {
    /// Creates a filesystem-backed cache for `document` under `storage_root`.
    ///
    /// Nothing is created on disk until the first write or [`reset`](Self::reset).
    pub fn new(storage_root: impl AsRef<Path>, document: &str) -> Result<Self, CacheError> {
        Self::with_store(storage_root, document, FsStore::new())
    }

    /// Creates a filesystem-backed cache from configuration.
    pub fn from_config(config: &CacheConfig, document: &str) -> Result<Self, CacheError> {
        let storage_root = config.resolve_storage_root()?;
        Ok(Self::new(storage_root, document)?.with_case(config.path_case))
    }
}

impl<S: CacheStore> FileCache<S> {
    /// Creates a cache on top of an arbitrary store.
    pub fn with_store(
        storage_root: impl AsRef<Path>,
        document: &str,
        store: S,
    ) -> Result<Self, CacheError> {
        let paths = CachePaths::new(storage_root, document)?;
        debug!("Cache root for {}: {}", document, paths.root().display());
        Ok(Self { paths, store })
    }

    /// Sets how cache paths are compared.
    pub fn with_case(mut self, case: PathCase) -> Self {
        self.paths = self.paths.with_case(case);
        self
    }

    /// Returns the path mapper.
    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cache root of the document.
    pub fn cache_root(&self) -> &Path {
        self.paths.root()
    }

    pub fn normal_cache_path(&self, logical_path: &str) -> PathBuf {
        self.paths.normal(logical_path)
    }

    pub fn prev_cache_path(&self, logical_path: &str) -> PathBuf {
        self.paths.prev(logical_path)
    }

    pub fn compare_cache_path(&self, logical_path: &str) -> PathBuf {
        self.paths.compare(logical_path)
    }

    pub fn tier_cache_path(&self, tier: Tier, logical_path: &str) -> PathBuf {
        self.paths.tier_path(tier, logical_path)
    }

    /// Returns the logical path of a cache file, or the input unchanged when
    /// it is not a cache file.
    pub fn logical_path_from_cache_path(&self, path: impl AsRef<Path>) -> String {
        self.paths.logical_path(path)
    }

    pub fn path_belongs_to_cache(&self, path: impl AsRef<Path>) -> bool {
        self.paths.belongs(path)
    }

    pub fn cache_path_is_normal(&self, path: impl AsRef<Path>) -> bool {
        self.paths.is_normal(path)
    }

    /// Resolves a changed path reported by a file watcher.
    pub fn classify(&self, path: impl AsRef<Path>) -> Option<CachedPath> {
        self.paths.classify(path)
    }

    /// Caches a newly discovered part; every tier gets `contents`.
    pub fn create_cached_files(
        &self,
        logical_path: &str,
        contents: &[u8],
    ) -> Result<(), CacheError> {
        validate_logical_path(logical_path)?;
        self.write_tier(Tier::Normal, logical_path, contents)?;
        self.write_tier(Tier::Prev, logical_path, contents)?;
        self.write_tier(Tier::Compare, logical_path, contents)
    }

    /// Caches a part that did not exist in the previously opened package.
    ///
    /// The empty `compare` file makes a diff show the whole part as added.
    pub fn create_cached_files_with_empty_compare(
        &self,
        logical_path: &str,
        contents: &[u8],
    ) -> Result<(), CacheError> {
        validate_logical_path(logical_path)?;
        self.write_tier(Tier::Normal, logical_path, contents)?;
        self.write_tier(Tier::Prev, logical_path, contents)?;
        self.write_tier(Tier::Compare, logical_path, &[])
    }

    /// Updates `normal` and `prev` without moving the diff baseline.
    pub fn update_cached_files_no_compare(
        &self,
        logical_path: &str,
        contents: &[u8],
    ) -> Result<(), CacheError> {
        validate_logical_path(logical_path)?;
        self.write_tier(Tier::Normal, logical_path, contents)?;
        self.write_tier(Tier::Prev, logical_path, contents)
    }

    /// Updates `normal` and `prev`; the superseded `normal` becomes the new
    /// `compare` baseline.
    pub fn update_cached_files(
        &self,
        logical_path: &str,
        contents: &[u8],
    ) -> Result<(), CacheError> {
        validate_logical_path(logical_path)?;
        // Must be read before `normal` is overwritten.
        let superseded = self.read_tier(Tier::Normal, logical_path)?;
        self.write_tier(Tier::Normal, logical_path, contents)?;
        self.write_tier(Tier::Prev, logical_path, contents)?;
        self.write_tier(Tier::Compare, logical_path, &superseded)
    }

    /// Pins the diff baseline to `contents`.
    pub fn update_compare_file(
        &self,
        logical_path: &str,
        contents: &[u8],
    ) -> Result<(), CacheError> {
        validate_logical_path(logical_path)?;
        self.write_tier(Tier::Compare, logical_path, contents)
    }

    /// Removes every tier file of a part. Missing files are ignored.
    pub fn delete_cached_files(&self, logical_path: &str) -> Result<(), CacheError> {
        validate_logical_path(logical_path)?;
        for tier in Tier::ALL {
            self.delete_tier(tier, logical_path)?;
        }
        Ok(())
    }

    pub fn get_cached_normal_file(&self, logical_path: &str) -> Result<Vec<u8>, CacheError> {
        self.get_cached_file(Tier::Normal, logical_path)
    }

    pub fn get_cached_prev_file(&self, logical_path: &str) -> Result<Vec<u8>, CacheError> {
        self.get_cached_file(Tier::Prev, logical_path)
    }

    pub fn get_cached_compare_file(&self, logical_path: &str) -> Result<Vec<u8>, CacheError> {
        self.get_cached_file(Tier::Compare, logical_path)
    }

    /// Reads one tier file of a part.
    pub fn get_cached_file(&self, tier: Tier, logical_path: &str) -> Result<Vec<u8>, CacheError> {
        validate_logical_path(logical_path)?;
        self.read_tier(tier, logical_path)
    }

    /// Lists the logical paths held in the `normal` tier, sorted.
    pub fn cached_paths(&self) -> Result<Vec<String>, CacheError> {
        let tier_root = self.paths.tier_root(Tier::Normal);
        let files = self
            .store
            .list_files(&tier_root)
            .map_err(|source| CacheError::List {
                tier: Tier::Normal,
                source,
            })?;

        let mut logical_paths: Vec<String> = files
            .iter()
            .filter_map(|file| self.paths.classify(file))
            .map(|cached| cached.logical_path)
            .collect();
        logical_paths.sort();
        Ok(logical_paths)
    }

    /// Wipes the cache root and recreates it empty.
    ///
    /// Must not run while other operations on this cache are in flight.
    pub fn reset(&self) -> Result<(), CacheError> {
        let root = self.paths.root();
        let existed = self.remove_root()?;
        self.store
            .create_dir_all(root)
            .map_err(|source| CacheError::Reset {
                path: root.to_path_buf(),
                source,
            })?;

        info!(
            "Reset cache at {} (previous contents {})",
            root.display(),
            if existed { "removed" } else { "absent" }
        );
        Ok(())
    }

    /// Removes the cache root without recreating it.
    pub fn teardown(&self) -> Result<(), CacheError> {
        if self.remove_root()? {
            info!("Removed cache at {}", self.paths.root().display());
        }
        Ok(())
    }

    fn remove_root(&self) -> Result<bool, CacheError> {
        let root = self.paths.root();
        self.store
            .remove_dir_all(root)
            .map_err(|source| CacheError::Reset {
                path: root.to_path_buf(),
                source,
            })
    }

    fn read_tier(&self, tier: Tier, logical_path: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.paths.tier_path(tier, logical_path);
        debug!("Reading {} cache file {}", tier, path.display());
        self.store
            .read(&path)
            .map_err(|source| CacheError::Read { tier, path, source })
    }

    fn write_tier(
        &self,
        tier: Tier,
        logical_path: &str,
        contents: &[u8],
    ) -> Result<(), CacheError> {
        let path = self.paths.tier_path(tier, logical_path);
        debug!(
            "Writing {} bytes to {} cache file {}",
            contents.len(),
            tier,
            path.display()
        );
        self.store
            .write(&path, contents)
            .map_err(|source| CacheError::Write { tier, path, source })
    }

    fn delete_tier(&self, tier: Tier, logical_path: &str) -> Result<(), CacheError> {
        let path = self.paths.tier_path(tier, logical_path);
        match self.store.delete(&path) {
            Ok(true) => {
                debug!("Deleted {} cache file {}", tier, path.display());
                Ok(())
            }
            Ok(false) => {
                debug!("No {} cache file to delete at {}", tier, path.display());
                Ok(())
            }
            Err(source) => Err(CacheError::Delete { tier, path, source }),
        }
    }
}
