//! # ooxml_cache
//!
//! On-disk cache for the parts of an opened OOXML package.
//!
//! Every part (`word/document.xml`, `[Content_Types].xml`, ...) is kept in three
//! tiers under one cache root:
//!
//! 1. **normal**: the current contents, as last written or opened
//! 2. **prev**: the contents at the last accepted baseline
//! 3. **compare**: the contents a diff view compares `normal` against
//!
//! ## Layout
//!
//! ```text
//! <storage_root>/ooxml-viewer/cache/<file_name>/normal/<part path>
//! <storage_root>/ooxml-viewer/cache/<file_name>/prev/<part path>
//! <storage_root>/ooxml-viewer/cache/<file_name>/compare/<part path>
//! ```
//!
//! The layout is a stable contract: file watchers and diff views may read the
//! cache directly.

mod config;
mod error;
mod manager;
mod path;
mod store;

pub use config::{CONFIG_FILE, CacheConfig};
pub use error::CacheError;
pub use manager::FileCache;
pub use path::{
    CACHE_DIR_NAME, CachePaths, CachedPath, PathCase, Tier, VIEWER_DIR_NAME, validate_logical_path,
};
pub use store::{CacheStore, FsStore, MemoryStore};
