//! Persisted tree cache
//!
//! Building a tree from a large listing is the slow part of a query, so the
//! built tree (aggregates included) is stored next to the listing as
//! `<stem>_tree.cache` and reused until the listing changes. In a shared
//! cache directory the name also carries a hash of the listing's path.

mod format;

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::listing::read_listing;
use crate::stats::ListingStats;
use crate::tree::{Tree, build_tree};

pub use format::{CacheBody, FORMAT_VERSION, MAGIC, SourceFingerprint, canonical_path, decode, encode};

/// Suffix appended to the listing's file stem to name its cache.
pub const CACHE_SUFFIX: &str = "_tree.cache";

/// What to do when an existing cache cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Log a warning and rebuild from the listing
    #[default]
    Rebuild,
    /// Return the `CacheCorrupt` error
    Abort,
}

/// Configuration for cache lookup and persistence.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Read and write the cache at all
    pub enabled: bool,
    /// Directory for cache files; `None` keeps them next to the listing
    pub cache_dir: Option<PathBuf>,
    /// Ignore an existing cache and rebuild
    pub force_rebuild: bool,
    pub corrupt_policy: CorruptPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: None,
            force_rebuild: false,
            corrupt_policy: CorruptPolicy::Rebuild,
        }
    }
}

/// Where a loaded tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOrigin {
    Cache,
    Built,
}

#[derive(Debug)]
pub struct Loaded {
    pub tree: Tree,
    pub stats: ListingStats,
    pub origin: TreeOrigin,
}

/// Load the tree for a listing file, building and caching it when needed.
/// Fresh builds have every directory aggregate computed before they are
/// stored, using `workers` as in `Tree::aggregate`.
pub fn load_tree(listing: &Path, config: CacheConfig, workers: usize) -> Result<Loaded> {
    TreeCache::for_listing(listing, config).load_or_build(|| {
        let records = read_listing(listing)?;
        let (mut tree, stats) = build_tree(&records)?;
        let total = tree.aggregate(workers)?;
        info!(
            items = stats.records,
            files = stats.files,
            directories = stats.directories,
            total_bytes = total,
            "tree built"
        );
        Ok((tree, stats))
    })
}

/// Cache file location for a listing.
///
/// Next to the listing the stem alone is unique. Inside `cache_dir`,
/// listings from different directories may share a stem, so the name
/// includes a hash of the canonical listing path.
pub fn cache_path_for(listing: &Path, cache_dir: Option<&Path>) -> PathBuf {
    let stem = listing
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "listing".to_string());
    match cache_dir {
        Some(dir) => {
            let mut hasher = DefaultHasher::new();
            canonical_path(listing).hash(&mut hasher);
            dir.join(format!("{}-{:016x}{}", stem, hasher.finish(), CACHE_SUFFIX))
        }
        None => listing.with_file_name(format!("{}{}", stem, CACHE_SUFFIX)),
    }
}

/// The cache belonging to one listing file.
pub struct TreeCache {
    listing: PathBuf,
    path: PathBuf,
    config: CacheConfig,
}

impl TreeCache {
    pub fn for_listing(listing: &Path, config: CacheConfig) -> Self {
        let path = cache_path_for(listing, config.cache_dir.as_deref());
        Self {
            listing: listing.to_path_buf(),
            path,
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache file. `Ok(None)` when there is none.
    pub fn load(&self) -> Result<Option<CacheBody>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(&self.path, e)),
        };
        decode(&bytes, &self.path).map(Some)
    }

    /// Write the cache through a uniquely named temporary sibling so
    /// readers never see a partial file. The temporary file is removed if
    /// anything fails.
    pub fn store(&self, body: &CacheBody) -> Result<()> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                parent
            }
            None => Path::new("."),
        };
        let bytes = encode(body)?;
        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
        tmp.write_all(&bytes).map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io(&self.path, e.error))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "cache written");
        Ok(())
    }

    /// Return the cached tree when it is present, intact and current;
    /// otherwise run `build`, persist its result and return it.
    pub fn load_or_build<F>(&self, build: F) -> Result<Loaded>
    where
        F: FnOnce() -> Result<(Tree, ListingStats)>,
    {
        let fingerprint = SourceFingerprint::of(&self.listing).ok();

        if self.config.enabled && !self.config.force_rebuild {
            if let Some(loaded) = self.try_load(fingerprint.as_ref())? {
                return Ok(loaded);
            }
        }

        info!(listing = %self.listing.display(), "loading from listing");
        let (tree, stats) = build()?;

        if self.config.enabled {
            let source = match fingerprint {
                Some(fingerprint) => fingerprint,
                None => SourceFingerprint::of(&self.listing)?,
            };
            let body = CacheBody {
                source,
                built_at: Utc::now(),
                stats,
                tree,
            };
            info!(path = %self.path.display(), "saving tree");
            self.store(&body)?;
            return Ok(Loaded {
                tree: body.tree,
                stats: body.stats,
                origin: TreeOrigin::Built,
            });
        }

        Ok(Loaded {
            tree,
            stats,
            origin: TreeOrigin::Built,
        })
    }

    fn try_load(&self, fingerprint: Option<&SourceFingerprint>) -> Result<Option<Loaded>> {
        match self.load() {
            Ok(Some(body)) => {
                let stale = match fingerprint {
                    Some(current) => *current != body.source,
                    None => body.source.path != canonical_path(&self.listing),
                };
                if stale {
                    info!(path = %self.path.display(), "listing changed since the cache was written");
                    return Ok(None);
                }
                info!(
                    path = %self.path.display(),
                    built_at = %body.built_at.to_rfc3339(),
                    "loading cached tree"
                );
                Ok(Some(Loaded {
                    tree: body.tree,
                    stats: body.stats,
                    origin: TreeOrigin::Cache,
                }))
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no cached tree");
                Ok(None)
            }
            Err(e) if e.is_cache_corrupt() && self.config.corrupt_policy == CorruptPolicy::Rebuild => {
                warn!(error = %e, "ignoring unreadable cache");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
