//! Run configuration assembled by the CLI

use std::path::PathBuf;

use crate::cache::CacheConfig;

/// Environment variable naming a directory for cache files.
pub const CACHE_DIR_ENV: &str = "LISTDU_CACHE_DIR";

/// What to query once the tree is available.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Path inside the listing to report on
    pub path: String,
    /// Print a size listing instead of the usage table
    pub list: bool,
    /// Descend into subdirectories when listing
    pub recursive: bool,
    /// Number of parallel workers for size aggregation.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            list: false,
            recursive: false,
            parallel_workers: 0,
        }
    }
}

/// Cache directory from the command line, falling back to `LISTDU_CACHE_DIR`.
pub fn resolve_cache_dir(cli_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(dir) = cli_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Some(dir);
    }
    std::env::var_os(CACHE_DIR_ENV)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
}

/// Apply the cache directory resolution to a cache configuration.
pub fn with_cache_dir(mut config: CacheConfig, cli_dir: Option<PathBuf>) -> CacheConfig {
    config.cache_dir = resolve_cache_dir(cli_dir);
    config
}
