//! listdu - disk usage reports from flat file listings

pub mod cache;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod output;
pub mod path_utils;
pub mod query;
pub mod stats;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cache::{CacheConfig, CorruptPolicy, Loaded, TreeCache, TreeOrigin, load_tree};
pub use error::{Error, Result};
pub use listing::{Record, read_listing};
pub use output::{OutputConfig, UsageFormatter, print_json};
pub use query::{DiskUsage, ListEntry, UsageRow, disk_usage, disk_usage_at, list};
pub use stats::{ListingStats, print_stats};
pub use tree::{EntryKind, NodeId, Tree, TreeBuilder, build_tree};
