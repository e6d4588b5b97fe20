//! TreeBuilder - turns listing records into a tree

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::listing::Record;
use crate::path_utils::split_path;
use crate::stats::{ListingStats, StatsCollector};

use super::node::{EntryKind, NodeId};
use super::store::Tree;

/// Incremental tree construction from records in any order.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: Tree,
    stats: StatsCollector,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one record and apply it to the tree.
    pub fn insert(&mut self, record: &Record) -> Result<NodeId> {
        let kind = record.entry_kind()?;
        let segments = split_path(&record.path);
        let id = self
            .tree
            .insert(&segments, kind)
            .map_err(|e| attach_line(e, record.line))?;

        match kind {
            EntryKind::File { size } => self.stats.record_file(size),
            EntryKind::Directory => self.stats.record_directory(),
        }
        Ok(id)
    }

    pub fn extend<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.insert(record)?;
        }
        Ok(())
    }

    pub fn finish(self) -> (Tree, ListingStats) {
        (self.tree, self.stats.finalize())
    }
}

/// Build a tree from a complete listing.
///
/// Records are applied in sorted path order, which keeps insertion walking
/// the same ancestors back to back. The resulting tree does not depend on
/// the order of `records` (apart from duplicate paths, where the later
/// record wins).
pub fn build_tree(records: &[Record]) -> Result<(Tree, ListingStats)> {
    info!(records = records.len(), "building tree from listing");
    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by_cached_key(|r| r.path.to_lowercase());

    let mut builder = TreeBuilder::new();
    builder.extend(ordered)?;
    let (tree, stats) = builder.finish();
    debug!(nodes = tree.len(), "tree built");
    Ok((tree, stats))
}

fn attach_line(err: Error, line: Option<usize>) -> Error {
    match err {
        Error::MalformedRecord { line: None, reason } => Error::MalformedRecord { line, reason },
        other => other,
    }
}
