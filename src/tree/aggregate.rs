//! Memoized aggregate sizes
//!
//! Directory sizes are computed on first request with an iterative
//! post-order walk and cached in the node. `aggregate` fills every cache up
//! front, splitting the root's subtrees across a rayon pool.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

use super::node::{NodeId, NodeKind};
use super::store::Tree;

impl Tree {
    /// Total size of a node: its own size for a file, the sum of its
    /// children for a directory. Directory results are cached, so calling
    /// this again returns the same value without recomputation.
    pub fn total_size(&mut self, id: NodeId) -> Result<u64> {
        if let Some(size) = self.node(id).known_size() {
            return Ok(size);
        }

        let sizes = self.compute_sizes(id)?;
        let mut total = 0;
        for (dir, size) in sizes {
            self.set_cached_size(dir, size);
            if dir == id {
                total = size;
            }
        }
        Ok(total)
    }

    /// Compute and cache the size of every directory.
    ///
    /// `workers` follows the CLI convention: 0 uses rayon's global pool,
    /// 1 stays on the current thread, N builds a pool of N threads.
    pub fn aggregate(&mut self, workers: usize) -> Result<u64> {
        let root = self.root();
        let pending: Vec<NodeId> = self
            .children(root)
            .filter(|&child| self.node(child).known_size().is_none())
            .collect();

        if workers == 1 || pending.len() < 2 {
            return self.total_size(root);
        }

        debug!(subtrees = pending.len(), workers, "aggregating subtrees in parallel");
        let tree = &*self;
        let compute = || -> Vec<Result<Vec<(NodeId, u64)>>> {
            pending.par_iter().map(|&id| tree.compute_sizes(id)).collect()
        };
        let results = if workers == 0 {
            compute()
        } else {
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(compute),
                // Fall back to rayon's global pool if custom pool creation fails
                Err(_) => compute(),
            }
        };

        for result in results {
            for (dir, size) in result? {
                self.set_cached_size(dir, size);
            }
        }
        self.total_size(root)
    }

    /// Sizes of every uncached directory in the subtree at `id`, children
    /// before parents. Read-only, so disjoint subtrees can run in parallel.
    fn compute_sizes(&self, id: NodeId) -> Result<Vec<(NodeId, u64)>> {
        let mut computed: HashMap<NodeId, u64> = HashMap::new();
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];

        while let Some((current, expanded)) = stack.pop() {
            let node = self.node(current);
            if expanded {
                let mut total: u64 = 0;
                for child in node.child_ids() {
                    let size = match self.node(child).known_size() {
                        Some(size) => size,
                        None => computed[&child],
                    };
                    total = total.checked_add(size).ok_or_else(|| Error::Overflow {
                        path: self.path_of(current),
                    })?;
                }
                computed.insert(current, total);
                order.push((current, total));
            } else if node.known_size().is_none() {
                stack.push((current, true));
                stack.extend(
                    node.child_ids()
                        .filter(|&child| self.node(child).known_size().is_none())
                        .map(|child| (child, false)),
                );
            }
        }

        Ok(order)
    }

    fn set_cached_size(&mut self, id: NodeId, size: u64) {
        if let NodeKind::Directory { cached_size, .. } = &mut self.node_mut(id).kind {
            *cached_size = Some(size);
        }
    }
}
