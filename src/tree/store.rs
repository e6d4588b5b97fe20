//! Arena-backed directory tree: insertion, lookup and path reconstruction

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path_utils::{join_path, segment_key, split_path};

use super::node::{EntryKind, Node, NodeId, NodeKind};

const ROOT: NodeId = NodeId(0);

/// The whole directory tree. Owns every node; parent links are arena
/// indices, so there are no ownership cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only the root directory.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(String::new(), None, NodeKind::empty_dir(), false)],
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root, so it is empty when that is all it has.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Direct children of `id` in key order. Empty for files.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).child_ids()
    }

    /// Insert or overwrite the entry at `segments` (display case).
    ///
    /// Missing ancestors are created as implicit directories. An existing
    /// node at the final segment takes the new kind and size, except that a
    /// directory which already has children cannot become a file. Every
    /// directory on the way loses its cached aggregate.
    pub fn insert<S: AsRef<str>>(&mut self, segments: &[S], entry: EntryKind) -> Result<NodeId> {
        let Some((last, ancestors)) = segments.split_last() else {
            return match entry {
                EntryKind::Directory => {
                    self.node_mut(ROOT).explicit = true;
                    Ok(ROOT)
                }
                EntryKind::File { .. } => Err(Error::malformed(None, "the root path cannot be a file")),
            };
        };

        let mut current = ROOT;
        for segment in ancestors {
            self.invalidate(current);
            current = self.descend_or_create(current, segment.as_ref())?;
        }
        self.invalidate(current);
        self.upsert_leaf(current, last.as_ref(), entry)
    }

    /// Resolve a `/`-delimited path, comparing segments case-insensitively.
    pub fn find(&self, path: &str) -> Result<NodeId> {
        let mut current = ROOT;
        for segment in split_path(path) {
            let node = self.node(current);
            let Some(children) = node.children() else {
                return Err(Error::NotADirectory {
                    path: path.to_string(),
                    at_segment: node.name.clone(),
                });
            };
            match children.get(&segment_key(segment)) {
                Some(&child) => current = child,
                None => {
                    return Err(Error::PathNotFound {
                        path: path.to_string(),
                        at_segment: segment.to_string(),
                    });
                }
            }
        }
        Ok(current)
    }

    /// Display path of a node, `/` for the root.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                names.push(node.name.as_str());
            }
            current = node.parent;
        }
        names.reverse();
        join_path(names)
    }

    /// Check the arena invariants: a parentless directory root, in-range
    /// child ids, matching parent links on both sides, child keys equal to
    /// the folded child name, every node reachable from the root, and
    /// cached directory sizes equal to the sum of their children.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let root = self.nodes.first().ok_or("tree has no root")?;
        if root.parent.is_some() || !root.is_dir() {
            return Err("root must be a parentless directory".to_string());
        }
        let mut seen = vec![false; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            for (key, &child) in node.children().into_iter().flatten() {
                let Some(child_node) = self.nodes.get(child.index()) else {
                    return Err(format!("child '{}' of node {} is out of range", key, index));
                };
                if child_node.parent != Some(NodeId(index)) || child.index() == 0 {
                    return Err(format!("child '{}' of node {} has a broken parent link", key, index));
                }
                if *key != segment_key(&child_node.name) {
                    return Err(format!("child key '{}' does not match name '{}'", key, child_node.name));
                }
                if std::mem::replace(&mut seen[child.index()], true) {
                    return Err(format!("node {} is listed under two parents", child.index()));
                }
            }
        }
        if let Some(orphan) = seen.iter().skip(1).position(|reached| !reached) {
            return Err(format!("node {} is not attached to the tree", orphan + 1));
        }

        let mut reached = 1;
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let children: Vec<NodeId> = self.node(id).child_ids().collect();
            reached += children.len();
            stack.extend(children);
        }
        if reached != self.nodes.len() {
            return Err(format!(
                "{} nodes are not reachable from the root",
                self.nodes.len() - reached
            ));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let NodeKind::Directory { cached_size: Some(cached), .. } = &node.kind else {
                continue;
            };
            let mut sum: u64 = 0;
            for child in node.child_ids() {
                let size = self
                    .node(child)
                    .known_size()
                    .ok_or_else(|| format!("node {} is cached but child {} is not", index, child.index()))?;
                sum = sum
                    .checked_add(size)
                    .ok_or_else(|| format!("cached size of node {} overflows", index))?;
            }
            if sum != *cached {
                return Err(format!("node {} caches {} but its children sum to {}", index, cached, sum));
            }
        }
        Ok(())
    }

    fn invalidate(&mut self, id: NodeId) {
        if let NodeKind::Directory { cached_size, .. } = &mut self.node_mut(id).kind {
            *cached_size = None;
        }
    }

    fn lookup(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.node(parent).children().and_then(|c| c.get(key).copied())
    }

    fn attach(&mut self, parent: NodeId, key: String, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if let NodeKind::Directory { children, .. } = &mut self.node_mut(parent).kind {
            children.insert(key, id);
        }
        id
    }

    /// Step into the directory `segment` under `parent`, creating it when absent.
    fn descend_or_create(&mut self, parent: NodeId, segment: &str) -> Result<NodeId> {
        let key = segment_key(segment);
        match self.lookup(parent, &key) {
            Some(existing) if self.node(existing).is_dir() => Ok(existing),
            Some(existing) => Err(Error::StructuralConflict {
                path: self.path_of(existing),
            }),
            None => {
                let node = Node::new(segment.to_string(), Some(parent), NodeKind::empty_dir(), false);
                Ok(self.attach(parent, key, node))
            }
        }
    }

    fn upsert_leaf(&mut self, parent: NodeId, segment: &str, entry: EntryKind) -> Result<NodeId> {
        let key = segment_key(segment);
        let Some(id) = self.lookup(parent, &key) else {
            let kind = match entry {
                EntryKind::File { size } => NodeKind::File { size },
                EntryKind::Directory => NodeKind::empty_dir(),
            };
            let node = Node::new(segment.to_string(), Some(parent), kind, true);
            return Ok(self.attach(parent, key, node));
        };

        let has_children = self.node(id).children().is_some_and(|c| !c.is_empty());
        if has_children && matches!(entry, EntryKind::File { .. }) {
            return Err(Error::StructuralConflict {
                path: self.path_of(id),
            });
        }

        let node = self.node_mut(id);
        match (entry, &mut node.kind) {
            (EntryKind::Directory, NodeKind::Directory { .. }) => {}
            (EntryKind::Directory, kind) => *kind = NodeKind::empty_dir(),
            (EntryKind::File { size }, NodeKind::File { size: existing }) => *existing = size,
            (EntryKind::File { size }, kind) => *kind = NodeKind::File { size },
        }
        if !node.explicit {
            node.name = segment.to_string();
            node.explicit = true;
        }
        Ok(id)
    }

    /// Sorted `(path, kind)` pairs for every node, used to compare trees
    /// independent of arena layout.
    pub fn snapshot(&self) -> BTreeMap<String, NodeKind> {
        self.ids()
            .map(|id| {
                let node = self.node(id);
                let kind = match &node.kind {
                    NodeKind::File { size } => NodeKind::File { size: *size },
                    NodeKind::Directory { cached_size, .. } => NodeKind::Directory {
                        children: BTreeMap::new(),
                        cached_size: *cached_size,
                    },
                };
                (segment_key(&self.path_of(id)), kind)
            })
            .collect()
    }
}
