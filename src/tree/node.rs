//! Node types stored in the tree arena

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// What a record declares its path to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File { size: u64 },
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File {
        size: u64,
    },
    Directory {
        /// Children keyed by lower-cased name.
        children: BTreeMap<String, NodeId>,
        /// Aggregate size, `None` until computed.
        cached_size: Option<u64>,
    },
}

impl NodeKind {
    pub(crate) fn empty_dir() -> Self {
        NodeKind::Directory {
            children: BTreeMap::new(),
            cached_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    /// Set once a record targeted this path directly.
    pub(crate) explicit: bool,
}

impl Node {
    pub(crate) fn new(name: String, parent: Option<NodeId>, kind: NodeKind, explicit: bool) -> Self {
        Self {
            name,
            parent,
            kind,
            explicit,
        }
    }

    /// Display name (original casing). Empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Size if it is already known without computation.
    pub fn known_size(&self) -> Option<u64> {
        match self.kind {
            NodeKind::File { size } => Some(size),
            NodeKind::Directory { cached_size, .. } => cached_size,
        }
    }

    pub(crate) fn children(&self) -> Option<&BTreeMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Directory { children, .. } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    pub(crate) fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children().into_iter().flat_map(|c| c.values().copied())
    }
}
