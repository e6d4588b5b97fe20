//! Directory tree built from a flat listing
//!
//! - `Tree`: arena of nodes with insertion, lookup and path reconstruction
//! - `TreeBuilder`: applies validated listing records to a tree
//! - aggregate sizes are memoized per directory (see `Tree::total_size`)

mod aggregate;
mod builder;
mod node;
mod store;

pub use builder::{TreeBuilder, build_tree};
pub use node::{EntryKind, Node, NodeId, NodeKind};
pub use store::Tree;
