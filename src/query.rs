//! Disk usage queries over a built tree

use serde::Serialize;

use crate::error::Result;
use crate::path_utils::{child_path, segment_key};
use crate::tree::{NodeId, Tree};

/// One direct child in a disk usage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRow {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    /// Share of the parent's total, in percent.
    pub percentage: f64,
}

/// Disk usage of one node and its direct children, largest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsage {
    pub path: String,
    pub is_dir: bool,
    pub total_size: u64,
    pub rows: Vec<UsageRow>,
}

/// An entry of a (possibly recursive) listing of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Report the total size of `id` and each direct child with its share.
///
/// A file has no children, so its report carries only its own size.
/// Rows are ordered by size descending, then by name.
pub fn disk_usage(tree: &mut Tree, id: NodeId) -> Result<DiskUsage> {
    let total_size = tree.total_size(id)?;
    let children: Vec<NodeId> = tree.children(id).collect();

    let mut rows = Vec::with_capacity(children.len());
    for child in children {
        let size = tree.total_size(child)?;
        let node = tree.node(child);
        rows.push(UsageRow {
            name: node.name().to_string(),
            is_dir: node.is_dir(),
            size,
            percentage: percentage_of(size, total_size),
        });
    }
    rows.sort_by_cached_key(|row| (std::cmp::Reverse(row.size), segment_key(&row.name)));

    Ok(DiskUsage {
        path: tree.path_of(id),
        is_dir: tree.node(id).is_dir(),
        total_size,
        rows,
    })
}

/// Resolve `path` and report its disk usage.
pub fn disk_usage_at(tree: &mut Tree, path: &str) -> Result<DiskUsage> {
    let id = tree.find(path)?;
    disk_usage(tree, id)
}

/// `100 * part / whole`, or 0 when the whole is empty.
pub fn percentage_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// List the children of `id` in name order with their sizes. With
/// `recursive`, each directory is followed by its own descendants.
pub fn list(tree: &mut Tree, id: NodeId, recursive: bool) -> Result<Vec<ListEntry>> {
    let mut entries = Vec::new();
    let base = tree.path_of(id);
    let mut stack: Vec<(NodeId, String)> = children_reversed(tree, id, &base);

    while let Some((current, path)) = stack.pop() {
        let size = tree.total_size(current)?;
        let is_dir = tree.node(current).is_dir();
        if recursive && is_dir {
            stack.extend(children_reversed(tree, current, &path));
        }
        entries.push(ListEntry { path, is_dir, size });
    }

    Ok(entries)
}

fn children_reversed(tree: &Tree, id: NodeId, parent_path: &str) -> Vec<(NodeId, String)> {
    let mut children: Vec<(NodeId, String)> = tree
        .children(id)
        .map(|child| (child, child_path(parent_path, tree.node(child).name())))
        .collect();
    children.reverse();
    children
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::listing::Record;
    use crate::tree::build_tree;

    use super::*;

    fn scenario() -> Tree {
        let records = vec![
            Record::directory("/"),
            Record::file("/a", 300),
            Record::file("/b", 100),
            Record::directory("/c"),
            Record::file("/c/d", 600),
        ];
        build_tree(&records).unwrap().0
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_root_usage_sorted_by_size() {
        let mut tree = scenario();
        let root = tree.root();
        let usage = disk_usage(&mut tree, root).unwrap();

        assert_eq!(usage.path, "/");
        assert_eq!(usage.total_size, 1000);
        let names: Vec<&str> = usage.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        let sizes: Vec<u64> = usage.rows.iter().map(|r| r.size).collect();
        assert_eq!(sizes, vec![600, 300, 100]);
        assert!(usage.rows[0].is_dir);
        assert_close(usage.rows[0].percentage, 60.0);
        assert_close(usage.rows[1].percentage, 30.0);
        assert_close(usage.rows[2].percentage, 10.0);
    }

    #[test]
    fn test_ties_break_by_name() {
        let records = vec![
            Record::file("/zeta", 5),
            Record::file("/Alpha", 5),
            Record::file("/beta", 5),
        ];
        let mut tree = build_tree(&records).unwrap().0;
        let root = tree.root();
        let usage = disk_usage(&mut tree, root).unwrap();
        let names: Vec<&str> = usage.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_empty_directory_has_no_rows() {
        let records = vec![Record::directory("/empty")];
        let mut tree = build_tree(&records).unwrap().0;
        let usage = disk_usage_at(&mut tree, "/empty").unwrap();
        assert_eq!(usage.total_size, 0);
        assert!(usage.rows.is_empty());
    }

    #[test]
    fn test_zero_total_gives_zero_percent() {
        let records = vec![Record::file("/d/zero", 0)];
        let mut tree = build_tree(&records).unwrap().0;
        let usage = disk_usage_at(&mut tree, "/d").unwrap();
        assert_eq!(usage.rows.len(), 1);
        assert_eq!(usage.rows[0].percentage, 0.0);
    }

    #[test]
    fn test_file_usage_has_no_rows() {
        let mut tree = scenario();
        let usage = disk_usage_at(&mut tree, "/c/d").unwrap();
        assert!(!usage.is_dir);
        assert_eq!(usage.total_size, 600);
        assert!(usage.rows.is_empty());
    }

    #[test]
    fn test_usage_at_missing_path() {
        let mut tree = scenario();
        assert!(matches!(
            disk_usage_at(&mut tree, "/a/zzz"),
            Err(Error::NotADirectory { .. })
        ));
        assert!(matches!(
            disk_usage_at(&mut tree, "/zzz"),
            Err(Error::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_list_direct_and_recursive() {
        let mut tree = scenario();
        let root = tree.root();

        let direct = list(&mut tree, root, false).unwrap();
        let paths: Vec<&str> = direct.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);

        let all = list(&mut tree, root, true).unwrap();
        let paths: Vec<&str> = all.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c", "/c/d"]);
        assert_eq!(all[2].size, 600);
    }

    #[test]
    fn test_percentage_of() {
        assert_close(percentage_of(1, 4), 25.0);
        assert_eq!(percentage_of(5, 0), 0.0);
    }
}
