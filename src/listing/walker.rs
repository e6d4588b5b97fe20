//! Local directory lister producing listing records

use std::path::Path;

use ignore::WalkBuilder;
use tracing::warn;

use crate::error::{Error, Result};
use crate::path_utils::join_path;

use super::record::Record;

/// Configuration for local listing.
#[derive(Debug, Clone, Default)]
pub struct ListerConfig {
    /// Descend into subdirectories instead of listing direct children only
    pub recursive: bool,
    /// Include entries hidden by .gitignore or dot-prefixed names
    pub show_all: bool,
}

/// List `root` as records whose paths are relative to it (`/sub/file`).
///
/// Symlinks are not followed and are left out. Entries whose metadata
/// cannot be read are skipped with a warning.
pub fn list_local(root: &Path, config: &ListerConfig) -> Result<Vec<Record>> {
    if !root.is_dir() {
        return Err(Error::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let filtered = !config.show_all;
    let walker = WalkBuilder::new(root)
        .hidden(filtered)
        .ignore(filtered)
        .git_ignore(filtered)
        .git_global(filtered)
        .git_exclude(filtered)
        .follow_links(false)
        .max_depth(if config.recursive { None } else { Some(1) })
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut records = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path = join_path(relative.iter().map(|c| c.to_string_lossy()));

        if file_type.is_dir() {
            records.push(Record::directory(path));
        } else if file_type.is_file() {
            match entry.metadata() {
                Ok(meta) => records.push(Record::file(path, meta.len())),
                Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping file without metadata"),
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("top.txt"), "12345").unwrap();
        fs::write(dir.path().join("sub/inner.txt"), "abc").unwrap();
        fs::write(dir.path().join("sub/deeper/leaf.bin"), [0u8; 10]).unwrap();
        dir
    }

    #[test]
    fn test_list_direct_children_only() {
        let dir = fixture();
        let records = list_local(dir.path(), &ListerConfig::default()).unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/sub", "/top.txt"]);
        assert!(records[0].is_dir);
        assert_eq!(records[1].size, Some(5));
    }

    #[test]
    fn test_list_recursive() {
        let dir = fixture();
        let config = ListerConfig {
            recursive: true,
            ..Default::default()
        };
        let records = list_local(dir.path(), &config).unwrap();
        let leaf = records
            .iter()
            .find(|r| r.path == "/sub/deeper/leaf.bin")
            .expect("leaf listed");
        assert_eq!(leaf.size, Some(10));
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn test_hidden_entries_need_show_all() {
        let dir = fixture();
        fs::write(dir.path().join(".hidden"), "x").unwrap();

        let records = list_local(dir.path(), &ListerConfig::default()).unwrap();
        assert!(!records.iter().any(|r| r.path == "/.hidden"));

        let config = ListerConfig {
            show_all: true,
            ..Default::default()
        };
        let records = list_local(dir.path(), &config).unwrap();
        assert!(records.iter().any(|r| r.path == "/.hidden"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let err = list_local(&dir.path().join("nope"), &ListerConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
