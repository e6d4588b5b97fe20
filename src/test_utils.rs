//! Test utilities for creating temporary listing files.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::listing::{Record, write_listing};

/// A temporary directory holding listing files.
///
/// The directory and any cache files written next to the listings are
/// removed when dropped.
pub struct TestListing {
    dir: TempDir,
}

impl TestListing {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write raw listing text to `name`.
    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, contents).expect("Failed to write listing");
        path
    }

    /// Write records to `name` in the listing format.
    pub fn write_records(&self, name: &str, records: &[Record]) -> PathBuf {
        let mut out = Vec::new();
        write_listing(records, &mut out).expect("Failed to format listing");
        self.write_raw(name, &String::from_utf8(out).expect("listing is UTF-8"))
    }

    /// Path of the cache file that belongs to listing `name`.
    pub fn cache_path(&self, name: &str) -> PathBuf {
        crate::cache::cache_path_for(&self.dir.path().join(name), None)
    }
}

impl Default for TestListing {
    fn default() -> Self {
        Self::new()
    }
}

/// A listing of `dirs` directories, each `depth` levels deep and holding
/// `files_per_dir` files. Directory records come after their contents.
pub fn synthetic_records(dirs: usize, files_per_dir: usize, depth: usize) -> Vec<Record> {
    let mut records = Vec::new();
    for d in 0..dirs {
        let mut dir = String::new();
        for level in 0..depth.max(1) {
            dir.push_str(&format!("/dir{}_{}", d, level));
        }
        for f in 0..files_per_dir {
            records.push(Record::file(
                format!("{}/file{}.dat", dir, f),
                ((d * 31 + f * 17) % 5000) as u64,
            ));
        }
        records.push(Record::directory(dir));
    }
    records
}

/// The small listing used throughout the tests:
/// `/a` 300 bytes, `/b` 100 bytes and `/c/d` 600 bytes.
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::directory("/"),
        Record::file("/a", 300),
        Record::file("/b", 100),
        Record::directory("/c"),
        Record::file("/c/d", 600),
    ]
}
