//! Error types shared by the listing reader, tree, cache and query layers

use std::path::PathBuf;

/// Every failure listdu can report. All variants propagate up to the CLI,
/// which turns them into a message and a non-zero exit status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed record{}: {reason}", line.map(|l| format!(" on line {}", l)).unwrap_or_default())]
    MalformedRecord { line: Option<usize>, reason: String },

    #[error("structural conflict at '{path}': a file cannot contain other entries")]
    StructuralConflict { path: String },

    #[error("size of '{path}' exceeds the representable range")]
    Overflow { path: String },

    #[error("path not found: '{path}' (no entry named '{at_segment}')")]
    PathNotFound { path: String, at_segment: String },

    #[error("not a directory: '{path}' ('{at_segment}' is a file)")]
    NotADirectory { path: String, at_segment: String },

    #[error("corrupt cache '{}': {reason}", path.display())]
    CacheCorrupt { path: PathBuf, reason: String },

    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode cache: {0}")]
    Encode(#[from] Box<bincode::ErrorKind>),
}

impl Error {
    pub fn malformed(line: Option<usize>, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller may recover by rebuilding the tree from the listing.
    pub fn is_cache_corrupt(&self) -> bool {
        matches!(self, Error::CacheCorrupt { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
