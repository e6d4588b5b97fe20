//! Listing record type

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tree::EntryKind;

/// One entry of a flat listing: an absolute `/`-delimited path, whether it
/// is a directory, and its size (files only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub path: String,
    pub is_dir: bool,
    pub size: Option<u64>,
    /// 1-based line in the listing file, when read from one.
    #[serde(skip)]
    pub line: Option<usize>,
}

impl Record {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            size: Some(size),
            line: None,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            size: None,
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Validate the size against the declared kind. Files need a size and
    /// directories must not carry one.
    pub fn entry_kind(&self) -> Result<EntryKind> {
        match (self.is_dir, self.size) {
            (false, Some(size)) => Ok(EntryKind::File { size }),
            (true, None) => Ok(EntryKind::Directory),
            (false, None) => Err(Error::malformed(
                self.line,
                format!("file '{}' has no size", self.path),
            )),
            (true, Some(_)) => Err(Error::malformed(
                self.line,
                format!("directory '{}' has a size", self.path),
            )),
        }
    }
}
