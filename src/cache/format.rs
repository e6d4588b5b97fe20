//! On-disk cache format
//!
//! Layout: 8-byte magic, little-endian `u32` format version, then the
//! bincode-encoded `CacheBody`. Any mismatch is reported as `CacheCorrupt`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::ListingStats;
use crate::tree::Tree;

pub const MAGIC: &[u8; 8] = b"LISTDU\0\0";
pub const FORMAT_VERSION: u32 = 2;
const HEADER_LEN: usize = MAGIC.len() + 4;

/// Identity of the listing a cache was built from. A cache is only reused
/// for the same listing file while it keeps its length and modification
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    /// Canonical path of the listing
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(listing: &Path) -> Result<Self> {
        let meta = std::fs::metadata(listing).map_err(|e| Error::io(listing, e))?;
        Ok(Self {
            path: canonical_path(listing),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Canonical form of a listing path, or the path itself when it cannot be
/// resolved.
pub fn canonical_path(listing: &Path) -> PathBuf {
    std::fs::canonicalize(listing).unwrap_or_else(|_| listing.to_path_buf())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheBody {
    pub source: SourceFingerprint,
    pub built_at: DateTime<Utc>,
    pub stats: ListingStats,
    pub tree: Tree,
}

pub fn encode(body: &CacheBody) -> Result<Vec<u8>> {
    let payload = bincode::DefaultOptions::new().serialize(body)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode and verify cache bytes read from `path`.
pub fn decode(bytes: &[u8], path: &Path) -> Result<CacheBody> {
    let corrupt = |reason: String| Error::CacheCorrupt {
        path: path.to_path_buf(),
        reason,
    };

    if bytes.len() < HEADER_LEN || !bytes.starts_with(MAGIC) {
        return Err(corrupt("not a listdu cache file".to_string()));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[MAGIC.len()..HEADER_LEN]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "format version {} is not supported (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let payload = &bytes[HEADER_LEN..];
    let body: CacheBody = bincode::DefaultOptions::new()
        .with_limit(payload.len() as u64)
        .deserialize(payload)
        .map_err(|e| corrupt(e.to_string()))?;
    body.tree.validate().map_err(corrupt)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use crate::tree::EntryKind;

    use super::*;

    fn body() -> CacheBody {
        let mut tree = Tree::new();
        tree.insert(&["Music", "song.mp3"], EntryKind::File { size: 4096 })
            .unwrap();
        tree.insert(&["empty"], EntryKind::Directory).unwrap();
        tree.total_size(tree.root()).unwrap();
        CacheBody {
            source: SourceFingerprint {
                path: PathBuf::from("/data/index.ls"),
                len: 42,
                modified: None,
            },
            built_at: Utc::now(),
            stats: ListingStats::default(),
            tree,
        }
    }

    #[test]
    fn test_decode_restores_identical_body() {
        let original = body();
        let bytes = encode(&original).unwrap();
        assert_eq!(&bytes[..8], MAGIC);
        let decoded = decode(&bytes, Path::new("t.cache")).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut bytes = encode(&body()).unwrap();
        bytes[0] = b'X';
        let err = decode(&bytes, Path::new("t.cache")).unwrap_err();
        assert!(err.is_cache_corrupt());
    }

    #[test]
    fn test_decode_rejects_other_version() {
        let mut bytes = encode(&body()).unwrap();
        bytes[8..12].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
        let err = decode(&bytes, Path::new("t.cache")).unwrap_err();
        assert!(err.to_string().contains("format version"));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let bytes = encode(&body()).unwrap();
        let err = decode(&bytes[..bytes.len() / 2], Path::new("t.cache")).unwrap_err();
        assert!(err.is_cache_corrupt());
        assert!(decode(&bytes[..5], Path::new("t.cache")).is_err());
    }
}
