// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! On-disk layout shared by the store and retrieve paths.
//!
//! ```text
//! <root>/
//!   <item>/
//!     0        chunk_size bytes
//!     1        chunk_size bytes
//!     …        (last chunk zero-padded)
//!     length   optional, u64 LE exact byte count
//! ```
//!
//! Chunk files are named by their zero-based index in decimal, with no
//! leading zeros and no extension. The run ends at the first missing index.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, ServiceError};

/// Name of the optional exact-length metadata file inside an item directory.
pub const LENGTH_FILE: &str = "length";

/// File name of chunk `index`.
pub fn chunk_file_name(index: usize) -> String {
    index.to_string()
}

/// Full path of chunk `index` inside `item_dir`.
pub fn chunk_path(item_dir: &Path, index: usize) -> PathBuf {
    item_dir.join(chunk_file_name(index))
}

/// Number of contiguous chunk files starting at `0`.
pub fn count_chunks(item_dir: &Path) -> usize {
    let mut n = 0;
    while chunk_path(item_dir, n).is_file() {
        n += 1;
    }
    n
}

/// Checks that `name` names a single entry directly under the root.
///
/// This is path sanity only: it keeps uploads inside the root but does not
/// separate one client's items from another's.
pub fn validate_item_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty name");
    }
    if name == "." || name == ".." {
        return Err("relative directory name");
    }
    if name.contains(['/', '\\', '\0']) {
        return Err("name contains a path separator or NUL");
    }
    Ok(())
}

/// An item found under the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub name: String,
    pub chunks: usize,
}

/// The upload root directory. Created once at startup and injected into
/// both the store and the retriever.
#[derive(Debug, Clone)]
pub struct UploadRoot {
    path: PathBuf,
}

impl UploadRoot {
    /// Create the root if it does not exist yet. A pre-existing root is fine.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path).map_err(|e| {
            ServiceError::Config(format!("Cannot create upload root {path:?}: {e}"))
        })?;
        info!(root = ?path, "Upload root ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory for item `name`. The name must pass [`validate_item_name`].
    pub fn item_dir(&self, name: &str) -> std::result::Result<PathBuf, &'static str> {
        validate_item_name(name)?;
        Ok(self.path.join(name))
    }

    /// List every item directory under the root with its chunk count,
    /// sorted by name.
    pub fn scan_items(&self) -> Result<Vec<ItemSummary>> {
        let mut items = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            items.push(ItemSummary {
                name: entry.file_name().to_string_lossy().into_owned(),
                chunks: count_chunks(&entry.path()),
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_names_are_plain_decimal() {
        assert_eq!(chunk_file_name(0), "0");
        assert_eq!(chunk_file_name(7), "7");
        assert_eq!(chunk_file_name(120), "120");
        assert_eq!(chunk_path(Path::new("root/item"), 3), PathBuf::from("root/item/3"));
    }

    #[test]
    fn length_file_never_collides_with_a_chunk() {
        assert!(LENGTH_FILE.parse::<usize>().is_err());
    }

    #[test]
    fn item_names() {
        assert!(validate_item_name("report.pdf").is_ok());
        assert!(validate_item_name("with space").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(".").is_err());
        assert!(validate_item_name("..").is_err());
        assert!(validate_item_name("../etc").is_err());
        assert!(validate_item_name("a/b").is_err());
        assert!(validate_item_name("a\\b").is_err());
        assert!(validate_item_name("a\0b").is_err());
    }

    #[test]
    fn open_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root_path = dir.path().join("downloads");
        UploadRoot::open(&root_path).expect("first open");
        let root = UploadRoot::open(&root_path).expect("second open");
        assert!(root.path().is_dir());
    }

    #[test]
    fn count_stops_at_first_gap() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["0", "1", "3"] {
            std::fs::write(dir.path().join(name), b"x").expect("write");
        }
        assert_eq!(count_chunks(dir.path()), 2);
    }
}
