// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Write path: split a byte stream into fixed-size chunk files.
//!
//! Storing is a destructive overwrite. If the item directory already exists
//! it is removed and created again (one retry only), so no chunk of an
//! earlier upload survives. Every chunk file is exactly `chunk_size` bytes;
//! the last one is zero-padded.
//!
//! Nothing here locks the item. Two stores, or a store and a retrieve, on the
//! same name at the same time can interleave and leave a mixed chunk run.
//! Callers that need that must serialise access per name themselves.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::StoreError;
use crate::storage::layout::{self, UploadRoot, LENGTH_FILE};

/// Outcome of a successful [`ChunkedStore::store`].
#[derive(Debug, Clone)]
pub struct StoredItem {
    /// Item directory that now holds the chunks.
    pub path: PathBuf,
    /// Number of chunk files written.
    pub chunks: usize,
    /// Bytes consumed from the stream (before padding).
    pub bytes: u64,
}

/// Persists byte streams as chunk files under an [`UploadRoot`].
#[derive(Debug, Clone)]
pub struct ChunkedStore {
    root: UploadRoot,
    chunk_size: usize,
    record_length: bool,
}

impl ChunkedStore {
    pub fn new(root: UploadRoot, storage: &StorageConfig) -> Self {
        Self {
            root,
            chunk_size: storage.chunk_size,
            record_length: storage.record_length,
        }
    }

    pub fn root(&self) -> &UploadRoot {
        &self.root
    }

    /// Store `stream` as item `name`, replacing any previous item of that name.
    pub fn store<R: Read>(&self, name: &str, stream: R) -> Result<StoredItem, StoreError> {
        let item_dir = self.root.item_dir(name).map_err(|reason| StoreError::InvalidName {
            name: name.to_string(),
            reason,
        })?;
        self.store_at(&item_dir, stream)
    }

    /// Store `stream` into `item_dir` directly. The directory is created
    /// (or recreated) here; its parent must exist.
    pub fn store_at<R: Read>(&self, item_dir: &Path, mut stream: R) -> Result<StoredItem, StoreError> {
        create_item_dir(item_dir)?;

        let mut index = 0;
        let mut total: u64 = 0;
        loop {
            let mut buf = vec![0u8; self.chunk_size];
            let n = read_up_to(&mut stream, &mut buf).map_err(|source| StoreError::Read { source })?;
            if n == 0 {
                break;
            }

            let path = layout::chunk_path(item_dir, index);
            write_chunk(&path, &buf).map_err(|source| StoreError::WriteChunk {
                path: path.clone(),
                source,
            })?;
            debug!(chunk = ?path, filled = n, "Chunk written");

            total += n as u64;
            index += 1;
        }

        if self.record_length {
            let path = item_dir.join(LENGTH_FILE);
            write_length(&path, total)
                .map_err(|source| StoreError::WriteLength { path: path.clone(), source })?;
        }

        info!(item = ?item_dir, chunks = index, bytes = total, "Item stored");
        Ok(StoredItem { path: item_dir.to_path_buf(), chunks: index, bytes: total })
    }
}

/// Create `item_dir`; if something is already there, remove it and try once more.
fn create_item_dir(item_dir: &Path) -> Result<(), StoreError> {
    info!(item = ?item_dir, "Creating item directory");
    match std::fs::create_dir(item_dir) {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(source) => {
            return Err(StoreError::CreateDir { path: item_dir.to_path_buf(), source });
        }
    }

    warn!(item = ?item_dir, "Item already exists, removing");
    let removed = match std::fs::symlink_metadata(item_dir) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(item_dir),
        Ok(_) => std::fs::remove_file(item_dir),
        Err(e) => Err(e),
    };
    removed.map_err(|source| StoreError::RemoveStale { path: item_dir.to_path_buf(), source })?;

    std::fs::create_dir(item_dir)
        .map_err(|source| StoreError::CreateDir { path: item_dir.to_path_buf(), source })
}

fn write_chunk(path: &Path, buf: &[u8]) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(buf)?;
    f.flush()
}

fn write_length(path: &Path, len: u64) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_u64::<LittleEndian>(len)?;
    f.flush()
}

/// Read until `buf` is full or the source is exhausted. Returns the number
/// of bytes placed in `buf`; `0` means end of stream.
pub(crate) fn read_up_to<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
