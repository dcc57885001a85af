// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Read path: concatenate chunk files `0, 1, 2, …` until the first gap.
//!
//! Each chunk contributes a full `chunk_size` buffer, padding included. The
//! padding is then undone in one of two ways:
//!
//! - a `length` file is present: truncate to the recorded byte count;
//! - otherwise: strip trailing zero bytes. This loses any zero bytes the
//!   original content really ended with.
//!
//! Chunk files are read against the configured `chunk_size`, not their own
//! length. An item stored with a different chunk size comes back truncated
//! or over-padded per chunk; a warning is logged for each such chunk.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::RetrieveError;
use crate::storage::layout::{self, UploadRoot, LENGTH_FILE};
use crate::storage::store::read_up_to;

/// Rebuilds items written by [`ChunkedStore`](crate::storage::store::ChunkedStore).
#[derive(Debug, Clone)]
pub struct ChunkedRetriever {
    root: UploadRoot,
    chunk_size: usize,
}

impl ChunkedRetriever {
    pub fn new(root: UploadRoot, storage: &StorageConfig) -> Self {
        Self { root, chunk_size: storage.chunk_size }
    }

    /// Reassemble item `name`.
    pub fn retrieve(&self, name: &str) -> Result<Vec<u8>, RetrieveError> {
        let item_dir = self.root.item_dir(name).map_err(|reason| RetrieveError::InvalidName {
            name: name.to_string(),
            reason,
        })?;
        self.retrieve_at(&item_dir)
    }

    /// Reassemble the item stored in `item_dir`.
    ///
    /// A missing directory, or one without chunk `0`, is
    /// [`RetrieveError::NotFound`]. Any other failure discards what was read.
    pub fn retrieve_at(&self, item_dir: &Path) -> Result<Vec<u8>, RetrieveError> {
        let mut out = Vec::new();
        let mut index = 0;
        loop {
            let path = layout::chunk_path(item_dir, index);
            let mut file = match File::open(&path) {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::NotFound => break,
                Err(source) => return Err(RetrieveError::OpenChunk { path, source }),
            };

            let on_disk = file
                .metadata()
                .map_err(|source| RetrieveError::ReadChunk { path: path.clone(), source })?
                .len();
            if on_disk != self.chunk_size as u64 {
                warn!(chunk = ?path, on_disk, chunk_size = self.chunk_size, "Chunk size mismatch");
            }

            let mut buf = vec![0u8; self.chunk_size];
            let n = read_up_to(&mut file, &mut buf)
                .map_err(|source| RetrieveError::ReadChunk { path: path.clone(), source })?;
            debug!(chunk = ?path, filled = n, "Chunk read");

            out.extend_from_slice(&buf);
            index += 1;
        }

        if index == 0 {
            return Err(RetrieveError::NotFound { path: item_dir.to_path_buf() });
        }

        match read_length(item_dir)? {
            Some(len) => out.truncate(len.min(out.len() as u64) as usize),
            None => trim_trailing_zeros(&mut out),
        }

        info!(item = ?item_dir, chunks = index, bytes = out.len(), "Item retrieved");
        Ok(out)
    }
}

/// Read the exact byte count, if the item was stored with one.
fn read_length(item_dir: &Path) -> Result<Option<u64>, RetrieveError> {
    let path = item_dir.join(LENGTH_FILE);
    let mut file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RetrieveError::Length { path, reason: e.to_string() }),
    };
    file.read_u64::<LittleEndian>()
        .map(Some)
        .map_err(|e| RetrieveError::Length { path, reason: e.to_string() })
}

fn trim_trailing_zeros(buf: &mut Vec<u8>) {
    let end = buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    buf.truncate(end);
}
