// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the write path. Messages carry the `store:` prefix.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store: invalid item name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("store: cannot create item directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("store: cannot remove stale item {path:?}: {source}")]
    RemoveStale { path: PathBuf, source: std::io::Error },

    #[error("store: read from upload stream failed: {source}")]
    Read { source: std::io::Error },

    #[error("store: cannot write chunk {path:?}: {source}")]
    WriteChunk { path: PathBuf, source: std::io::Error },

    #[error("store: cannot write length metadata {path:?}: {source}")]
    WriteLength { path: PathBuf, source: std::io::Error },
}

/// Failures of the read path. Messages carry the `retrieve:` prefix.
#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error("retrieve: invalid item name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("retrieve: item {path:?} not found")]
    NotFound { path: PathBuf },

    #[error("retrieve: cannot open chunk {path:?}: {source}")]
    OpenChunk { path: PathBuf, source: std::io::Error },

    #[error("retrieve: cannot read chunk {path:?}: {source}")]
    ReadChunk { path: PathBuf, source: std::io::Error },

    #[error("retrieve: bad length metadata {path:?}: {reason}")]
    Length { path: PathBuf, reason: String },
}

impl RetrieveError {
    /// True when nothing was ever stored under the requested name.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RetrieveError::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
