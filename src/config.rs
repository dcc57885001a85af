// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use serde::Deserialize;
use std::path::PathBuf;
use crate::error::{Result, ServiceError};

/// One mebibyte.
pub const MIB: usize = 1024 * 1024;

/// Top-level configuration. Every field has a default, so an empty TOML
/// file (or no file at all) yields the stock deployment.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Chunk storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// HTTP API configuration.
    #[serde(default)]
    pub api: ApiConfig,
}

/// HTTP API configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Port to listen on.
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Upper bound on the whole multipart upload body, in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: default_api_port(), max_upload_bytes: default_max_upload() }
    }
}

/// Where and how items are laid out on disk.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Upload root; one subdirectory per item lives under it.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Size of every chunk file in bytes. The final chunk is zero-padded.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Write an exact-length `length` file next to the chunks so reads
    /// can truncate instead of trimming trailing zero bytes.
    #[serde(default)]
    pub record_length: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: default_root(), chunk_size: default_chunk_size(), record_length: false }
    }
}

fn default_root() -> PathBuf { PathBuf::from("downloads") }
fn default_chunk_size() -> usize { MIB }
fn default_api_port() -> u16 { 8080 }
fn default_max_upload() -> usize { 64 * MIB }

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("Cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ServiceError::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.chunk_size == 0 {
            return Err(ServiceError::Config("chunk_size must be > 0".into()));
        }
        if self.storage.root.as_os_str().is_empty() {
            return Err(ServiceError::Config("root must not be empty".into()));
        }
        if self.api.max_upload_bytes == 0 {
            return Err(ServiceError::Config("max_upload_bytes must be > 0".into()));
        }
        Ok(())
    }
}
