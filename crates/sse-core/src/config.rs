use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SseError, SseResult};

/// Top-level configuration (loaded from sse.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SseConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address (default: 127.0.0.1:8000)
    pub listen: String,
    /// Root directory for docs/ and index.json
    pub data_dir: PathBuf,
    /// Storage backend: "fs" or "memory"
    pub backend: StorageBackend,
    /// Largest accepted upload request body in bytes
    pub max_upload_bytes: usize,
    /// Log level (default: info)
    pub log_level: String,
    /// Log format: "json" or "text"
    pub log_format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Fs,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the sse server
    pub server_url: String,
    /// Where the client key bundle is persisted
    pub key_file: PathBuf,
    /// HTTP request timeout
    pub timeout_secs: u64,
    /// Extracted keywords shorter than this (in chars) are dropped
    pub min_keyword_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".into(),
            data_dir: PathBuf::from("./data"),
            backend: StorageBackend::Fs,
            max_upload_bytes: 64 * 1024 * 1024,
            log_level: "info".into(),
            log_format: "text".into(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            key_file: PathBuf::from("~/.config/sse/client_keys.json"),
            timeout_secs: 10,
            min_keyword_len: 2,
        }
    }
}

impl SseConfig {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> SseResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| SseError::Config(format!("parsing {}: {e}", path.display())))
    }
}

/// Expand a leading `~/` to $HOME
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
