//! OpenDAL Operator factory for sse server storage

use anyhow::{Context, Result};
use opendal::Operator;
use sse_core::config::{expand_tilde, ServerConfig, StorageBackend};

/// Build the operator described by the server config.
///
/// The fs backend stages writes in `<data_dir>/.tmp` and renames them into
/// place, so a crash mid-write never leaves a torn index.json.
pub fn build_operator(cfg: &ServerConfig) -> Result<Operator> {
    match cfg.backend {
        StorageBackend::Fs => {
            let root = expand_tilde(&cfg.data_dir);
            let staging = root.join(".tmp");
            std::fs::create_dir_all(&staging)
                .with_context(|| format!("creating data dir: {}", root.display()))?;

            let builder = opendal::services::Fs::default()
                .root(&root.to_string_lossy())
                .atomic_write_dir(&staging.to_string_lossy());

            let op = Operator::new(builder)
                .context("creating OpenDAL fs operator")?
                .layer(opendal::layers::LoggingLayer::default())
                .finish();
            Ok(op)
        }
        StorageBackend::Memory => memory_operator(),
    }
}

/// Volatile in-process storage; state is lost on restart.
pub fn memory_operator() -> Result<Operator> {
    Ok(Operator::new(opendal::services::Memory::default())
        .context("creating OpenDAL memory operator")?
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_fs_operator_creates_data_dir() {
        let tmp = TempDir::new().unwrap();
        let cfg = ServerConfig {
            data_dir: tmp.path().join("data"),
            ..Default::default()
        };
        let op = build_operator(&cfg);
        assert!(op.is_ok(), "operator construction should succeed");
        assert!(tmp.path().join("data/.tmp").is_dir());
    }

    #[test]
    fn test_build_memory_operator() {
        let cfg = ServerConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        assert!(build_operator(&cfg).is_ok());
    }
}
