//! Durable storage for the access/refresh token pair.
//!
//! The store is an injected capability so the orchestrator and API client
//! can run against an in-memory fake in tests. There is no expiry
//! tracking: a stale token simply produces an authorization failure on
//! the next request.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::protocol::TokenPair;
use tokio::sync::Mutex;
use tracing::warn;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn set(&self, tokens: TokenPair) -> Result<()>;
    async fn get(&self) -> Result<Option<TokenPair>>;
    async fn clear(&self) -> Result<()>;
}

/// Token pair persisted as a small JSON file under the per-user data
/// directory. Survives restarts; removed only by `clear` or manual
/// intervention.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("credentials.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn set(&self, tokens: TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!(
                    "failed to create credential directory '{}'",
                    parent.display()
                )
            })?;
        }
        let body = serde_json::to_vec_pretty(&tokens)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("failed to write credentials to '{}'", self.path.display()))?;
        Ok(())
    }

    async fn get(&self) -> Result<Option<TokenPair>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read credentials from '{}'", self.path.display())
                })
            }
        };

        match serde_json::from_slice::<TokenPair>(&raw) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(err) => {
                // A corrupt file is treated as "no stored session": the
                // next login overwrites it.
                warn!(
                    path = %self.path.display(),
                    "ignoring unreadable credential file: {err}"
                );
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("failed to remove credentials at '{}'", self.path.display())
            }),
        }
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<TokenPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            inner: Mutex::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn set(&self, tokens: TokenPair) -> Result<()> {
        *self.inner.lock().await = Some(tokens);
        Ok(())
    }

    async fn get(&self) -> Result<Option<TokenPair>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().await = None;
        Ok(())
    }
}
