//! Persistent token store
//!
//! The session manager only needs three operations on the bearer token:
//! read it at start, write it on login and remove it on logout. This module
//! defines that contract as [`TokenStore`] and ships a file-backed store for
//! real front ends plus an in-memory one for embedding and tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Key-value persistence for the bearer token
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored token, `Ok(None)` when nothing is stored
    async fn get_token(&self) -> Result<Option<String>>;

    /// Persist a token, replacing any previous one
    async fn set_token(&self, token: &str) -> Result<()>;

    /// Remove the stored token. Removing an absent token is not an error.
    async fn remove_token(&self) -> Result<()>;
}

// ============================================================================
// File store
// ============================================================================

/// On-disk layout of the token file
#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    token: Option<String>,
}

/// Token store backed by a small JSON file
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, file: &TokenFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(file)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        restrict_permissions(&tmp_path).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get_token(&self) -> Result<Option<String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("[storage] No token file at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(Error::storage(format!("Failed to read {:?}: {}", self.path, e))),
        };

        let file: TokenFile = serde_json::from_str(&content).map_err(|e| {
            Error::storage(format!("Token file {:?} is corrupt: {}", self.path, e))
        })?;

        Ok(file.token.filter(|t| !t.is_empty()))
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        let file = TokenFile {
            token: Some(token.to_string()),
        };
        self.write_file(&file)
            .await
            .map_err(|e| Error::storage(format!("Failed to save token: {}", e)))?;
        log::debug!("[storage] Token saved to {:?}", self.path);
        Ok(())
    }

    async fn remove_token(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                log::debug!("[storage] Token file removed: {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!("Failed to remove token: {}", e))),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

// ============================================================================
// Memory store
// ============================================================================

/// Token store that lives only as long as the process
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already stored
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get_token(&self) -> Result<Option<String>> {
        Ok(self.token.lock().await.clone())
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn remove_token(&self) -> Result<()> {
        self.token.lock().await.take();
        Ok(())
    }
}
