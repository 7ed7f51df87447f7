//! On-disk token cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use inbox_status_oauth::Token;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::StoreError;

/// Mode for the cache directory when it has to be created.
#[cfg(unix)]
const DIR_MODE: u32 = 0o700;

/// Mode for the cache file.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Token cache at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store for `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached token.
    ///
    /// Never creates the file.
    ///
    /// # Errors
    ///
    /// [`StoreError::Missing`] if there is no cache file,
    /// [`StoreError::Corrupt`] if it does not decode as a token, and
    /// [`StoreError::Io`] if it exists but cannot be read.
    pub async fn load(&self) -> Result<Token, StoreError> {
        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let token = serde_json::from_slice(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!("Loaded cached token from {}", self.path.display());
        Ok(token)
    }

    /// Writes `token`, replacing any previous cache content.
    ///
    /// The parent directory is created owner-only when missing, and the file
    /// itself is restricted to the owner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory or file cannot be written.
    pub async fn save(&self, token: &Token) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Self::ensure_dir(dir).await?;
        }

        let data = serde_json::to_vec_pretty(token)
            .map_err(|e| io_error(&self.path, std::io::Error::other(e)))?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;

        // A pre-existing file keeps its old mode on open; tighten it.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(FILE_MODE))
                .await
                .map_err(|e| io_error(&self.path, e))?;
        }

        file.write_all(&data)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        file.flush().await.map_err(|e| io_error(&self.path, e))?;

        info!("Token cached at {}", self.path.display());
        Ok(())
    }

    async fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
        if fs::try_exists(dir).await.unwrap_or(false) {
            return Ok(());
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIR_MODE);
        builder.create(dir).await.map_err(|e| io_error(dir, e))?;
        debug!("Created token directory {}", dir.display());
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
