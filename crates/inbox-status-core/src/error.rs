//! Error types for credential acquisition.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while building a [`crate::CredentialManager`].
#[derive(Debug, Error)]
pub enum Error {
    /// Client identity could not be established.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Token cache could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Interactive authorization failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures loading the client configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Client secret file is missing or unreadable.
    #[error("unable to read client secret file {}", path.display())]
    NotFound {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Client secret file does not describe a usable client.
    #[error("unable to parse client secret file to config: {0}")]
    Malformed(String),

    /// The platform reports no per-user configuration directory.
    #[error("unable to get user config dir")]
    NoConfigDir,
}

/// Failures reading or writing the token cache.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No cache file exists yet.
    #[error("no cached token at {}", path.display())]
    Missing {
        /// Cache path.
        path: PathBuf,
    },

    /// Cache file exists but is not a token.
    #[error("cached token at {} is corrupt", path.display())]
    Corrupt {
        /// Cache path.
        path: PathBuf,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// Cache file or its directory could not be accessed.
    #[error("unable to cache oauth token at {}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Failures of the interactive authorization flow. Never retried.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Authorization code could not be read from the user.
    #[error("unable to read authorization code")]
    InputFailed(#[source] io::Error),

    /// Token endpoint rejected the code or could not be reached.
    #[error("unable to retrieve token from web")]
    ExchangeFailed(#[source] inbox_status_oauth::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::load_client_config;

    fn render(err: Error) -> String {
        format!("{:#}", anyhow::Error::new(err))
    }

    #[test]
    fn test_missing_secret_line_names_cause_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let cause = std::fs::read(&path).unwrap_err().to_string();

        let err = Error::from(load_client_config(&path, &[]).unwrap_err());

        assert_eq!(
            render(err),
            format!("unable to read client secret file {}: {cause}", path.display())
        );
    }

    #[test]
    fn test_exchange_failure_line_names_cause_once() {
        let err = Error::from(AuthError::ExchangeFailed(
            inbox_status_oauth::Error::oauth_error("invalid_grant", "Bad Request"),
        ));

        assert_eq!(
            render(err),
            "unable to retrieve token from web: OAuth2 error: invalid_grant - Bad Request"
        );
    }
}
