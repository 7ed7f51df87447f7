//! Client secret descriptor loading.
//!
//! The descriptor is the JSON file downloaded from the provider console for an
//! installed (or web) application:
//!
//! ```json
//! {"installed": {"client_id": "...", "client_secret": "...",
//!   "auth_uri": "https://accounts.google.com/o/oauth2/auth",
//!   "token_uri": "https://oauth2.googleapis.com/token",
//!   "redirect_uris": ["http://localhost"]}}
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

/// Immutable client identity and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Client identifier.
    pub client_id: String,
    /// Client secret, absent for public clients.
    pub client_secret: Option<String>,
    /// Authorization endpoint.
    pub auth_url: Url,
    /// Token endpoint.
    pub token_url: Url,
    /// Redirect URI registered for the client.
    pub redirect_uri: String,
    /// Requested scopes, in order.
    pub scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SecretDescriptor {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    client_id: String,
    #[serde(default)]
    client_secret: Option<String>,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

/// Reads and parses the client secret descriptor at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if the file cannot be read and
/// [`ConfigError::Malformed`] if it does not describe a usable client or
/// `scopes` is empty or blank.
pub fn load_client_config(path: &Path, scopes: &[String]) -> Result<ClientConfig, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_client_config(&bytes, scopes)?;
    debug!("Loaded client {} from {}", config.client_id, path.display());
    Ok(config)
}

/// Parses descriptor bytes into a [`ClientConfig`].
///
/// # Errors
///
/// Returns [`ConfigError::Malformed`] on any schema violation.
pub fn parse_client_config(bytes: &[u8], scopes: &[String]) -> Result<ClientConfig, ConfigError> {
    if scopes.is_empty() || scopes.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Malformed("invalid scope list".into()));
    }

    let descriptor: SecretDescriptor =
        serde_json::from_slice(bytes).map_err(|e| ConfigError::Malformed(e.to_string()))?;

    let secret = descriptor
        .installed
        .or(descriptor.web)
        .ok_or_else(|| ConfigError::Malformed("no credentials found".into()))?;

    if secret.client_id.trim().is_empty() {
        return Err(ConfigError::Malformed("empty client_id".into()));
    }

    let redirect_uri = secret
        .redirect_uris
        .into_iter()
        .next()
        .ok_or_else(|| ConfigError::Malformed("missing redirect URL".into()))?;

    let auth_url = parse_endpoint("auth_uri", &secret.auth_uri)?;
    let token_url = parse_endpoint("token_uri", &secret.token_uri)?;

    Ok(ClientConfig {
        client_id: secret.client_id,
        client_secret: secret.client_secret.filter(|s| !s.is_empty()),
        auth_url,
        token_url,
        redirect_uri,
        scopes: scopes.to_vec(),
    })
}

fn parse_endpoint(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Malformed(format!("{field}: {e}")))
}
