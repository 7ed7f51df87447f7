//! Runtime settings: where the client secret and token cache live.

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Directory segment under the user config dir.
pub const APP_NAMESPACE: &str = "inbox-status";

/// File name of the token cache.
pub const TOKEN_FILE_NAME: &str = "token.json";

/// Default client secret descriptor, relative to the working directory.
pub const DEFAULT_CLIENT_SECRET_PATH: &str = "credentials.json";

/// Read-only Gmail API scope.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Overrides the client secret path.
pub const ENV_CREDENTIALS: &str = "INBOX_STATUS_CREDENTIALS";
/// Overrides the token cache path.
pub const ENV_TOKEN: &str = "INBOX_STATUS_TOKEN";
/// Overrides the requested scopes (space separated).
pub const ENV_SCOPES: &str = "INBOX_STATUS_SCOPES";
/// Set to `1` or `true` to open the authorization URL in a browser.
pub const ENV_OPEN_BROWSER: &str = "INBOX_STATUS_OPEN_BROWSER";

/// Settings for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Client secret descriptor file.
    pub client_secret_path: PathBuf,
    /// Token cache file.
    pub token_path: PathBuf,
    /// Scopes requested during authorization.
    pub scopes: Vec<String>,
    /// Try to open the authorization URL in a browser.
    pub open_browser: bool,
}

impl Settings {
    /// Settings with an explicit token path and defaults for everything else.
    #[must_use]
    pub fn new(token_path: impl Into<PathBuf>) -> Self {
        Self {
            client_secret_path: PathBuf::from(DEFAULT_CLIENT_SECRET_PATH),
            token_path: token_path.into(),
            scopes: vec![GMAIL_READONLY_SCOPE.to_string()],
            open_browser: false,
        }
    }

    /// Sets the client secret path.
    #[must_use]
    pub fn with_client_secret_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_secret_path = path.into();
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// `<user-config-dir>/inbox-status/token.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if the platform has no config dir.
    pub fn default_token_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAMESPACE).join(TOKEN_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Builds settings from defaults and `INBOX_STATUS_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if no token path override is set
    /// and the platform has no config dir.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token_path = match lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => Self::default_token_path()?,
        };

        let mut settings = Self::new(token_path);

        if let Some(path) = lookup(ENV_CREDENTIALS).filter(|v| !v.is_empty()) {
            settings.client_secret_path = PathBuf::from(path);
        }

        if let Some(scopes) = lookup(ENV_SCOPES) {
            let scopes: Vec<String> = scopes.split_whitespace().map(str::to_string).collect();
            if !scopes.is_empty() {
                settings.scopes = scopes;
            }
        }

        settings.open_browser = lookup(ENV_OPEN_BROWSER)
            .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"));

        Ok(settings)
    }
}
