//! `OAuth2` provider endpoints.

use crate::error::Result;
use url::Url;

/// `OAuth2` provider configuration.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Provider name, used in logs.
    pub name: String,
    /// Authorization endpoint URL.
    pub auth_url: Url,
    /// Token endpoint URL.
    pub token_url: Url,
    /// Default scopes.
    pub default_scopes: Vec<String>,
}

impl Provider {
    /// Creates a new provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if URLs are invalid.
    pub fn new(
        name: impl Into<String>,
        auth_url: impl AsRef<str>,
        token_url: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self::from_urls(
            name,
            Url::parse(auth_url.as_ref())?,
            Url::parse(token_url.as_ref())?,
        ))
    }

    /// Creates a provider from already parsed endpoints.
    #[must_use]
    pub fn from_urls(name: impl Into<String>, auth_url: Url, token_url: Url) -> Self {
        Self {
            name: name.into(),
            auth_url,
            token_url,
            default_scopes: Vec::new(),
        }
    }

    /// Sets the default scopes.
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

}
