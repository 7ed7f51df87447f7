//! Narrow seam over the `OAuth2` client implementation.

use std::future::Future;

use inbox_status_oauth::{AuthorizationCodeFlow, AuthorizedClient, OAuthClient, Provider, Token};
use url::Url;

use crate::config::ClientConfig;
use crate::error::AuthError;

/// The three `OAuth2` operations the credential manager relies on.
pub trait OAuthCapability {
    /// Authenticated HTTP transport handed to callers.
    type Transport;

    /// Builds the consent URL, asking for offline access.
    fn authorization_url(&self, config: &ClientConfig, state: &str) -> Url;

    /// Exchanges a pasted authorization code for a token.
    fn exchange_code(
        &self,
        config: &ClientConfig,
        code: &str,
    ) -> impl Future<Output = Result<Token, AuthError>>;

    /// Wraps `token` in a transport that refreshes it when expired.
    fn transport(&self, config: &ClientConfig, token: Token) -> Self::Transport;
}

/// [`OAuthCapability`] backed by `inbox-status-oauth` over `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct OAuth2Capability {
    http: reqwest::Client,
}

impl OAuth2Capability {
    /// Creates a capability with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn oauth_client(&self, config: &ClientConfig) -> OAuthClient {
        let name = config.auth_url.host_str().unwrap_or("oauth2").to_string();
        let provider = Provider::from_urls(name, config.auth_url.clone(), config.token_url.clone())
            .with_default_scopes(config.scopes.clone());

        let client = OAuthClient::new(&config.client_id, provider)
            .with_redirect_uri(&config.redirect_uri)
            .with_http_client(self.http.clone());

        match &config.client_secret {
            Some(secret) => client.with_client_secret(secret),
            None => client,
        }
    }
}

impl OAuthCapability for OAuth2Capability {
    type Transport = AuthorizedClient;

    fn authorization_url(&self, config: &ClientConfig, state: &str) -> Url {
        AuthorizationCodeFlow::new(self.oauth_client(config))
            .with_offline_access()
            .authorization_url(Some(&config.scopes), Some(state))
    }

    async fn exchange_code(&self, config: &ClientConfig, code: &str) -> Result<Token, AuthError> {
        AuthorizationCodeFlow::new(self.oauth_client(config))
            .exchange_code(code, None)
            .await
            .map_err(AuthError::ExchangeFailed)
    }

    fn transport(&self, config: &ClientConfig, token: Token) -> AuthorizedClient {
        AuthorizedClient::new(self.oauth_client(config), token)
    }
}
