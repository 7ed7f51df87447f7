//! Authorization Code Flow implementation.

use super::OAuthClient;
use crate::error::Result;
use crate::token::Token;
use url::Url;

/// Authorization Code Flow for `OAuth2`.
///
/// Suitable for installed applications where the user opens the
/// authorization URL and pastes the resulting code back.
#[derive(Debug)]
pub struct AuthorizationCodeFlow {
    client: OAuthClient,
    offline_access: bool,
}

impl AuthorizationCodeFlow {
    /// Creates a new authorization code flow.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self {
            client,
            offline_access: false,
        }
    }

    /// Asks the server to also issue a refresh token (`access_type=offline`).
    #[must_use]
    pub const fn with_offline_access(mut self) -> Self {
        self.offline_access = true;
        self
    }

    /// Builds the authorization URL for user consent.
    ///
    /// # Arguments
    ///
    /// * `scopes` - Optional scopes to request (uses provider defaults if None)
    /// * `state` - Optional state parameter for CSRF protection
    #[must_use]
    pub fn authorization_url(&self, scopes: Option<&[String]>, state: Option<&str>) -> Url {
        let mut url = self.client.provider.auth_url.clone();

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("access_type", if self.offline_access { "offline" } else { "online" })
                .append_pair("client_id", &self.client.client_id);

            if let Some(redirect_uri) = &self.client.redirect_uri {
                pairs.append_pair("redirect_uri", redirect_uri);
            }

            pairs.append_pair("response_type", "code");

            let scope_str = scopes.map_or_else(
                || self.client.provider.default_scopes.join(" "),
                |s| s.join(" "),
            );

            if !scope_str.is_empty() {
                pairs.append_pair("scope", &scope_str);
            }

            if let Some(state_val) = state {
                pairs.append_pair("state", state_val);
            }
        }

        url
    }

    /// Exchanges the authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code pasted by the user
    /// * `redirect_uri` - Optional redirect URI (uses client config if None)
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> Result<Token> {
        self.client.exchange_code(code, redirect_uri).await
    }
}
