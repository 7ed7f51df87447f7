//! Bearer-token HTTP transport with transparent refresh.

use crate::error::{Error, Result};
use crate::flow::OAuthClient;
use crate::token::Token;
use reqwest::{IntoUrl, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// HTTP client that attaches the current access token to every request.
///
/// When the token is expired (see [`Token::is_expired`]) it is renewed through
/// the refresh grant before the request is sent. A failed renewal surfaces as
/// [`Error::RefreshFailed`]; there is no fallback to interactive authorization.
#[derive(Debug)]
pub struct AuthorizedClient {
    oauth: OAuthClient,
    token: Mutex<Token>,
}

impl AuthorizedClient {
    /// Creates a transport for `token`.
    #[must_use]
    pub fn new(oauth: OAuthClient, token: Token) -> Self {
        Self {
            oauth,
            token: Mutex::new(token),
        }
    }

    /// Returns a copy of the token currently in use, including any refresh.
    pub async fn current_token(&self) -> Token {
        self.token.lock().await.clone()
    }

    /// Starts a GET request. Send it with [`AuthorizedClient::send`].
    pub fn get(&self, url: impl IntoUrl) -> RequestBuilder {
        self.oauth.http_client().get(url)
    }

    /// Sends `request` with the bearer token attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be refreshed, the request fails,
    /// or the server answers with a non-success status.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let access_token = self.access_token().await?;
        let response = request.bearer_auth(access_token).send().await?;
        Ok(response.error_for_status()?)
    }

    /// Sends a GET request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizedClient::send`], plus body decoding failures.
    pub async fn get_json<T: DeserializeOwned>(&self, url: impl IntoUrl) -> Result<T> {
        let response = self.send(self.get(url)).await?;
        Ok(response.json().await?)
    }

    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if token.is_expired() {
            debug!("Access token expired, refreshing");
            let renewed = self.oauth.refresh_token(&token).await.map_err(|e| {
                warn!(error = &e as &dyn std::error::Error, "Token refresh failed");
                Error::RefreshFailed(Box::new(e))
            })?;
            *token = renewed;
        }
        Ok(token.access_token.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use chrono::{Duration, Utc};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oauth_for(server: &MockServer) -> OAuthClient {
        let provider = Provider::new(
            "Mock",
            format!("{}/auth", server.uri()),
            format!("{}/token", server.uri()),
        )
        .unwrap();
        OAuthClient::new("client", provider)
    }

    #[tokio::test]
    async fn test_valid_token_attached_without_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource"))
            .and(header("authorization", "Bearer live"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = AuthorizedClient::new(oauth_for(&server), Token::new("live", "Bearer"));
        let body: serde_json::Value = client
            .get_json(format!("{}/resource", server.uri()))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_expired_token_refreshed_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "renewed",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/resource"))
            .and(header("authorization", "Bearer renewed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let stale = Token::new("stale", "Bearer")
            .with_refresh_token("refresh")
            .with_expires_at(Utc::now() - Duration::seconds(10));
        let client = AuthorizedClient::new(oauth_for(&server), stale);

        let url = format!("{}/resource", server.uri());
        let _: serde_json::Value = client.get_json(url.as_str()).await.unwrap();
        let _: serde_json::Value = client.get_json(url.as_str()).await.unwrap();

        let current = client.current_token().await;
        assert_eq!(current.access_token, "renewed");
        assert_eq!(current.refresh_token.as_deref(), Some("refresh"));
    }

    #[tokio::test]
    async fn test_revoked_refresh_token_surfaces_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })))
            .mount(&server)
            .await;

        let stale = Token::new("stale", "Bearer")
            .with_refresh_token("revoked")
            .with_expires_at(Utc::now() - Duration::seconds(10));
        let client = AuthorizedClient::new(oauth_for(&server), stale.clone());

        let err = client
            .send(client.get(format!("{}/resource", server.uri())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RefreshFailed(_)));
        assert_eq!(err.to_string(), "Token refresh failed");
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(
            cause,
            "OAuth2 error: invalid_grant - Token has been expired or revoked."
        );
        assert_eq!(client.current_token().await, stale);
    }

    #[tokio::test]
    async fn test_error_status_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resource"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = AuthorizedClient::new(oauth_for(&server), Token::new("live", "Bearer"));
        let err = client
            .send(client.get(format!("{}/resource", server.uri())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
