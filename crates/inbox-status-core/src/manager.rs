//! Credential manager: cached token first, interactive flow on a miss.

use std::path::Path;

use inbox_status_oauth::Token;
use tracing::{info, warn};

use crate::authorizer::{CodePrompt, ConsolePrompt, WebAuthorizer};
use crate::capability::{OAuth2Capability, OAuthCapability};
use crate::config::{ClientConfig, load_client_config};
use crate::error::{Result, StoreError};
use crate::settings::Settings;
use crate::store::TokenStore;

/// Where the current token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Read from the token cache.
    Cache,
    /// Obtained through the interactive flow during this run.
    Web,
}

/// Owns the client identity and the current token for one process run.
#[derive(Debug)]
pub struct CredentialManager<C = OAuth2Capability> {
    config: ClientConfig,
    token: Token,
    store: TokenStore,
    capability: C,
    source: TokenSource,
    save_error: Option<StoreError>,
}

impl CredentialManager<OAuth2Capability> {
    /// Builds a manager from environment settings, prompting on the console
    /// if no cached token is usable.
    ///
    /// # Errors
    ///
    /// See [`CredentialManager::with_settings`]; additionally fails with
    /// [`crate::ConfigError::NoConfigDir`] when no token path can be derived.
    pub async fn new() -> Result<Self> {
        let settings = Settings::from_env()?;
        let mut prompt = ConsolePrompt::new().with_browser(settings.open_browser);
        Self::with_settings(&settings, OAuth2Capability::new(), &mut prompt).await
    }
}

impl<C: OAuthCapability> CredentialManager<C> {
    /// Loads the client config, then resolves a token.
    ///
    /// A cached token is adopted as is, without any network traffic. Any cache
    /// failure falls back to exactly one interactive authorization, whose
    /// token is then cached. A failure to cache it is logged and kept in
    /// [`CredentialManager::save_error`]; the fresh token is still used.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if the client secret cannot be loaded (the
    /// cache is never consulted in that case) and [`crate::Error::Auth`] if
    /// the interactive flow fails.
    pub async fn with_settings<P: CodePrompt>(
        settings: &Settings,
        capability: C,
        prompt: &mut P,
    ) -> Result<Self> {
        let config = load_client_config(&settings.client_secret_path, &settings.scopes)?;
        let store = TokenStore::new(&settings.token_path);

        match store.load().await {
            Ok(token) => {
                info!("Using cached token from {}", store.path().display());
                return Ok(Self {
                    config,
                    token,
                    store,
                    capability,
                    source: TokenSource::Cache,
                    save_error: None,
                });
            }
            Err(StoreError::Missing { .. }) => {
                info!("No cached token, starting authorization");
            }
            Err(e) => {
                warn!(error = &e as &dyn std::error::Error, "Ignoring unusable token cache");
            }
        }

        let token = WebAuthorizer::new(&capability)
            .acquire(&config, prompt)
            .await?;

        let save_error = store.save(&token).await.err();
        if let Some(e) = &save_error {
            warn!(error = e as &dyn std::error::Error, "Token obtained but not cached");
        }

        Ok(Self {
            config,
            token,
            store,
            capability,
            source: TokenSource::Web,
            save_error,
        })
    }

    /// Authenticated transport for the current token.
    #[must_use]
    pub fn client(&self) -> C::Transport {
        self.capability.transport(&self.config, self.token.clone())
    }

    /// Current token.
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// Where the current token came from.
    #[must_use]
    pub const fn source(&self) -> TokenSource {
        self.source
    }

    /// Token cache path.
    #[must_use]
    pub fn token_path(&self) -> &Path {
        self.store.path()
    }

    /// Error from caching a freshly acquired token, if that failed.
    #[must_use]
    pub const fn save_error(&self) -> Option<&StoreError> {
        self.save_error.as_ref()
    }

    /// Replaces the current token and caches it.
    ///
    /// The in-memory token is replaced even if caching fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the cache cannot be written.
    pub async fn update_token(&mut self, token: Token) -> std::result::Result<(), StoreError> {
        self.token = token;
        self.store.save(&self.token).await?;
        self.save_error = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::authorizer::tests::{FakeCapability, ScriptedPrompt};
    use crate::error::{AuthError, ConfigError, Error};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SECRET: &str = r#"{"installed":{"client_id":"cid","client_secret":"cs",
        "auth_uri":"https://accounts.example.com/auth",
        "token_uri":"https://accounts.example.com/token",
        "redirect_uris":["http://localhost"]}}"#;

    struct Fixture {
        dir: TempDir,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let secret = dir.path().join("credentials.json");
            std::fs::write(&secret, SECRET).unwrap();
            let token_path = dir.path().join("cfg").join("inbox-status").join("token.json");
            let settings = Settings::new(token_path).with_client_secret_path(secret);
            Self { dir, settings }
        }

        fn token_path(&self) -> PathBuf {
            self.settings.token_path.clone()
        }

        fn seed_cache(&self, contents: &str) {
            let path = self.token_path();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_authorization() {
        let fixture = Fixture::new();
        let cached = Token::new("cached", "Bearer").with_refresh_token("r");
        fixture.seed_cache(&serde_json::to_string(&cached).unwrap());

        let capability = FakeCapability::default();
        let mut prompt = ScriptedPrompt::closed();
        let manager =
            CredentialManager::with_settings(&fixture.settings, capability.clone(), &mut prompt)
                .await
                .unwrap();

        assert_eq!(manager.token(), &cached);
        assert_eq!(manager.source(), TokenSource::Cache);
        assert!(prompt.shown.is_empty());
        assert!(capability.exchanged.borrow().is_empty());
        assert_eq!(manager.client(), cached);
    }

    #[tokio::test]
    async fn test_cache_miss_authorizes_once_and_saves() {
        let fixture = Fixture::new();
        let capability = FakeCapability::default();
        let mut prompt = ScriptedPrompt::with_line("code-1\n");

        let manager =
            CredentialManager::with_settings(&fixture.settings, capability.clone(), &mut prompt)
                .await
                .unwrap();

        assert_eq!(manager.source(), TokenSource::Web);
        assert_eq!(manager.token().access_token, "access-for-code-1");
        assert_eq!(prompt.shown.len(), 1);
        assert_eq!(capability.exchanged.borrow().len(), 1);
        assert!(manager.save_error().is_none());

        let saved = TokenStore::new(fixture.token_path()).load().await.unwrap();
        assert_eq!(&saved, manager.token());
    }

    #[tokio::test]
    async fn test_corrupt_cache_behaves_like_missing() {
        let fixture = Fixture::new();
        fixture.seed_cache("{{{ definitely not a token");
        let capability = FakeCapability::default();
        let mut prompt = ScriptedPrompt::with_line("code-2");

        let manager =
            CredentialManager::with_settings(&fixture.settings, capability.clone(), &mut prompt)
                .await
                .unwrap();

        assert_eq!(manager.source(), TokenSource::Web);
        assert_eq!(prompt.shown.len(), 1);
        assert_eq!(capability.exchanged.borrow().len(), 1);

        let repaired = TokenStore::new(fixture.token_path()).load().await.unwrap();
        assert_eq!(repaired.access_token, "access-for-code-2");
    }

    #[tokio::test]
    async fn test_missing_client_secret_is_fatal_before_cache() {
        let fixture = Fixture::new();
        let settings = fixture
            .settings
            .clone()
            .with_client_secret_path(fixture.dir.path().join("absent.json"));
        let capability = FakeCapability::default();
        let mut prompt = ScriptedPrompt::with_line("never-read");

        let err = CredentialManager::with_settings(&settings, capability.clone(), &mut prompt)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
        assert!(prompt.shown.is_empty());
        assert!(!fixture.token_path().exists());
    }

    #[tokio::test]
    async fn test_auth_failure_is_fatal_and_nothing_cached() {
        let fixture = Fixture::new();
        let capability = FakeCapability {
            reject: true,
            ..FakeCapability::default()
        };
        let mut prompt = ScriptedPrompt::with_line("stale-code");

        let err = CredentialManager::with_settings(&fixture.settings, capability, &mut prompt)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(AuthError::ExchangeFailed(_))));
        assert!(!fixture.token_path().exists());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_fresh_token() {
        let fixture = Fixture::new();
        let blocker = fixture.dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let mut settings = fixture.settings.clone();
        settings.token_path = blocker.join("token.json");

        let mut prompt = ScriptedPrompt::with_line("code-3");
        let manager =
            CredentialManager::with_settings(&settings, FakeCapability::default(), &mut prompt)
                .await
                .unwrap();

        assert_eq!(manager.token().access_token, "access-for-code-3");
        assert!(matches!(manager.save_error(), Some(StoreError::Io { .. })));
    }

    #[tokio::test]
    async fn test_update_token_replaces_and_caches() {
        let fixture = Fixture::new();
        fixture.seed_cache(&serde_json::to_string(&Token::new("old", "Bearer")).unwrap());
        let mut manager = CredentialManager::with_settings(
            &fixture.settings,
            FakeCapability::default(),
            &mut ScriptedPrompt::closed(),
        )
        .await
        .unwrap();

        let renewed = Token::new("renewed", "Bearer").with_refresh_token("r2");
        manager.update_token(renewed.clone()).await.unwrap();

        assert_eq!(manager.token(), &renewed);
        assert_eq!(TokenStore::new(manager.token_path()).load().await.unwrap(), renewed);
    }
}
