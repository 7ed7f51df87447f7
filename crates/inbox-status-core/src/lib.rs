//! # inbox-status-core
//!
//! Token acquisition and caching policy for `inbox-status`.
//!
//! This crate provides:
//! - Client secret descriptor loading ([`load_client_config`])
//! - An on-disk token cache with owner-only permissions ([`TokenStore`])
//! - The interactive authorization-code flow ([`WebAuthorizer`])
//! - [`CredentialManager`], which ties them together: cached token first,
//!   one interactive authorization on a miss, then an authenticated client
//!
//! The `OAuth2` protocol itself sits behind [`OAuthCapability`], implemented
//! for real traffic by [`OAuth2Capability`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod authorizer;
pub mod capability;
pub mod config;
mod error;
pub mod manager;
pub mod settings;
pub mod store;

pub use authorizer::{AUTH_STATE, AuthState, CodePrompt, ConsolePrompt, WebAuthorizer};
pub use capability::{OAuth2Capability, OAuthCapability};
pub use config::{ClientConfig, load_client_config};
pub use error::{AuthError, ConfigError, Error, Result, StoreError};
pub use inbox_status_oauth::{AuthorizedClient, Token};
pub use manager::{CredentialManager, TokenSource};
pub use settings::Settings;
pub use store::TokenStore;
