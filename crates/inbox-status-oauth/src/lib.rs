//! # inbox-status-oauth
//!
//! `OAuth2` client library for installed applications.
//!
//! ## Features
//!
//! - **Authorization Code Flow**: authorization URL construction with offline
//!   access and code-for-token exchange
//! - **Token management**: refresh grant, expiration checking
//! - **Authorized transport**: `reqwest` client that attaches the bearer token
//!   and refreshes it transparently
//!
//! ## Quick Start
//!
//! ```ignore
//! use inbox_status_oauth::{AuthorizationCodeFlow, AuthorizedClient, OAuthClient, Provider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Provider::new(
//!         "Google",
//!         "https://accounts.google.com/o/oauth2/auth",
//!         "https://oauth2.googleapis.com/token",
//!     )?;
//!     let client = OAuthClient::new("your_client_id", provider)
//!         .with_client_secret("your_secret")
//!         .with_redirect_uri("urn:ietf:wg:oauth:2.0:oob");
//!
//!     let flow = AuthorizationCodeFlow::new(client.clone()).with_offline_access();
//!     println!("Visit: {}", flow.authorization_url(None, Some("state-token")));
//!
//!     let token = flow.exchange_code("pasted_code", None).await?;
//!     let http = AuthorizedClient::new(client, token);
//!     let labels: serde_json::Value = http
//!         .get_json("https://gmail.googleapis.com/gmail/v1/users/me/labels")
//!         .await?;
//!     println!("{labels}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod token;
pub mod transport;

pub use error::{Error, Result};
pub use flow::{AuthorizationCodeFlow, OAuthClient};
pub use provider::Provider;
pub use token::Token;
pub use transport::AuthorizedClient;
