//! Interactive authorization: show the consent URL, read back the code.

use std::future::Future;
use std::io;

use inbox_status_oauth::Token;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::capability::OAuthCapability;
use crate::config::ClientConfig;
use crate::error::AuthError;

/// Opaque anti-forgery value sent as the `state` parameter.
pub const AUTH_STATE: &str = "state-token";

/// Source of the authorization code pasted by the user.
///
/// This is the only suspension point of the whole acquisition flow.
pub trait CodePrompt {
    /// Presents `url` and waits for one line of input.
    ///
    /// End of input must be reported as an error.
    fn read_code(&mut self, url: &Url) -> impl Future<Output = io::Result<String>>;
}

/// Prompts on a writer and reads the code as one line from a reader.
///
/// [`ConsolePrompt::new`] uses stdout and stdin.
#[derive(Debug)]
pub struct ConsolePrompt<R = BufReader<Stdin>, W = Stdout> {
    input: R,
    output: W,
    open_browser: bool,
}

impl ConsolePrompt {
    /// Creates a prompt on the process console.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> ConsolePrompt<R, W> {
    /// Creates a prompt over arbitrary streams.
    #[must_use]
    pub const fn with_io(input: R, output: W) -> Self {
        Self {
            input,
            output,
            open_browser: false,
        }
    }

    /// Also tries to open the URL in the default browser.
    #[must_use]
    pub const fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }
}

impl<R, W> CodePrompt for ConsolePrompt<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn read_code(&mut self, url: &Url) -> io::Result<String> {
        let message = format!(
            "Go to the following link in your browser then copy & paste the authorization code: \n{url}\n\ncode="
        );
        self.output.write_all(message.as_bytes()).await?;
        self.output.flush().await?;

        if self.open_browser {
            if let Err(e) = opener::open(url.as_str()) {
                debug!("Could not open browser: {e}");
            }
        }

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a code was entered",
            ));
        }
        Ok(line)
    }
}

/// Progress of one acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing attempted yet.
    Idle,
    /// Consent URL shown, waiting for the code.
    AwaitingUserCode,
    /// Code received, talking to the token endpoint.
    Exchanging,
    /// A token was obtained.
    Authorized,
    /// The attempt failed; the caller decides whether to start over.
    Failed,
}

/// Runs the authorization-code flow once against a capability.
#[derive(Debug)]
pub struct WebAuthorizer<'a, C> {
    capability: &'a C,
    state: AuthState,
}

impl<'a, C: OAuthCapability> WebAuthorizer<'a, C> {
    /// Creates an authorizer in the [`AuthState::Idle`] state.
    #[must_use]
    pub const fn new(capability: &'a C) -> Self {
        Self {
            capability,
            state: AuthState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> AuthState {
        self.state
    }

    /// Obtains a token through the user.
    ///
    /// No retries: any failure ends the attempt in [`AuthState::Failed`].
    ///
    /// # Errors
    ///
    /// [`AuthError::InputFailed`] if no usable code is read and
    /// [`AuthError::ExchangeFailed`] if the token endpoint rejects it.
    pub async fn acquire<P: CodePrompt>(
        &mut self,
        config: &ClientConfig,
        prompt: &mut P,
    ) -> Result<Token, AuthError> {
        let result = self.run(config, prompt).await;
        self.state = if result.is_ok() {
            AuthState::Authorized
        } else {
            AuthState::Failed
        };
        result
    }

    async fn run<P: CodePrompt>(
        &mut self,
        config: &ClientConfig,
        prompt: &mut P,
    ) -> Result<Token, AuthError> {
        let url = self.capability.authorization_url(config, AUTH_STATE);

        self.state = AuthState::AwaitingUserCode;
        info!("Waiting for authorization code");
        let line = prompt.read_code(&url).await.map_err(AuthError::InputFailed)?;
        let code = line.trim();
        if code.is_empty() {
            warn!("Empty authorization code");
            return Err(AuthError::InputFailed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty authorization code",
            )));
        }

        self.state = AuthState::Exchanging;
        let token = self.capability.exchange_code(config, code).await?;
        info!("Authorization code exchanged for token");
        Ok(token)
    }
}
