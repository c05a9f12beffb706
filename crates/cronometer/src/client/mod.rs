//! The high-level client: session handling and exports.

mod export;
mod state;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::Result;
use crate::auth::{self, AuthToken, AuthenticatedSession, Credentials, Session, TokenOutcome};
use crate::config::ClientConfig;
use crate::http::ensure_success;

pub use export::{ExportParams, ExportStream, NONCE_PARAM, merge_export_params};
pub use state::{Backend, SessionManager, SessionState};

/// [`Backend`] that talks to the real service over HTTP.
#[derive(Debug, Clone)]
pub struct CronometerBackend {
    config: ClientConfig,
}

impl CronometerBackend {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Backend for CronometerBackend {
    type Session = AuthenticatedSession;

    async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedSession> {
        auth::login(&self.config, credentials).await
    }

    async fn generate_token(&self, session: &AuthenticatedSession) -> Result<TokenOutcome> {
        auth::generate_token(&self.config, session).await
    }
}

/// A client for one account.
///
/// Logs in lazily on first use and again when the service reports the
/// session as expired.
///
/// # Thread Safety
///
/// Clients are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks. Logins are serialized internally.
///
/// # Example
///
/// ```no_run
/// use cronometer::{Client, Credentials, ExportParams};
///
/// # async fn example() -> Result<(), cronometer::Error> {
/// let client = Client::new(Credentials::new("alice@example.com", "hunter2"));
///
/// let mut params = ExportParams::new();
/// params.insert("generate".to_string(), "servings".to_string());
///
/// let export = client.export(&params).await?;
/// let mut csv = Vec::new();
/// let bytes = export.copy_to(&mut csv).await?;
/// println!("exported {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<SessionManager<CronometerBackend>>,
}

impl Client {
    /// Client for the public service with default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(ClientConfig::default(), credentials)
    }

    pub fn with_config(config: ClientConfig, credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(SessionManager::new(
                CronometerBackend::new(config),
                credentials,
            )),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.backend().config()
    }

    /// Log in now, replacing any existing session.
    pub async fn login(&self) -> Result<Session> {
        let live = self.inner.login().await?;
        Ok(live.session().clone())
    }

    /// Returns the current session, if logged in.
    pub async fn session(&self) -> Option<Session> {
        self.inner.session().await
    }

    /// Mint a fresh authorization token, logging in as needed.
    pub async fn valid_token(&self) -> Result<(AuthToken, Session)> {
        let (token, live) = self.inner.valid_token().await?;
        Ok((token, live.session().clone()))
    }

    /// Start an export and return its body as a stream.
    ///
    /// A new token is minted for every export and sent as `nonce`,
    /// overriding any `nonce` in `params`. The request has no response
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the export endpoint answers with a
    /// non-success status, plus any error from obtaining a token.
    #[instrument(skip(self, params), fields(service = %self.config().service))]
    pub async fn export(&self, params: &ExportParams) -> Result<ExportStream> {
        let (token, live) = self.inner.valid_token().await?;

        let url = self.config().service.export_url();
        let query = merge_export_params(&token, params);
        debug!(%url, options = ?params.keys().collect::<Vec<_>>(), "Starting export");

        let response = live.http().client().get(&url).query(&query).send().await?;
        let response = ensure_success(response).await?;

        Ok(ExportStream::new(response))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("service", &self.config().service)
            .finish_non_exhaustive()
    }
}
