//! Session state and the login / token refresh state machine.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::auth::{AuthToken, Credentials, Session, TokenOutcome};
use crate::error::AuthError;

/// The network operations the session state machine drives.
#[async_trait]
pub trait Backend: Send + Sync {
    /// A logged-in session together with whatever transport state it needs.
    type Session: AsRef<Session> + Send + Sync;

    /// Log in from scratch.
    async fn login(&self, credentials: &Credentials) -> Result<Self::Session>;

    /// Ask for an authorization token using `session`.
    async fn generate_token(&self, session: &Self::Session) -> Result<TokenOutcome>;
}

/// Whether the client currently holds a session.
#[derive(Debug)]
pub enum SessionState<S> {
    NoSession,
    HasSession(Arc<S>),
}

impl<S> SessionState<S> {
    fn current(&self) -> Option<&Arc<S>> {
        match self {
            SessionState::NoSession => None,
            SessionState::HasSession(session) => Some(session),
        }
    }
}

/// Owns the credentials and the session state, and hands out valid tokens.
///
/// Logging in is the only transition that changes state, and it happens with
/// the state lock held. Callers racing on the same expired session share a
/// single re-login.
pub struct SessionManager<B: Backend> {
    backend: B,
    credentials: Credentials,
    state: Mutex<SessionState<B::Session>>,
}

impl<B: Backend> SessionManager<B> {
    pub fn new(backend: B, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
            state: Mutex::new(SessionState::NoSession),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns a copy of the current session, if logged in.
    pub async fn session(&self) -> Option<Session> {
        self.state
            .lock()
            .await
            .current()
            .map(|live| {
                let session: &Session = (**live).as_ref();
                session.clone()
            })
    }

    /// Log in, replacing any existing session.
    pub async fn login(&self) -> Result<Arc<B::Session>> {
        let mut state = self.state.lock().await;
        self.replace(&mut state).await
    }

    /// Return a token together with the session that minted it.
    ///
    /// With no session, logs in first. If the service reports the session as
    /// expired, logs in once more and retries once; a second expiry is an
    /// [`AuthError::SessionExpired`]. Other failures propagate unchanged.
    #[instrument(skip(self), fields(username = %self.credentials.username()))]
    pub async fn valid_token(&self) -> Result<(AuthToken, Arc<B::Session>)> {
        let session = self.current().await?;

        let stale = match self.backend.generate_token(&session).await? {
            TokenOutcome::Issued(token) => return Ok((token, session)),
            TokenOutcome::SessionExpired(failure) => {
                info!(%failure, "Session expired, logging in again");
                session
            }
        };

        let session = self.relogin(&stale).await?;

        match self.backend.generate_token(&session).await? {
            TokenOutcome::Issued(token) => Ok((token, session)),
            TokenOutcome::SessionExpired(failure) => Err(AuthError::SessionExpired(failure).into()),
        }
    }

    /// Current session, logging in if there is none.
    async fn current(&self) -> Result<Arc<B::Session>> {
        let mut state = self.state.lock().await;
        if let Some(session) = state.current() {
            return Ok(Arc::clone(session));
        }
        self.replace(&mut state).await
    }

    /// Replace `stale` with a fresh session, unless another caller already did.
    async fn relogin(&self, stale: &Arc<B::Session>) -> Result<Arc<B::Session>> {
        let mut state = self.state.lock().await;
        if let Some(session) = state.current() {
            if !Arc::ptr_eq(session, stale) {
                debug!("Session already replaced by another caller");
                return Ok(Arc::clone(session));
            }
        }
        self.replace(&mut state).await
    }

    async fn replace(&self, state: &mut SessionState<B::Session>) -> Result<Arc<B::Session>> {
        *state = SessionState::NoSession;
        let session = Arc::new(self.backend.login(&self.credentials).await?);
        *state = SessionState::HasSession(Arc::clone(&session));
        Ok(session)
    }
}

impl<B: Backend + std::fmt::Debug> std::fmt::Debug for SessionManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("backend", &self.backend)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
