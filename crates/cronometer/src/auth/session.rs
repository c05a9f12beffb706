//! Session types.

use crate::http::HttpSession;

use super::tokens::SessionNonce;

/// The outcome of a successful login.
///
/// A session is only meaningful together with the cookies set during the
/// login that produced it; see [`AuthenticatedSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: i64,
    nonce: SessionNonce,
}

impl Session {
    pub(crate) fn new(user_id: i64, nonce: SessionNonce) -> Self {
        Self { user_id, nonce }
    }

    /// Returns the numeric user id reported by `authenticate`.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the session nonce.
    pub fn nonce(&self) -> &SessionNonce {
        &self.nonce
    }
}

/// A [`Session`] bound to the HTTP client and cookie jar of its login.
///
/// The pair is created together and replaced together; a re-login never
/// mixes a new nonce with old cookies.
#[derive(Debug)]
pub struct AuthenticatedSession {
    session: Session,
    http: HttpSession,
}

impl AuthenticatedSession {
    pub(crate) fn new(session: Session, http: HttpSession) -> Self {
        Self { session, http }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn http(&self) -> &HttpSession {
        &self.http
    }
}

impl AsRef<Session> for AuthenticatedSession {
    fn as_ref(&self) -> &Session {
        &self.session
    }
}
