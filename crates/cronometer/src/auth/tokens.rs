//! Secret string types.

use std::fmt;

/// A short-lived authorization token for the export endpoint.
///
/// The service issues these with a one hour lifetime. The client does not
/// track issue time, so tokens are minted per export and never reused.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value.
    ///
    /// # Security
    ///
    /// Use only when constructing export requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&"[REDACTED]").finish()
    }
}

/// Session nonce issued by the service as the `sesnonce` cookie.
///
/// # Security
///
/// The nonce identifies the logged-in session; it is never logged or
/// displayed in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionNonce(String);

impl SessionNonce {
    pub(crate) fn new(nonce: impl Into<String>) -> Self {
        Self(nonce.into())
    }

    /// Returns the nonce value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionNonce").field(&"[REDACTED]").finish()
    }
}
