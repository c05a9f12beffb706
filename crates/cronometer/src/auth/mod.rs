//! Authentication: credentials, login, and authorization tokens.
//!
//! A form login followed by the `authenticate` RPC call yields a [`Session`].
//! A session is used to mint short-lived [`AuthToken`]s for the export
//! endpoint.

mod anticsrf;
mod credentials;
mod login;
mod session;
mod token;
mod tokens;

pub use anticsrf::{ANTI_FORGERY_FIELD, extract_anti_forgery_token};
pub use credentials::Credentials;
pub(crate) use login::login;
pub use login::SESSION_NONCE_COOKIE;
pub use session::{AuthenticatedSession, Session};
pub(crate) use token::generate_token;
pub use token::{NOT_LOGGED_IN_EXCEPTION, TokenOutcome, is_session_expired};
pub use tokens::{AuthToken, SessionNonce};
