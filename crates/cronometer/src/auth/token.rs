//! Authorization token generation.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::config::ClientConfig;
use crate::error::{AuthError, ProtocolError};
use crate::rpc::{RpcClient, RpcFailure, RpcResult, calls};

use super::session::AuthenticatedSession;
use super::tokens::AuthToken;

/// Exception class prefix the service uses when a session is no longer valid.
pub const NOT_LOGGED_IN_EXCEPTION: &str = "com.cronometer.shared.user.exceptions.NotLoggedInException/";

/// Result of asking the service for a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenOutcome {
    Issued(AuthToken),
    /// The service no longer recognizes the session; logging in again may help.
    SessionExpired(RpcFailure),
}

/// Returns true if `failure` reports that the session is not logged in.
///
/// The exception class must be the not-logged-in class followed by its
/// numeric type signature, e.g. `...NotLoggedInException/1628296535`.
pub fn is_session_expired(failure: &RpcFailure) -> bool {
    failure
        .message_class()
        .and_then(|class| class.strip_prefix(NOT_LOGGED_IN_EXCEPTION))
        .is_some_and(|sig| !sig.is_empty() && sig.bytes().all(|b| b.is_ascii_digit()))
}

/// Mint an export token for a live session.
///
/// An expired session is reported as [`TokenOutcome::SessionExpired`] rather
/// than an error so the caller can decide whether to log in again. Any other
/// failure is an [`AuthError::RpcFailure`].
#[instrument(skip_all, fields(user_id = live.session().user_id()))]
pub(crate) async fn generate_token(
    config: &ClientConfig,
    live: &AuthenticatedSession,
) -> Result<TokenOutcome> {
    let session = live.session();
    let request = calls::generate_authorization_token(
        &config.service.module_base(),
        session.nonce().as_str(),
        session.user_id(),
    );

    match RpcClient::new(live.http(), config).call(&request).await? {
        RpcResult::Ok(payload) => {
            debug!("Authorization token issued");
            Ok(TokenOutcome::Issued(token_from(&payload)?))
        }
        RpcResult::Failure(failure) if is_session_expired(&failure) => {
            warn!("Session expired");
            Ok(TokenOutcome::SessionExpired(failure))
        }
        RpcResult::Failure(failure) => Err(AuthError::RpcFailure(failure).into()),
    }
}

fn token_from(payload: &[Value]) -> Result<AuthToken> {
    payload
        .get(1)
        .and_then(Value::as_str)
        .map(AuthToken::new)
        .ok_or_else(|| {
            ProtocolError::UnexpectedPayload {
                method: calls::GENERATE_AUTHORIZATION_TOKEN,
                reason: "second element is not a token string",
                payload: Value::Array(payload.to_vec()).to_string(),
            }
            .into()
        })
}
