//! Credential login flow.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::ClientConfig;
use crate::error::{AuthError, ProtocolError};
use crate::http::{HttpSession, ensure_success};
use crate::rpc::{RpcClient, RpcResult, calls};

use super::anticsrf::{ANTI_FORGERY_FIELD, extract_anti_forgery_token};
use super::credentials::Credentials;
use super::session::{AuthenticatedSession, Session};
use super::tokens::SessionNonce;

/// Cookie set by `authenticate` that identifies the RPC session.
pub const SESSION_NONCE_COOKIE: &str = "sesnonce";

/// Log in with a fresh cookie jar and establish an RPC session.
///
/// 1. Fetch the login page and extract the anti-forgery token.
/// 2. Submit the credentials form.
/// 3. Call `authenticate` and read the user id from its payload.
/// 4. Read the session nonce from the `sesnonce` cookie.
///
/// # Errors
///
/// Returns [`AuthError::Rejected`] if the login form is refused and
/// [`AuthError::RpcFailure`] if `authenticate` fails. A page or payload of
/// unexpected shape is a [`ProtocolError`].
#[instrument(skip_all, fields(service = %config.service, username = %credentials.username()))]
pub(crate) async fn login(
    config: &ClientConfig,
    credentials: &Credentials,
) -> Result<AuthenticatedSession> {
    info!("Logging in");

    let http = HttpSession::new(config)?;

    let anti_forgery = fetch_anti_forgery_token(&http, config).await?;
    submit_credentials(&http, config, credentials, &anti_forgery).await?;

    let rpc = RpcClient::new(&http, config);
    let user_id = match rpc
        .call(&calls::authenticate(&config.service.module_base()))
        .await?
    {
        RpcResult::Ok(payload) => user_id_from(&payload)?,
        RpcResult::Failure(failure) => {
            warn!(%failure, "authenticate failed");
            return Err(AuthError::RpcFailure(failure).into());
        }
    };

    let nonce = http
        .cookie(&config.service.rpc_url(), SESSION_NONCE_COOKIE)
        .ok_or(ProtocolError::MissingSessionNonce)?;

    debug!(user_id, "Session established");

    Ok(AuthenticatedSession::new(
        Session::new(user_id, SessionNonce::new(nonce)),
        http,
    ))
}

async fn fetch_anti_forgery_token(http: &HttpSession, config: &ClientConfig) -> Result<String> {
    let url = config.service.login_page_url();
    debug!(%url, "Fetching login page");

    let response = http
        .client()
        .get(&url)
        .timeout(config.request_timeout)
        .send()
        .await?;
    let page = ensure_success(response).await?.text().await?;

    Ok(extract_anti_forgery_token(&page).ok_or(ProtocolError::MissingAntiForgeryToken)?)
}

async fn submit_credentials(
    http: &HttpSession,
    config: &ClientConfig,
    credentials: &Credentials,
    anti_forgery: &str,
) -> Result<()> {
    let url = config.service.login_url();
    debug!(%url, "Submitting credentials");

    let response = http
        .client()
        .post(&url)
        .form(&[
            ("username", credentials.username()),
            ("password", credentials.password()),
            (ANTI_FORGERY_FIELD, anti_forgery),
        ])
        .timeout(config.request_timeout)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AuthError::Rejected {
            status: Some(status.as_u16()),
            message: body,
        }
        .into());
    }

    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(&body) else {
        return Err(ProtocolError::UnexpectedLoginResponse { body }.into());
    };

    if let Some(error) = fields.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(AuthError::Rejected {
            status: None,
            message,
        }
        .into());
    }

    Ok(())
}

fn user_id_from(payload: &[Value]) -> Result<i64> {
    payload.first().and_then(Value::as_i64).ok_or_else(|| {
        ProtocolError::UnexpectedPayload {
            method: calls::AUTHENTICATE,
            reason: "first element is not an integer user id",
            payload: Value::Array(payload.to_vec()).to_string(),
        }
        .into()
    })
}
