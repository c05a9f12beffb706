//! Error types for the cronometer client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, decoding, input validation and local
//! I/O errors. Variants that originate from the server keep the raw server
//! output.

use thiserror::Error;

use crate::rpc::RpcFailure;

/// The unified error type for cronometer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors and non-success HTTP statuses.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected credentials, RPC failures, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The remote service answered with a page or payload of unexpected shape.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An RPC response body did not match the `//OK` / JSON array envelope.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Input validation errors (service URL, header values).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Local I/O failure while writing an export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error means the server no longer accepts the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::Auth(AuthError::SessionExpired(_)))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}: {body}")]
    Status { status: u16, url: String, body: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login endpoint rejected the credentials.
    #[error("login rejected{}: {message}", status_suffix(.status))]
    Rejected {
        /// HTTP status, when the rejection came as a non-success status.
        status: Option<u16>,
        /// Server-provided message or body.
        message: String,
    },

    /// An RPC call failed for a reason other than an expired session.
    #[error("RPC call failed: {0}")]
    RpcFailure(RpcFailure),

    /// The session was still reported as expired after logging in again.
    #[error("session expired after re-login: {0}")]
    SessionExpired(RpcFailure),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// The remote service changed shape.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The login page had no `anticsrf` input.
    #[error("login page has no anti-forgery token")]
    MissingAntiForgeryToken,

    /// The `authenticate` call succeeded but no session nonce cookie was set.
    #[error("no session nonce cookie after authenticate")]
    MissingSessionNonce,

    /// The login submission answered with something other than a JSON object.
    #[error("unexpected login response: {body}")]
    UnexpectedLoginResponse { body: String },

    /// An RPC success payload did not hold the expected values.
    #[error("unexpected {method} payload ({reason}): {payload}")]
    UnexpectedPayload {
        method: &'static str,
        reason: &'static str,
        payload: String,
    },
}

/// RPC response envelope errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is shorter than the four-character status marker.
    #[error("response too short for a status marker: {body:?}")]
    Truncated { body: String },

    /// The text after the marker is not JSON.
    #[error("response is not valid JSON ({source}): {body}")]
    InvalidJson {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The text after the marker is JSON but not an array.
    #[error("response is not a JSON array: {body}")]
    NotAnArray { body: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid service URL.
    #[error("invalid service URL '{value}': {reason}")]
    ServiceUrl { value: String, reason: String },

    /// A value could not be used as an HTTP header.
    #[error("invalid header value for {name}: {reason}")]
    Header { name: &'static str, reason: String },
}
