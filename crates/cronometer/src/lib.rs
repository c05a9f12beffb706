//! cronometer - client for the Cronometer export protocol
//!
//! This library logs in to Cronometer through its HTML login form, opens a
//! session over the service's pipe-delimited RPC protocol, mints short-lived
//! authorization tokens, and streams data exports.
//!
//! All exports flow through a [`Client`], which owns the credentials and logs
//! in again when the service reports the session as expired.
//!
//! # Example
//!
//! ```no_run
//! use cronometer::{Client, Credentials, ExportParams};
//! use futures_util::StreamExt;
//!
//! # async fn example() -> Result<(), cronometer::Error> {
//! let client = Client::new(Credentials::new("alice@example.com", "hunter2"));
//!
//! let params = ExportParams::from([
//!     ("generate".to_string(), "dailySummary".to_string()),
//!     ("start".to_string(), "2024-01-01".to_string()),
//!     ("end".to_string(), "2024-01-31".to_string()),
//! ]);
//!
//! let mut export = client.export(&params).await?;
//! while let Some(chunk) = export.next().await {
//!     print!("{}", String::from_utf8_lossy(&chunk?));
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
mod http;
pub mod rpc;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{AuthToken, Credentials, Session};
pub use client::{Client, ExportParams, ExportStream};
pub use config::ClientConfig;
pub use error::Error;
pub use types::ServiceUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
