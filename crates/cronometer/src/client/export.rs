//! Export requests and the streamed response body.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::Result;
use crate::auth::AuthToken;
use crate::error::Error;

/// Caller-supplied export options, such as `generate`, `start` and `end`.
pub type ExportParams = BTreeMap<String, String>;

/// Query parameter carrying the authorization token.
pub const NONCE_PARAM: &str = "nonce";

/// Build the export query: the token first, then caller params in key order.
///
/// A caller-supplied `nonce` is dropped; the fresh token always wins.
pub fn merge_export_params(token: &AuthToken, params: &ExportParams) -> Vec<(String, String)> {
    let mut query = Vec::with_capacity(params.len() + 1);
    query.push((NONCE_PARAM.to_string(), token.as_str().to_string()));

    for (key, value) in params {
        if key == NONCE_PARAM {
            warn!("Ignoring caller-supplied nonce parameter");
            continue;
        }
        query.push((key.clone(), value.clone()));
    }

    query
}

/// The body of an export response, read lazily as it arrives.
///
/// The stream owns its connection and can be read once. Drain it or drop it
/// to release the connection.
pub struct ExportStream {
    content_type: Option<String>,
    inner: Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>,
}

impl ExportStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            content_type,
            inner: Box::pin(response.bytes_stream().map_err(Error::from)),
        }
    }

    /// Content type reported by the server, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Drain the stream into `writer`, returning the number of bytes written.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        debug!(bytes = written, "Export drained");
        Ok(written)
    }
}

impl Stream for ExportStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ExportStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
