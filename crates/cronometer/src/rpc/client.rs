//! RPC HTTP client implementation.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, instrument, trace};

use crate::Result;
use crate::config::ClientConfig;
use crate::error::InvalidInputError;
use crate::http::{HttpSession, ensure_success};

use super::calls::{MODULE_BASE_HEADER, PERMUTATION_HEADER, PERMUTATION_STRONG_NAME, RPC_CONTENT_TYPE};
use super::codec::{RpcRequest, RpcResult, decode};

/// Issues RPC calls over a session's HTTP client.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RpcClient<'a> {
    http: &'a HttpSession,
    config: &'a ClientConfig,
}

impl<'a> RpcClient<'a> {
    pub(crate) fn new(http: &'a HttpSession, config: &'a ClientConfig) -> Self {
        Self { http, config }
    }

    /// Send a request and decode the response envelope.
    ///
    /// A non-success HTTP status is a transport error; an RPC-level failure
    /// is returned as [`RpcResult::Failure`].
    #[instrument(skip(self, request), fields(method = request.method))]
    pub(crate) async fn call(&self, request: &RpcRequest) -> Result<RpcResult> {
        let url = self.config.service.rpc_url();
        let frame = request.encode();
        debug!(%url, "RPC call");
        trace!(frame = %request.encode_redacted(), "RPC frame");

        let response = self
            .http
            .client()
            .post(&url)
            .headers(self.headers(&request.module_base)?)
            .timeout(self.config.request_timeout)
            .body(frame)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body = response.text().await?;
        trace!(len = body.len(), "RPC response");

        Ok(decode(&body)?)
    }

    fn headers(&self, module_base: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(RPC_CONTENT_TYPE));
        headers.insert(
            MODULE_BASE_HEADER,
            HeaderValue::from_str(module_base).map_err(|e| InvalidInputError::Header {
                name: MODULE_BASE_HEADER,
                reason: e.to_string(),
            })?,
        );
        headers.insert(
            PERMUTATION_HEADER,
            HeaderValue::from_static(PERMUTATION_STRONG_NAME),
        );
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::calls;

    #[test]
    fn headers_identify_module_and_permutation() {
        let config = ClientConfig::default();
        let http = HttpSession::new(&config).unwrap();
        let client = RpcClient::new(&http, &config);

        let headers = client.headers(&config.service.module_base()).unwrap();
        assert_eq!(headers[CONTENT_TYPE], RPC_CONTENT_TYPE);
        assert_eq!(
            headers[MODULE_BASE_HEADER],
            "https://cronometer.com/cronometer/"
        );
        assert_eq!(headers[PERMUTATION_HEADER], PERMUTATION_STRONG_NAME);
    }

    #[test]
    fn traced_frame_hides_nonce() {
        let request =
            calls::generate_authorization_token("https://cronometer.com/cronometer/", "N1SECRET", 42);
        let shown = request.encode_redacted();
        assert!(!shown.contains("N1SECRET"));
        assert!(shown.ends_with("|[REDACTED]|1|2|3|4|4|5|6|6|7|8|42|3600|7|2|"));
    }

    #[test]
    fn traced_frame_with_short_nonce_keeps_payload() {
        let request = calls::generate_authorization_token("https://cronometer.com/cronometer/", "1", 1);
        let plain = request.encode();
        let shown = request.encode_redacted();

        let payload = |frame: &str| frame.split_once("|1|2|3|4|").map(|(_, rest)| rest.to_string());
        assert_eq!(payload(&shown), payload(&plain));
        assert!(shown.contains("|[REDACTED]|1|2|3|4|4|5|6|6|7|8|1|3600|7|2|"));
    }
}
