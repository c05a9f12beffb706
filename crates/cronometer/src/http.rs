//! HTTP client bound to a single cookie jar.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use tracing::trace;
use url::Url;

use crate::Result;
use crate::config::ClientConfig;
use crate::error::TransportError;

/// An HTTP client together with the cookie jar it reads and writes.
///
/// One `HttpSession` is created per login. The cookies set during that login
/// are what make the resulting session valid, so the two are never separated.
#[derive(Debug, Clone)]
pub(crate) struct HttpSession {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl HttpSession {
    /// Create a client with an empty cookie jar.
    pub(crate) fn new(config: &ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self { client, jar })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Look up a cookie that would be sent to `url`.
    pub(crate) fn cookie(&self, url: &str, name: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let header = self.jar.cookies(&url)?;
        let header = header.to_str().ok()?;
        find_cookie(header, name).map(str::to_string)
    }
}

fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Pass a success response through; turn anything else into a status error.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    trace!(status = %status, url = %response.url(), "HTTP response");

    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        url,
        body,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cookie_among_several() {
        assert_eq!(find_cookie("a=1; sesnonce=N1; b=2", "sesnonce"), Some("N1"));
        assert_eq!(find_cookie("sesnonce=N1", "sesnonce"), Some("N1"));
        assert_eq!(find_cookie("xsesnonce=N1", "sesnonce"), None);
        assert_eq!(find_cookie("", "sesnonce"), None);
    }

    #[test]
    fn reads_cookie_set_in_jar() {
        let http = HttpSession::new(&ClientConfig::default()).unwrap();
        let url = Url::parse("https://cronometer.com/cronometer/app").unwrap();
        http.jar.add_cookie_str("sesnonce=N1; Path=/", &url);

        assert_eq!(
            http.cookie("https://cronometer.com/cronometer/app", "sesnonce"),
            Some("N1".to_string())
        );
        assert_eq!(http.cookie("https://cronometer.com/export", "other"), None);
    }

    #[test]
    fn fresh_sessions_do_not_share_cookies() {
        let config = ClientConfig::default();
        let first = HttpSession::new(&config).unwrap();
        let second = HttpSession::new(&config).unwrap();
        let url = Url::parse("https://cronometer.com/").unwrap();
        first.jar.add_cookie_str("sesnonce=N1; Path=/", &url);

        assert!(second.cookie("https://cronometer.com/", "sesnonce").is_none());
    }
}
