//! Client configuration.

use std::time::Duration;

use crate::types::ServiceUrl;

/// Default timeout for login and RPC requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration shared by every request a client makes.
///
/// `request_timeout` bounds login and RPC requests only. Export requests
/// run without a response timeout.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub service: ServiceUrl,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for a service other than the public one.
    pub fn for_service(service: ServiceUrl) -> Self {
        Self {
            service,
            ..Self::default()
        }
    }

    /// Set the timeout for login and RPC requests.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout, which also applies to exports.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: ServiceUrl::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: concat!("cronometer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_service_keeps_default_timeouts() {
        let service = ServiceUrl::new("http://localhost:9000").unwrap();
        let config = ClientConfig::for_service(service.clone());
        assert_eq!(config.service, service);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.user_agent.starts_with("cronometer/"));
    }

    #[test]
    fn timeout_builders_override_defaults() {
        let config = ClientConfig::default()
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.service, ServiceUrl::default());
    }
}
