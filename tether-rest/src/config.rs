//! Transport and handler configuration.

use std::time::Duration;

use tether_config::{ApiSettings, DEFAULT_REQUEST_ATTEMPTS_LIMIT};

/// Fixed delay between retries of a timed-out request.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Configuration of the reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// How long idle connections are kept.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip compression.
    pub gzip: bool,
    /// Enable brotli compression.
    pub brotli: bool,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 32,
            user_agent: format!("tether-rest/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            brotli: true,
            follow_redirects: true,
            max_redirects: 10,
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for transport configuration.
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Set the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the connection pool idle timeout.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip compression.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    /// Enable or disable brotli compression.
    pub fn brotli(mut self, enable: bool) -> Self {
        self.config.brotli = enable;
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TransportConfig {
        self.config
    }
}

/// Configuration shared by every call made through a [`Handler`](crate::Handler).
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Base API URL every endpoint is joined onto.
    pub api_url: String,
    /// Headers applied to every payload before the per-call headers.
    pub auth_headers: Vec<(String, String)>,
    /// Maximum number of timeout retries per call.
    pub request_attempts_limit: u32,
    /// Delay before each retry.
    pub retry_delay: Duration,
}

impl HandlerConfig {
    /// Create a configuration for the given API URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            auth_headers: Vec::new(),
            request_attempts_limit: DEFAULT_REQUEST_ATTEMPTS_LIMIT,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Create a configuration builder.
    pub fn builder(api_url: impl Into<String>) -> HandlerConfigBuilder {
        HandlerConfigBuilder {
            config: Self::new(api_url),
        }
    }

    /// Create a configuration from loaded settings.
    ///
    /// A missing API URL is kept empty and rejected when the handler is built.
    pub fn from_settings(settings: &ApiSettings) -> Self {
        let mut config = Self::new(settings.api_url.clone().unwrap_or_default());
        config.request_attempts_limit = settings.request_attempts_limit;
        config
    }
}

/// Builder for handler configuration.
#[derive(Debug)]
pub struct HandlerConfigBuilder {
    config: HandlerConfig,
}

impl HandlerConfigBuilder {
    /// Add a header applied to every call.
    pub fn auth_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.auth_headers.push((name.into(), value.into()));
        self
    }

    /// Set the maximum number of timeout retries per call.
    pub fn request_attempts_limit(mut self, limit: u32) -> Self {
        self.config.request_attempts_limit = limit;
        self
    }

    /// Set the delay before each retry.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HandlerConfig {
        self.config
    }
}
