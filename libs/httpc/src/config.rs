use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("httpc/", env!("CARGO_PKG_VERSION"));

/// Default number of redirects followed by [`HttpClient`](crate::HttpClient)
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Configuration of the bundled [`HttpClient`](crate::HttpClient) transport
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout (default: 30 seconds)
    ///
    /// Covers the whole exchange up to the response head, including any
    /// redirects that are followed. Body reads are not covered.
    pub request_timeout: Duration,

    /// User-Agent header value, used when the request sets none
    /// (default: `httpc/<version>`)
    pub user_agent: String,

    /// Maximum number of redirects to follow (default: 10)
    ///
    /// `0` disables redirect following: 3xx responses are returned as-is.
    pub max_redirects: usize,

    /// Timeout for idle connections in the pool (default: 90 seconds)
    ///
    /// Set to `None` to use hyper-util's default idle timeout.
    pub pool_idle_timeout: Option<Duration>,

    /// Maximum number of idle connections per host (default: 32)
    ///
    /// Setting this to `0` disables connection reuse entirely.
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Short timeout, no redirect following
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_redirects: 0,
            ..Self::default()
        }
    }

    /// Configuration for tests against local mock servers
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            max_redirects: 0,
            pool_idle_timeout: None,
            ..Self::default()
        }
    }
}
