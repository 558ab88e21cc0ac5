use crate::builder::HttpClientBuilder;
use crate::error::HttpcError;
use crate::request::Request;
use crate::transport::{Transport, WireRequest, WireResponse};
use async_trait::async_trait;
use http::HeaderValue;
use http::header::USER_AGENT;
use std::sync::Arc;
use tower::ServiceExt;
use tower::util::BoxCloneSyncService;

/// Boxed tower stack driving the hyper client
pub(crate) type ClientService = BoxCloneSyncService<WireRequest, WireResponse, HttpcError>;

/// Production [`Transport`] backed by hyper with rustls.
///
/// Connections are pooled across requests. Redirects and the per-request
/// timeout are handled by the tower stack configured through
/// [`HttpClientBuilder`]. Response bodies are returned undecoded.
///
/// `HttpClient` is `Clone + Send + Sync`; clones share the connection pool.
///
/// # Example
///
/// ```ignore
/// let client = HttpClient::new()?;
/// let (head, text) = client
///     .request()
///     .set_url("https://example.com/")
///     .send()
///     .await
///     .end()
///     .await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: ClientService,
    pub(crate) user_agent: HeaderValue,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpcError> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring the HTTP client
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Start a new `GET` request dispatched through this client.
    pub fn request(&self) -> Request {
        Request::new(Arc::new(self.clone()))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, mut request: WireRequest) -> Result<WireResponse, HttpcError> {
        // A User-Agent set on the request wins
        if !request.headers().contains_key(USER_AGENT) {
            request
                .headers_mut()
                .insert(USER_AGENT, self.user_agent.clone());
        }

        self.service.clone().oneshot(request).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::body::{BodyMode, FORM_CONTENT_TYPE};
    use crate::config::{DEFAULT_USER_AGENT, HttpClientConfig};
    use crate::cookie::Cookie;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use httpmock::prelude::*;
    use std::io::Write;
    use std::time::Duration;

    fn test_client() -> HttpClient {
        HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/hello");
            then.status(200)
                .header("content-type", "text/plain")
                .body("hello world");
        });

        let (head, text) = test_client()
            .request()
            .set_url(server.url("/hello"))
            .send()
            .await
            .end()
            .await
            .unwrap();

        mock.assert();
        assert_eq!(head.status(), http::StatusCode::OK);
        assert_eq!(head.headers()["content-type"], "text/plain");
        assert_eq!(text, "hello world");
    }

    #[tokio::test]
    async fn test_default_user_agent_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ua")
                .header("user-agent", DEFAULT_USER_AGENT);
            then.status(200);
        });

        let result = test_client()
            .request()
            .set_url(server.url("/ua"))
            .send()
            .await
            .end()
            .await;

        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_request_user_agent_wins() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ua").header("user-agent", "probe/2.0");
            then.status(200);
        });

        let result = test_client()
            .request()
            .set_url(server.url("/ua"))
            .set_header("User-Agent", "probe/2.0")
            .send()
            .await
            .end()
            .await;

        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_post_form_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/login")
                .header("content-type", FORM_CONTENT_TYPE)
                .body("pass=p%26ss&user=bob");
            then.status(200).body("welcome");
        });

        let (_, text) = test_client()
            .request()
            .set_method("post")
            .set_url(server.url("/login"))
            .set_data("user", "bob")
            .set_data("pass", "p&ss")
            .send()
            .await
            .end()
            .await
            .unwrap();

        mock.assert();
        assert_eq!(text, "welcome");
    }

    #[tokio::test]
    async fn test_post_json_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/items")
                .header("content-type", "application/json")
                .body(r#"{"id":7}"#);
            then.status(200).body("stored");
        });

        let (_, text) = test_client()
            .request()
            .set_method("POST")
            .set_url(server.url("/items"))
            .set_header("Content-Type", "application/json")
            .set_json_data(r#"{"id":7}"#)
            .send_as(BodyMode::Json)
            .await
            .end()
            .await
            .unwrap();

        mock.assert();
        assert_eq!(text, "stored");
    }

    #[tokio::test]
    async fn test_cookies_sent_in_single_header() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/session")
                .header("cookie", "sid=abc; theme=dark");
            then.status(200);
        });

        let result = test_client()
            .request()
            .set_url(server.url("/session"))
            .set_cookies([Cookie::new("sid", "abc"), Cookie::new("theme", "dark")])
            .send()
            .await
            .end()
            .await;

        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_gzip_body_is_decoded() {
        let server = MockServer::start();
        let compressed = gzip(b"compressed payload");
        server.mock(|when, then| {
            when.method(GET).path("/gz");
            then.status(200)
                .header("content-encoding", "gzip")
                .body(compressed.clone());
        });

        let (_, text) = test_client()
            .request()
            .set_url(server.url("/gz"))
            .send()
            .await
            .end()
            .await
            .unwrap();

        assert_eq!(text, "compressed payload");
    }

    #[tokio::test]
    async fn test_non_200_status_is_error_with_head() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("nope");
        });

        let err = test_client()
            .request()
            .set_url(server.url("/missing"))
            .send()
            .await
            .end()
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "404 Not Found");
        let head = err.response().unwrap();
        assert_eq!(head.status(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_created_is_not_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/things");
            then.status(201).body("created");
        });

        let err = test_client()
            .request()
            .set_method("POST")
            .set_url(server.url("/things"))
            .send()
            .await
            .end()
            .await
            .unwrap_err();

        assert!(matches!(err, HttpcError::Status { .. }));
        assert_eq!(err.to_string(), "201 Created");
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "file contents").unwrap();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/upload")
                .header_exists("content-type")
                .body_includes("name=\"doc\"; filename=\"notes.txt\"")
                .body_includes("file contents")
                .body_includes("name=\"title\"")
                .body_includes("quarterly");
            then.status(200).body("ok");
        });

        let (_, text) = test_client()
            .request()
            .set_method("POST")
            .set_url(server.url("/upload"))
            .set_file_data("doc", path.to_str().unwrap(), true)
            .set_file_data("title", "quarterly", false)
            .send_as(BodyMode::Multipart)
            .await
            .end()
            .await
            .unwrap();

        mock.assert();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_end_file_saves_raw_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/files/report.csv");
            then.status(200).body("a,b\n1,2\n");
        });
        let dir = tempfile::tempdir().unwrap();
        let save_path = format!("{}/", dir.path().display());

        let head = test_client()
            .request()
            .set_url(server.url("/files/report.csv"))
            .send()
            .await
            .end_file(&save_path, "")
            .await
            .unwrap();

        assert_eq!(head.status(), http::StatusCode::OK);
        let saved = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
        assert_eq!(saved, "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_end_file_non_200_not_written() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/files/gone.bin");
            then.status(410);
        });
        let dir = tempfile::tempdir().unwrap();
        let save_path = format!("{}/", dir.path().display());

        let err = test_client()
            .request()
            .set_url(server.url("/files/gone.bin"))
            .send()
            .await
            .end_file(&save_path, "out.bin")
            .await
            .unwrap_err();

        assert!(matches!(err, HttpcError::NotWritten));
        assert!(err.response().is_none());
        assert!(!dir.path().join("out.bin").exists());
    }

    #[tokio::test]
    async fn test_redirect_is_followed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(302).header("location", server.url("/new"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/new");
            then.status(200).body("moved here");
        });

        let client = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .max_redirects(3)
            .build()
            .unwrap();
        let (_, text) = client
            .request()
            .set_url(server.url("/old"))
            .send()
            .await
            .end()
            .await
            .unwrap();

        assert_eq!(text, "moved here");
    }

    #[tokio::test]
    async fn test_redirect_not_followed_when_disabled() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(301).header("location", server.url("/new"));
        });

        let sent = test_client()
            .request()
            .set_url(server.url("/old"))
            .send()
            .await;

        assert_eq!(sent.status(), Some(http::StatusCode::MOVED_PERMANENTLY));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sent = test_client()
            .request()
            .set_url(format!("http://127.0.0.1:{port}/"))
            .send()
            .await;

        assert!(matches!(sent.error(), Some(HttpcError::Transport(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_secs(2));
        });

        let client = HttpClient::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let err = client
            .request()
            .set_url(server.url("/slow"))
            .send()
            .await
            .end()
            .await
            .unwrap_err();

        assert!(matches!(err, HttpcError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_client_is_clone_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<HttpClient>();
    }
}
