use crate::error::HttpcError;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;

/// Type alias for the boxed response body.
///
/// The body is type-erased so any transport can hand back its own body type.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Fully built request handed to a [`Transport`].
pub type WireRequest = http::Request<Full<Bytes>>;

/// Response returned by a [`Transport`]; the body has not been read.
pub type WireResponse = http::Response<ResponseBody>;

/// Network collaborator performing exactly one HTTP exchange per call.
///
/// Connection pooling, TLS, redirects and timeouts are the implementor's
/// concern. [`HttpClient`](crate::HttpClient) is the bundled implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response head with an unread body.
    ///
    /// # Errors
    /// Returns an error when no response could be obtained.
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, HttpcError>;
}
