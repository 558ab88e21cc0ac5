use crate::response::ResponseHead;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Classification of URL validation failures.
///
/// Provides programmatic matching for different failure modes without
/// relying on unstable error message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// URL could not be parsed (malformed syntax)
    ParseError,
    /// URL is missing required host/authority component
    MissingAuthority,
    /// URL is missing required scheme (http/https)
    MissingScheme,
    /// URL scheme is not `http` or `https`
    UnsupportedScheme,
}

/// Errors produced while building, dispatching or consuming a request.
///
/// Construction, I/O and transport failures are captured at dispatch and
/// returned unchanged by every terminal consumer of [`Sent`](crate::Sent).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpcError {
    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Method text is not a valid HTTP token
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] http::method::InvalidMethod),

    /// Invalid header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Invalid URL
    ///
    /// Use the `kind` field for programmatic matching. The `reason` field is
    /// a diagnostic message intended for logging only.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri {
        /// The URL that failed validation
        url: String,
        /// Structured failure classification
        kind: InvalidUriKind,
        /// Diagnostic message (unstable format)
        reason: String,
    },

    /// Form URL encoding error
    #[error("Form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// Local file could not be opened, read or written
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport error (network, connection, etc)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request attempt timed out inside the transport
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Response status was not exactly `200 OK`
    ///
    /// The response head is kept so callers can still inspect the response;
    /// the body is never read.
    #[error("{status_line}")]
    Status {
        status_line: String,
        head: Box<ResponseHead>,
    },

    /// Response status was not `200 OK` when saving to a file
    #[error("Not written")]
    NotWritten,

    /// Response body could not be decoded
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] std::io::Error),
}

impl HttpcError {
    /// Response head attached to a [`HttpcError::Status`] failure.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseHead> {
        match self {
            HttpcError::Status { head, .. } => Some(head),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HttpcError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<hyper::Error> for HttpcError {
    fn from(err: hyper::Error) -> Self {
        HttpcError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpcError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpcError::Transport(Box::new(err))
    }
}
