use crate::decode::{ContentEncoding, decode_body};
use crate::error::HttpcError;
use crate::transport::{ResponseBody, WireResponse};
use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use http_body_util::BodyExt;
use tokio::io::AsyncWriteExt;

/// Permission bits for files written by [`Sent::end_file`]
#[cfg(unix)]
const SAVED_FILE_MODE: u32 = 0o777;

/// Status, version and headers of a received response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub(crate) status: StatusCode,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    /// Reason phrase sent by the server when it differs from the canonical one
    pub(crate) reason: Option<String>,
}

impl ResponseHead {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Status code followed by the reason phrase, e.g. `404 Not Found`.
    ///
    /// The server's own phrase is used when it sent a non-canonical one.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.reason.as_deref().or_else(|| self.status.canonical_reason()) {
            Some(reason) => format!("{} {reason}", self.status.as_u16()),
            None => self.status.as_u16().to_string(),
        }
    }
}

impl From<http::response::Parts> for ResponseHead {
    fn from(parts: http::response::Parts) -> Self {
        Self {
            status: parts.status,
            version: parts.version,
            reason: parts
                .extensions
                .get::<hyper::ext::ReasonPhrase>()
                .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned()),
            headers: parts.headers,
        }
    }
}

/// Outcome of dispatching a [`Request`](crate::Request).
///
/// Holds either the received response or the error that stopped the
/// dispatch. Consumed by exactly one of [`end`](Sent::end),
/// [`end_bytes`](Sent::end_bytes) or [`end_file`](Sent::end_file); a failed
/// dispatch makes each of them return the original error without doing any
/// work.
#[must_use = "Sent does nothing until consumed by end(), end_bytes() or end_file()"]
#[derive(Debug)]
pub struct Sent {
    outcome: Result<Exchange, HttpcError>,
}

#[derive(Debug)]
struct Exchange {
    /// Request URL exactly as passed to `set_url`
    url: String,
    response: WireResponse,
}

/// Body bytes read before the stream ended or failed.
struct BodyRead {
    bytes: Vec<u8>,
    error: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Sent {
    pub(crate) fn received(url: String, response: WireResponse) -> Self {
        Self {
            outcome: Ok(Exchange { url, response }),
        }
    }

    pub(crate) fn failed(error: HttpcError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    /// Error captured during dispatch, if any.
    #[must_use]
    pub fn error(&self) -> Option<&HttpcError> {
        self.outcome.as_ref().err()
    }

    /// Status of the received response, if the dispatch succeeded.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.outcome.as_ref().ok().map(|e| e.response.status())
    }

    /// Read and decode the body as text.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement
    /// character.
    ///
    /// # Errors
    /// Same as [`end_bytes`](Sent::end_bytes).
    pub async fn end(self) -> Result<(ResponseHead, String), HttpcError> {
        let (head, body) = self.end_bytes().await?;
        Ok((head, String::from_utf8_lossy(&body).into_owned()))
    }

    /// Read and decode the body as bytes.
    ///
    /// Only `200 OK` is accepted. The body is decompressed according to
    /// `Content-Encoding` (`gzip`, `br`, anything else as-is). Gzip failures
    /// are not reported: the result holds whatever was decoded before the
    /// failure, which is nothing when the gzip header itself is invalid.
    ///
    /// # Errors
    /// - the dispatch error, unchanged, if the dispatch failed
    /// - `HttpcError::Status` carrying the response head for any status other than 200
    /// - `HttpcError::Transport` if reading a non-gzip body fails
    /// - `HttpcError::Decode` if brotli decoding fails
    pub async fn end_bytes(self) -> Result<(ResponseHead, Bytes), HttpcError> {
        let exchange = self.outcome?;
        let (parts, body) = exchange.response.into_parts();
        let head = ResponseHead::from(parts);

        if head.status != StatusCode::OK {
            return Err(HttpcError::Status {
                status_line: head.status_line(),
                head: Box::new(head),
            });
        }

        let encoding = ContentEncoding::from_headers(&head.headers);
        let read = read_body(body).await;
        if let Some(e) = read.error {
            if encoding != ContentEncoding::Gzip {
                return Err(HttpcError::Transport(e));
            }
            tracing::warn!(
                error = %e,
                read = read.bytes.len(),
                "gzip body read failed; decoding bytes read so far"
            );
        }

        let decoded = decode_body(encoding, &read.bytes).map_err(HttpcError::Decode)?;
        Ok((head, Bytes::from(decoded)))
    }

    /// Write the raw (undecoded) body to `save_path` + `file_name`.
    ///
    /// The two parts are concatenated as-is, so `save_path` must carry its own
    /// trailing separator. An empty `file_name` is replaced by the last
    /// `/`-separated segment of the request URL. A failure while reading the
    /// body is not reported; the bytes read so far are written.
    ///
    /// # Errors
    /// - the dispatch error, unchanged, if the dispatch failed
    /// - `HttpcError::NotWritten` for any status other than 200
    /// - `HttpcError::Io` if the file cannot be written
    pub async fn end_file(self, save_path: &str, file_name: &str) -> Result<ResponseHead, HttpcError> {
        let exchange = self.outcome?;
        if exchange.response.status() != StatusCode::OK {
            return Err(HttpcError::NotWritten);
        }

        let file_name = if file_name.is_empty() {
            file_name_from_url(&exchange.url)
        } else {
            file_name
        };
        let destination = format!("{save_path}{file_name}");

        let (parts, body) = exchange.response.into_parts();
        let read = read_body(body).await;
        if let Some(e) = read.error {
            tracing::warn!(
                error = %e,
                read = read.bytes.len(),
                destination = %destination,
                "body read failed; writing bytes read so far"
            );
        }

        write_file(&destination, &read.bytes)
            .await
            .map_err(|e| HttpcError::io(&destination, e))?;
        tracing::debug!(destination = %destination, bytes = read.bytes.len(), "response saved");

        Ok(ResponseHead::from(parts))
    }
}

/// Last `/`-separated segment of `url`, or an empty string when there is none.
fn file_name_from_url(url: &str) -> &str {
    url.rsplit_once('/').map_or("", |(_, last)| last)
}

/// Read the body to the end, keeping the bytes read before any failure.
async fn read_body(body: ResponseBody) -> BodyRead {
    let mut bytes = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                if let Some(chunk) = frame.data_ref() {
                    bytes.extend_from_slice(chunk);
                }
            }
            Err(e) => {
                return BodyRead {
                    bytes,
                    error: Some(e),
                };
            }
        }
    }

    BodyRead { bytes, error: None }
}

async fn write_file(path: &str, data: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(SAVED_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.flush().await
}
