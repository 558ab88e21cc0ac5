//! Response body decoding driven by the `Content-Encoding` header.

use http::HeaderMap;
use std::io::Read;

/// Internal buffer size for the brotli decoder
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Decompression strategy selected from the response `Content-Encoding`.
///
/// Only the exact values `gzip` and `br` are recognized; anything else,
/// including a missing header, is treated as identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    Brotli,
    Identity,
}

impl ContentEncoding {
    #[must_use]
    pub fn from_header_value(value: Option<&str>) -> Self {
        match value {
            Some("gzip") => ContentEncoding::Gzip,
            Some("br") => ContentEncoding::Brotli,
            _ => ContentEncoding::Identity,
        }
    }

    /// Select the strategy from the first `Content-Encoding` header value.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_header_value(
            headers
                .get(http::header::CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok()),
        )
    }
}

/// Decode a fully buffered body.
///
/// Gzip failures are swallowed: the bytes decoded before the failure are
/// returned (nothing when the gzip header itself is invalid) and a warning
/// is logged. Brotli failures are returned to the caller.
///
/// # Errors
/// Returns the underlying I/O error when brotli decoding fails.
pub fn decode_body(encoding: ContentEncoding, raw: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut out = Vec::new();
    match encoding {
        ContentEncoding::Gzip => {
            let mut decoder = flate2::read::MultiGzDecoder::new(raw);
            if let Err(e) = decoder.read_to_end(&mut out) {
                tracing::warn!(
                    error = %e,
                    decoded = out.len(),
                    "gzip decoding failed; returning bytes decoded so far"
                );
            }
        }
        ContentEncoding::Brotli => {
            let mut decoder = brotli::Decompressor::new(raw, BROTLI_BUFFER_SIZE);
            decoder.read_to_end(&mut out)?;
        }
        ContentEncoding::Identity => out.extend_from_slice(raw),
    }
    Ok(out)
}
