//! `multipart/form-data` body writer (RFC 7578).
//!
//! Parts are appended into an in-memory buffer; the closing delimiter is
//! written by [`MultipartWriter::finish`].

use bytes::Bytes;

/// Content type used for file parts.
const FILE_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// Number of random bytes in a generated boundary (hex-encoded on the wire).
const BOUNDARY_RANDOM_BYTES: usize = 30;

#[derive(Debug)]
pub struct MultipartWriter {
    boundary: String,
    buf: Vec<u8>,
    has_parts: bool,
}

impl MultipartWriter {
    /// Create a writer with a random boundary.
    #[must_use]
    pub fn new() -> Self {
        let random: [u8; BOUNDARY_RANDOM_BYTES] = rand::random();
        let boundary = random
            .iter()
            .flat_map(|b| [b >> 4, b & 0x0f])
            .filter_map(|nibble| char::from_digit(u32::from(nibble), 16))
            .collect::<String>();
        Self::with_boundary(boundary)
    }

    /// Create a writer with a fixed boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: Vec::new(),
            has_parts: false,
        }
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` header value announcing this writer's boundary.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a plain form field.
    pub fn text_field(&mut self, name: &str, value: &str) {
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(name));
        self.part(&disposition, None, value.as_bytes());
    }

    /// Append a file field carrying `data` under `filename`.
    pub fn file_field(&mut self, name: &str, filename: &str, data: &[u8]) {
        let disposition = format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quotes(name),
            escape_quotes(filename)
        );
        self.part(&disposition, Some(FILE_PART_CONTENT_TYPE), data);
    }

    /// Write the closing delimiter and return the encoded body.
    #[must_use]
    pub fn finish(mut self) -> Bytes {
        if self.has_parts {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"--\r\n");
        Bytes::from(self.buf)
    }

    fn part(&mut self, disposition: &str, content_type: Option<&str>, body: &[u8]) {
        // Every part after the first is preceded by the CRLF that ends the previous body
        if self.has_parts {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"\r\n");

        self.buf.extend_from_slice(b"Content-Disposition: ");
        self.buf.extend_from_slice(disposition.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        if let Some(content_type) = content_type {
            self.buf.extend_from_slice(b"Content-Type: ");
            self.buf.extend_from_slice(content_type.as_bytes());
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"\r\n");

        self.buf.extend_from_slice(body);
        self.has_parts = true;
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_random_boundary_is_hex() {
        let writer = MultipartWriter::new();
        assert_eq!(writer.boundary().len(), BOUNDARY_RANDOM_BYTES * 2);
        assert!(writer.boundary().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            writer.content_type(),
            format!("multipart/form-data; boundary={}", writer.boundary())
        );
    }

    #[test]
    fn test_boundaries_differ() {
        assert_ne!(
            MultipartWriter::new().boundary(),
            MultipartWriter::new().boundary()
        );
    }

    #[test]
    fn test_file_and_text_fields() {
        let mut writer = MultipartWriter::with_boundary("XyZ");
        writer.file_field("upload", "report.csv", b"a,b\n1,2\n");
        writer.text_field("note", "hello");
        let body = writer.finish();

        let expected = "--XyZ\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"report.csv\"\r\n\
            Content-Type: application/octet-stream\r\n\
            \r\n\
            a,b\n1,2\n\
            \r\n--XyZ\r\n\
            Content-Disposition: form-data; name=\"note\"\r\n\
            \r\n\
            hello\
            \r\n--XyZ--\r\n";
        assert_eq!(std::str::from_utf8(&body).unwrap(), expected);
    }

    #[test]
    fn test_empty_body_has_only_closing_delimiter() {
        let body = MultipartWriter::with_boundary("b").finish();
        assert_eq!(body.as_ref(), b"--b--\r\n");
    }

    #[test]
    fn test_quotes_are_escaped() {
        let mut writer = MultipartWriter::with_boundary("b");
        writer.text_field("we\"ird\\name", "v");
        let body = writer.finish();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(
            text.contains("name=\"we\\\"ird\\\\name\""),
            "unexpected body: {text}"
        );
    }
}
