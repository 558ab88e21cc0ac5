use crate::error::HttpcError;
use crate::multipart::MultipartWriter;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Default `Content-Type` for url-encoded POST bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Request body encoding mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyMode {
    /// Url-encoded form fields
    #[default]
    UrlEncoded,
    /// Raw JSON text, sent verbatim
    Json,
    /// `multipart/form-data` with file and plain fields
    Multipart,
}

impl BodyMode {
    /// Map a textual selector onto a mode.
    ///
    /// `"url"` and `"url-encoded"` select [`BodyMode::UrlEncoded`], `"json"`
    /// selects [`BodyMode::Json`], every other value selects
    /// [`BodyMode::Multipart`].
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "url" | "url-encoded" => BodyMode::UrlEncoded,
            "json" => BodyMode::Json,
            _ => BodyMode::Multipart,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BodyMode::UrlEncoded => "url-encoded",
            BodyMode::Json => "json",
            BodyMode::Multipart => "multipart",
        }
    }
}

impl From<&str> for BodyMode {
    fn from(selector: &str) -> Self {
        Self::from_selector(selector)
    }
}

impl fmt::Display for BodyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multipart entries, one slot per category.
///
/// A file entry maps a field name to a filesystem path; a plain entry maps a
/// field name to a literal value. Setting an entry replaces the previous
/// entry of the same category, so at most one file field and one plain field
/// are ever sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartFields {
    file: Option<(String, String)>,
    plain: Option<(String, String)>,
}

impl MultipartFields {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, is_file: bool) {
        let entry = Some((name.into(), value.into()));
        if is_file {
            self.file = entry;
        } else {
            self.plain = entry;
        }
    }

    /// File entry as `(field name, path)`
    #[must_use]
    pub fn file(&self) -> Option<(&str, &str)> {
        self.file.as_ref().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Plain entry as `(field name, value)`
    #[must_use]
    pub fn plain(&self) -> Option<(&str, &str)> {
        self.plain.as_ref().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for MultipartFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = [("file", self.file()), ("plain", self.plain())];
        write!(f, "{{")?;
        let mut first = true;
        for (category, entry) in entries {
            let Some((name, value)) = entry else {
                continue;
            };
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{category}: {{{name}: {value}}}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

/// Encoded request body plus the `Content-Type` the encoding requires, if any.
#[derive(Debug)]
pub(crate) struct EncodedBody {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

pub(crate) fn encode_form(fields: &BTreeMap<String, String>) -> Result<EncodedBody, HttpcError> {
    let encoded = serde_urlencoded::to_string(fields)?;
    Ok(EncodedBody {
        bytes: Bytes::from(encoded),
        content_type: None,
    })
}

pub(crate) fn encode_json(text: &str) -> EncodedBody {
    EncodedBody {
        bytes: Bytes::copy_from_slice(text.as_bytes()),
        content_type: None,
    }
}

/// Build a multipart body: the file entry first, then the plain entry.
///
/// # Errors
/// Returns `HttpcError::Io` when the file entry's path cannot be read.
pub(crate) async fn encode_multipart(files: &MultipartFields) -> Result<EncodedBody, HttpcError> {
    let mut writer = MultipartWriter::new();

    if let Some((name, path)) = files.file() {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| HttpcError::io(path, e))?;
        let filename = Path::new(path)
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        writer.file_field(name, &filename, &data);
    }
    if let Some((name, value)) = files.plain() {
        writer.text_field(name, value);
    }

    let content_type = writer.content_type();
    Ok(EncodedBody {
        bytes: writer.finish(),
        content_type: Some(content_type),
    })
}
