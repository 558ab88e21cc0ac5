//! Diagnostic records emitted for requests built with `set_verbose(true)`.

use crate::body::MultipartFields;
use crate::cookie::Cookie;
use std::fmt;

const BORDER: &str = "-------------------------------------------------------------------";

/// Body representation carried by a [`RequestRecord`], one per encoding mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    /// Url-encoded form fields, sorted by name
    Form(Vec<(String, String)>),
    /// Raw JSON text
    Json(String),
    /// Multipart file-data mapping
    Files(MultipartFields),
}

/// Snapshot of a fully built wire request, taken right before it is handed to
/// the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie>,
    pub body: RecordBody,
}

impl fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BORDER}")?;
        writeln!(f, "Request: {} {}", self.method, self.url)?;

        write!(f, "Header: {{")?;
        for (i, (name, value)) in self.headers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        writeln!(f, "}}")?;

        write!(f, "Cookies: [")?;
        for (i, cookie) in self.cookies.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cookie}")?;
        }
        writeln!(f, "]")?;

        match &self.body {
            RecordBody::Form(fields) => {
                write!(f, "Body: {{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                writeln!(f, "}}")?;
            }
            RecordBody::Json(text) => writeln!(f, "Body: {text}")?,
            RecordBody::Files(files) => writeln!(f, "Body: {files}")?,
        }
        write!(f, "{BORDER}")
    }
}

/// Collaborator receiving verbose request records.
pub trait RequestLogger: Send + Sync {
    fn log(&self, record: &RequestRecord);
}

/// Emits each record as a single `INFO` event on the `httpc::verbose` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn log(&self, record: &RequestRecord) {
        tracing::info!(
            target: "httpc::verbose",
            method = %record.method,
            url = %record.url,
            "\n{record}"
        );
    }
}

/// Prints each record to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl RequestLogger for ConsoleLogger {
    fn log(&self, record: &RequestRecord) {
        println!("{record}");
    }
}
