#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Fluent single-shot HTTP requests
//!
//! A [`Request`] is configured with chained setters, dispatched once with
//! [`Request::send`] or [`Request::send_as`], and the resulting [`Sent`] is
//! consumed by exactly one terminal operation:
//! - [`Sent::end`] returns the decoded body as text
//! - [`Sent::end_bytes`] returns the decoded body as bytes
//! - [`Sent::end_file`] saves the raw body to disk
//!
//! Bodies are encoded as url-encoded forms, raw JSON text or
//! `multipart/form-data` depending on the [`BodyMode`]. Responses with
//! `Content-Encoding: gzip` or `br` are decoded by the text and byte
//! terminals. Only status `200` counts as success.
//!
//! Network I/O is delegated to a [`Transport`]. [`HttpClient`] is the bundled
//! implementation: a pooled hyper client with rustls, a per-request timeout
//! and redirect following.
//!
//! # Example
//!
//! ```ignore
//! use httpc::{BodyMode, Cookie, HttpClient};
//!
//! let client = HttpClient::new()?;
//! let (head, text) = client
//!     .request()
//!     .set_method("POST")
//!     .set_url("https://example.com/login")
//!     .set_cookies([Cookie::new("sid", "abc")])
//!     .set_data("user", "bob")
//!     .send_as(BodyMode::UrlEncoded)
//!     .await
//!     .end()
//!     .await?;
//! ```

mod body;
mod builder;
mod client;
mod config;
mod cookie;
mod decode;
mod error;
mod multipart;
mod request;
mod response;
mod transport;
mod verbose;

pub use body::{BodyMode, FORM_CONTENT_TYPE, MultipartFields};
pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_MAX_REDIRECTS, DEFAULT_USER_AGENT, HttpClientConfig};
pub use cookie::Cookie;
pub use decode::{ContentEncoding, decode_body};
pub use error::{HttpcError, InvalidUriKind};
pub use multipart::MultipartWriter;
pub use request::Request;
pub use response::{ResponseHead, Sent};
pub use transport::{ResponseBody, Transport, WireRequest, WireResponse};
pub use verbose::{ConsoleLogger, RecordBody, RequestLogger, RequestRecord, TracingLogger};
