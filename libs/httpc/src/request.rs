use crate::body::{
    BodyMode, EncodedBody, FORM_CONTENT_TYPE, MultipartFields, encode_form, encode_json,
    encode_multipart,
};
use crate::cookie::{Cookie, append_cookies, parse_cookie_header};
use crate::error::{HttpcError, InvalidUriKind};
use crate::response::Sent;
use crate::transport::{Transport, WireRequest};
use crate::verbose::{RecordBody, RequestLogger, RequestRecord, TracingLogger};
use http::header::{CONTENT_TYPE, COOKIE, HeaderName, HeaderValue};
use http_body_util::Full;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Single-shot HTTP request with a fluent builder API
///
/// Setters never fail; everything is validated when the request is
/// dispatched with [`send`](Request::send) or [`send_as`](Request::send_as).
/// The returned [`Sent`] is then consumed by exactly one of `end`,
/// `end_bytes` or `end_file`.
///
/// # Example
///
/// ```ignore
/// use httpc::{BodyMode, Cookie, HttpClient};
///
/// let client = HttpClient::new()?;
///
/// // url-encoded POST
/// let (_, text) = client
///     .request()
///     .set_method("post")
///     .set_url("https://auth.example.com/token")
///     .set_data("grant_type", "client_credentials")
///     .set_cookies([Cookie::new("session", "abc")])
///     .send()
///     .await
///     .end()
///     .await?;
///
/// // JSON body; Content-Type is never set automatically
/// let (_, bytes) = client
///     .request()
///     .set_method("POST")
///     .set_url("https://api.example.com/users")
///     .set_header("Content-Type", "application/json")
///     .set_json_data(r#"{"name":"Alice"}"#)
///     .send_as(BodyMode::Json)
///     .await
///     .end_bytes()
///     .await?;
///
/// // Download to ./downloads/report.csv
/// client
///     .request()
///     .set_url("https://files.example.com/dir/report.csv")
///     .send()
///     .await
///     .end_file("./downloads/", "")
///     .await?;
/// ```
#[must_use = "Request does nothing until .send() is called"]
pub struct Request {
    transport: Arc<dyn Transport>,
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    cookies: Vec<Cookie>,
    form: BTreeMap<String, String>,
    json: String,
    files: MultipartFields,
    verbose: bool,
    logger: Arc<dyn RequestLogger>,
}

impl Request {
    /// Create a `GET` request bound to `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            method: http::Method::GET.as_str().to_owned(),
            url: String::new(),
            headers: Vec::new(),
            cookies: Vec::new(),
            form: BTreeMap::new(),
            json: String::new(),
            files: MultipartFields::default(),
            verbose: false,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Set the HTTP method; it is stored uppercased.
    pub fn set_method(mut self, name: &str) -> Self {
        self.method = name.to_uppercase();
        self
    }

    pub fn set_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set a header. A later value for the same name wins.
    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the cookies sent with the request.
    pub fn set_cookies(mut self, cookies: impl IntoIterator<Item = Cookie>) -> Self {
        self.cookies = cookies.into_iter().collect();
        self
    }

    /// Toggle the diagnostic record handed to the logger at dispatch.
    pub fn set_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set a url-encoded form field, replacing any previous value.
    pub fn set_data(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    /// Set the raw JSON text sent in [`BodyMode::Json`].
    pub fn set_json_data(mut self, json: impl Into<String>) -> Self {
        self.json = json.into();
        self
    }

    /// Set a multipart entry: a file path when `is_file`, a literal value
    /// otherwise.
    ///
    /// Only one entry per category is kept: a second call with the same
    /// `is_file` flag replaces the first.
    pub fn set_file_data(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        is_file: bool,
    ) -> Self {
        self.files.set(name, value, is_file);
        self
    }

    /// Replace the collaborator receiving verbose records.
    pub fn set_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Dispatch with a url-encoded form body.
    pub async fn send(self) -> Sent {
        self.send_as(BodyMode::UrlEncoded).await
    }

    /// Dispatch with the body encoded per `mode`.
    ///
    /// Failures (invalid method, URL or header, unreadable multipart file,
    /// transport error) are captured in the returned [`Sent`] and reported
    /// by whichever terminal operation consumes it.
    pub async fn send_as(self, mode: BodyMode) -> Sent {
        tracing::debug!(method = %self.method, url = %self.url, mode = %mode, "dispatching request");

        let request = match self.build(mode).await {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(method = %self.method, url = %self.url, error = %e, "failed to build request");
                return Sent::failed(e);
            }
        };

        if self.verbose {
            self.logger.log(&self.record(mode, &request));
        }

        let url = self.url.clone();
        match self.transport.execute(request).await {
            Ok(response) => {
                tracing::debug!(url = %url, status = response.status().as_u16(), "response received");
                Sent::received(url, response)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "transport failed");
                Sent::failed(e)
            }
        }
    }

    async fn build(&self, mode: BodyMode) -> Result<WireRequest, HttpcError> {
        let method = http::Method::from_bytes(self.method.as_bytes())?;
        let uri = self.validate_url()?;

        let EncodedBody {
            bytes,
            content_type,
        } = match mode {
            BodyMode::UrlEncoded => encode_form(&self.form)?,
            BodyMode::Json => encode_json(&self.json),
            BodyMode::Multipart => encode_multipart(&self.files).await?,
        };
        let content_type = match (mode, content_type) {
            (_, Some(content_type)) => Some(content_type),
            (BodyMode::UrlEncoded, None) if method == http::Method::POST => {
                Some(FORM_CONTENT_TYPE.to_owned())
            }
            _ => None,
        };

        let mut request = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(bytes))?;
        let headers = request.headers_mut();

        // Defaults first so explicit headers override them
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::try_from(content_type)?);
        }
        for (name, value) in &self.headers {
            headers.insert(
                HeaderName::try_from(name.as_str())?,
                HeaderValue::try_from(value.as_str())?,
            );
        }

        let cookie = append_cookies(headers.get(COOKIE).map(HeaderValue::as_bytes), &self.cookies);
        if let Some(cookie) = cookie {
            headers.insert(COOKIE, HeaderValue::from_bytes(&cookie)?);
        }

        Ok(request)
    }

    /// Validate URL syntax, authority and scheme.
    ///
    /// Returns the parsed URI on success for use in request building.
    fn validate_url(&self) -> Result<http::Uri, HttpcError> {
        let uri: http::Uri =
            self.url
                .parse()
                .map_err(|e: http::uri::InvalidUri| HttpcError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::ParseError,
                    reason: e.to_string(),
                })?;

        match uri.scheme_str() {
            Some("http" | "https") => {}
            Some(scheme) => {
                return Err(HttpcError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::UnsupportedScheme,
                    reason: format!("unsupported protocol scheme '{scheme}'"),
                });
            }
            None => {
                return Err(HttpcError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::MissingScheme,
                    reason: "missing scheme".to_owned(),
                });
            }
        }

        if uri.authority().is_none() {
            return Err(HttpcError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        Ok(uri)
    }

    fn record(&self, mode: BodyMode, request: &WireRequest) -> RequestRecord {
        let headers = request
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let cookies = request
            .headers()
            .get_all(COOKIE)
            .iter()
            .flat_map(|v| parse_cookie_header(&String::from_utf8_lossy(v.as_bytes())))
            .collect();
        let body = match mode {
            BodyMode::UrlEncoded => RecordBody::Form(
                self.form
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            BodyMode::Json => RecordBody::Json(self.json.clone()),
            BodyMode::Multipart => RecordBody::Files(self.files.clone()),
        };

        RequestRecord {
            method: self.method.clone(),
            url: self.url.clone(),
            headers,
            cookies,
            body,
        }
    }
}
