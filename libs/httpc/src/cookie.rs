use std::fmt;

/// A single request cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Append cookies to an existing `Cookie` header value.
///
/// Each cookie is rendered as `name=value` and joined with `"; "`. The
/// existing value is kept byte for byte, so non-UTF-8 content survives.
/// Returns `None` when there is neither an existing value nor any cookie.
pub(crate) fn append_cookies(existing: Option<&[u8]>, cookies: &[Cookie]) -> Option<Vec<u8>> {
    let mut value = existing.filter(|v| !v.is_empty()).map(<[u8]>::to_vec);
    for cookie in cookies {
        let rendered = cookie.to_string();
        match value.as_mut() {
            Some(current) => {
                current.extend_from_slice(b"; ");
                current.extend_from_slice(rendered.as_bytes());
            }
            None => value = Some(rendered.into_bytes()),
        }
    }
    value
}

/// Parse a `Cookie` header value back into name/value pairs.
///
/// Segments without `=` are skipped.
pub(crate) fn parse_cookie_header(value: &str) -> Vec<Cookie> {
    value
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie::new(name, value.trim()))
        })
        .collect()
}
