use bytes::Bytes;

use crate::method::HttpMethod;

/// Parsed inbound request.
///
/// Header names are stored lowercased; lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: HttpMethod,
    raw_method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpRequest {
    /// `raw_method` is kept verbatim for logging; the parsed form drives statistics.
    pub fn new(raw_method: impl Into<String>, target: impl Into<String>) -> Self {
        let raw_method = raw_method.into();
        Self {
            method: HttpMethod::parse(&raw_method),
            raw_method,
            target: target.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.push_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn push_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .push((name.as_ref().to_ascii_lowercase(), value.into()));
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn raw_method(&self) -> &str {
        &self.raw_method
    }

    /// Path plus optional query, as received.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map(|(p, _)| p)
            .unwrap_or(&self.target)
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }

    /// First value of the header, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
