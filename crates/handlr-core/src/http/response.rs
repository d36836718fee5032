use serde_json::json;

use crate::error::HandlrError;

/// Outbound response handed back to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// JSON error body: `{"code": "...", "message": "..."}`.
    pub fn from_error(err: &HandlrError) -> Self {
        Self::error_json(err.status_code(), err.client_code().as_str(), &err.to_string())
    }

    pub fn error_json(status: u16, code: &str, message: &str) -> Self {
        let body = json!({
            "code": code,
            "message": message,
        })
        .to_string();
        Self::new(status, body).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Replaces an existing header of the same name.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.headers.push((name, value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_code_and_status() {
        let resp = HttpResponse::from_error(&HandlrError::NotFound("item 7".into()));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.header("Content-Type"), Some("application/json"));
        let v: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(v["code"], "NOT_FOUND");
        assert_eq!(v["message"], "not found: item 7");
    }

    #[test]
    fn set_header_replaces() {
        let mut resp = HttpResponse::ok("x").with_header("X-A", "1");
        resp.set_header("x-a", "2");
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.header("x-a"), Some("2"));
    }
}
