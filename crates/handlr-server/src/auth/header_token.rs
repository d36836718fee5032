//! Static token checker.
//!
//! Reads one header, optionally strips a scheme prefix (`Bearer <token>`),
//! and matches the remainder against a compiled token set.

use std::collections::HashSet;

use async_trait::async_trait;

use handlr_core::error::{HandlrError, Result};
use handlr_core::http::{HttpRequest, RequestContext};

use super::{AuthCheckResult, AuthChecker};

#[derive(Debug, Clone)]
pub struct HeaderTokenChecker {
    header: String,
    scheme: Option<String>,
    tokens: HashSet<String>,
}

impl HeaderTokenChecker {
    pub fn new(header: &str, scheme: Option<&str>, tokens: &[String]) -> Result<Self> {
        let header = header.trim().to_ascii_lowercase();
        if header.is_empty() {
            return Err(HandlrError::BadRequest("auth header name must not be empty".into()));
        }
        let tokens: HashSet<String> = tokens
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(HandlrError::BadRequest("auth token list must not be empty".into()));
        }
        Ok(Self {
            header,
            scheme: scheme.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            tokens,
        })
    }

    fn extract<'r>(&self, raw: &'r str) -> Option<&'r str> {
        let raw = raw.trim();
        match &self.scheme {
            None => Some(raw),
            Some(scheme) => {
                let (s, rest) = raw.split_once(' ')?;
                s.eq_ignore_ascii_case(scheme).then(|| rest.trim())
            }
        }
    }
}

#[async_trait]
impl AuthChecker for HeaderTokenChecker {
    async fn check(&self, request: &HttpRequest, _ctx: &RequestContext) -> Result<AuthCheckResult> {
        let Some(raw) = request.header(&self.header) else {
            return Ok(AuthCheckResult::deny(401, format!("missing {} header", self.header)));
        };
        let Some(token) = self.extract(raw) else {
            return Ok(AuthCheckResult::deny(401, "malformed credentials"));
        };
        if self.tokens.contains(token) {
            Ok(AuthCheckResult::Allow)
        } else {
            Ok(AuthCheckResult::deny(403, "token not allowed"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn checker(scheme: Option<&str>) -> HeaderTokenChecker {
        HeaderTokenChecker::new("X-Api-Key", scheme, &["alpha".to_string(), "beta".to_string()]).unwrap()
    }

    async fn run(c: &HeaderTokenChecker, req: HttpRequest) -> AuthCheckResult {
        c.check(&req, &RequestContext::new()).await.unwrap()
    }

    #[tokio::test]
    async fn allows_known_token() {
        let c = checker(None);
        let req = HttpRequest::new("GET", "/").with_header("x-api-key", "beta");
        assert!(run(&c, req).await.is_allowed());
    }

    #[tokio::test]
    async fn missing_header_is_401_unknown_token_is_403() {
        let c = checker(None);
        match run(&c, HttpRequest::new("GET", "/")).await {
            AuthCheckResult::Deny { status, .. } => assert_eq!(status, 401),
            other => panic!("unexpected {other:?}"),
        }
        let req = HttpRequest::new("GET", "/").with_header("x-api-key", "gamma");
        assert_eq!(run(&c, req).await, AuthCheckResult::deny(403, "token not allowed"));
    }

    #[tokio::test]
    async fn scheme_prefix_is_required_when_configured() {
        let c = checker(Some("Bearer"));
        let ok = HttpRequest::new("GET", "/").with_header("x-api-key", "bearer alpha");
        assert!(run(&c, ok).await.is_allowed());

        let bare = HttpRequest::new("GET", "/").with_header("x-api-key", "alpha");
        assert_eq!(run(&c, bare).await, AuthCheckResult::deny(401, "malformed credentials"));
    }

    #[test]
    fn rejects_empty_token_list() {
        assert!(HeaderTokenChecker::new("x-api-key", None, &[String::new()]).is_err());
        assert!(HeaderTokenChecker::new(" ", None, &["a".to_string()]).is_err());
    }
}
