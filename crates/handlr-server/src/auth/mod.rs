//! Authentication checkpoint.
//!
//! The decision logic lives behind [`AuthChecker`]; the dispatch core only
//! calls `check` before the handler body and honours the verdict.

pub mod header_token;

use std::sync::Arc;

use async_trait::async_trait;

use handlr_core::error::Result;
use handlr_core::http::{HttpRequest, RequestContext};

use crate::config::AuthConfig;

pub use header_token::HeaderTokenChecker;

/// Verdict of an auth check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCheckResult {
    Allow,
    Deny { status: u16, reason: String },
}

impl AuthCheckResult {
    pub fn deny(status: u16, reason: impl Into<String>) -> Self {
        AuthCheckResult::Deny {
            status,
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthCheckResult::Allow)
    }
}

/// Per-handler authentication capability. Must be safe to share across requests.
#[async_trait]
pub trait AuthChecker: Send + Sync {
    /// `Err` means the check itself failed; the request is answered with the
    /// error's status and the handler body is not run.
    async fn check(&self, request: &HttpRequest, ctx: &RequestContext) -> Result<AuthCheckResult>;
}

/// Build the checker described by `cfg`.
pub fn build_checker(cfg: &AuthConfig) -> Result<Arc<dyn AuthChecker>> {
    match cfg {
        AuthConfig::HeaderToken {
            header,
            scheme,
            tokens,
        } => Ok(Arc::new(HeaderTokenChecker::new(
            header,
            scheme.as_deref(),
            tokens,
        )?)),
    }
}
