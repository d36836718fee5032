//! Shared test handler and auth checker.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use handlr_core::error::{HandlrError, Result};
use handlr_core::http::{HttpRequest, RequestContext};
use handlr_core::HttpMethod;
use handlr_server::auth::{AuthCheckResult, AuthChecker};
use handlr_server::dispatch::{HandlerSettings, HttpHandler, HttpHandlerBase};
use handlr_server::obs::StatisticsStorage;

/// Behaviour is picked per request from the `x-outcome` header:
/// `fail` (500), `missing` (404), `created` (201), `panic`, `slow` (sleeps 5s),
/// anything else answers 200 with body `ok`.
#[derive(Default)]
pub struct ScriptedHandler {
    name: String,
    per_method: bool,
    pub calls: AtomicUsize,
    pub completions: AtomicUsize,
}

impl ScriptedHandler {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            ..Default::default()
        })
    }

    pub fn with_method_statistics(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            per_method: true,
            ..Default::default()
        })
    }
}

#[async_trait]
impl HttpHandler for ScriptedHandler {
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn is_method_statistic_included(&self) -> bool {
        self.per_method
    }

    async fn handle_request_throw(&self, request: &HttpRequest, ctx: &mut RequestContext) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match request.header("x-outcome").unwrap_or("ok") {
            "fail" => Err(HandlrError::Internal("scripted failure".into())),
            "missing" => Err(HandlrError::NotFound("scripted".into())),
            "created" => {
                ctx.set_status(201);
                ctx.set_header("x-created", "yes");
                Ok("created".into())
            }
            "panic" => panic!("scripted panic"),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok("late".into())
            }
            _ => {
                ctx.set_header("x-handled-by", self.name.clone());
                Ok("ok".into())
            }
        }
    }

    async fn on_request_complete_throw(&self, request: &HttpRequest, _ctx: &RequestContext) -> Result<()> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        match request.header("x-complete") {
            Some("fail") => Err(HandlrError::Internal("completion failed".into())),
            Some("panic") => panic!("completion panic"),
            _ => Ok(()),
        }
    }
}

/// Denies requests carrying `x-deny` (status from `x-deny-status`, default
/// 403), fails on `x-auth-error`, sleeps 300ms on `x-auth-slow`.
#[derive(Default)]
pub struct ScriptedAuth {
    pub checks: AtomicUsize,
}

#[async_trait]
impl AuthChecker for ScriptedAuth {
    async fn check(&self, request: &HttpRequest, _ctx: &RequestContext) -> Result<AuthCheckResult> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if request.header("x-auth-slow").is_some() {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        if request.header("x-auth-error").is_some() {
            return Err(HandlrError::Unavailable("auth backend down".into()));
        }
        if let Some(reason) = request.header("x-deny") {
            let status = request
                .header("x-deny-status")
                .and_then(|s| s.parse().ok())
                .unwrap_or(403);
            return Ok(AuthCheckResult::deny(status, reason));
        }
        Ok(AuthCheckResult::Allow)
    }
}

pub fn get_post() -> HandlerSettings {
    HandlerSettings::default().with_methods(&[HttpMethod::Get, HttpMethod::Post])
}

pub fn mount(
    handler: Arc<ScriptedHandler>,
    settings: HandlerSettings,
    auth: Option<Arc<dyn AuthChecker>>,
    storage: &Arc<StatisticsStorage>,
) -> Arc<HttpHandlerBase> {
    Arc::new(HttpHandlerBase::new(handler, settings, auth, storage).unwrap())
}

pub fn req(method: &str, outcome: &str) -> HttpRequest {
    HttpRequest::new(method, "/test").with_header("x-outcome", outcome)
}
