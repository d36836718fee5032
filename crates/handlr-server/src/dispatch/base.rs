//! Fixed request lifecycle shared by every handler:
//! authenticate, execute, measure, respond, then run the completion hook.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use serde_json::Value;
use tracing::Instrument;

use handlr_core::error::{ClientCode, HandlrError, Result};
use handlr_core::http::{CancelHandle, HttpRequest, HttpResponse, RequestContext};
use handlr_core::statistics::{self, HandlerStatistics, StatisticsScope};
use handlr_core::HttpMethod;

use crate::auth::{AuthCheckResult, AuthChecker};
use crate::config::{HandlerConfig, ServerSection};
use crate::obs::storage::HANDLER_PREFIX;
use crate::obs::{StatisticsEntry, StatisticsExtender, StatisticsRequest, StatisticsStorage};

use super::handler::HttpHandler;

/// Per-handler runtime settings.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Methods that get a dedicated statistics slot.
    pub methods: Vec<HttpMethod>,
    /// Force per-method statistics in reports.
    pub method_statistics: bool,
    pub timeout: Option<Duration>,
    pub log_request: bool,
    pub log_request_headers: bool,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
            method_statistics: false,
            timeout: None,
            log_request: true,
            log_request_headers: false,
        }
    }
}

impl HandlerSettings {
    pub fn from_config(handler: &HandlerConfig, server: &ServerSection) -> Self {
        Self {
            methods: handler.methods.clone(),
            method_statistics: handler.method_statistics,
            timeout: handler.timeout_ms.map(Duration::from_millis),
            log_request: server.log_request,
            log_request_headers: server.log_request_headers,
        }
    }

    pub fn with_methods(mut self, methods: &[HttpMethod]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct HttpHandlerBase {
    handler: Arc<dyn HttpHandler>,
    settings: HandlerSettings,
    auth_checker: Option<Arc<dyn AuthChecker>>,
    export: Arc<HandlerExport>,
    type_statistics: Arc<HandlerStatistics>,
    _statistics_entry: StatisticsEntry,
}

/// Per-instance counters plus how they are reported. Shared with the
/// extender registered in the statistics storage.
struct HandlerExport {
    stats: Arc<HandlerStatistics>,
    include_by_method: bool,
}

impl HandlerExport {
    fn extend(&self, _request: &StatisticsRequest) -> Value {
        statistics::format_statistics(&self.stats, self.include_by_method)
    }
}

impl HttpHandlerBase {
    /// Wire `handler` into the lifecycle and register its statistics with `storage`.
    pub fn new(
        handler: Arc<dyn HttpHandler>,
        settings: HandlerSettings,
        auth_checker: Option<Arc<dyn AuthChecker>>,
        storage: &Arc<StatisticsStorage>,
    ) -> Result<Self> {
        let include_by_method = handler.is_method_statistic_included() || settings.method_statistics;
        let export = Arc::new(HandlerExport {
            stats: Arc::new(HandlerStatistics::new(&settings.methods)),
            include_by_method,
        });
        let type_statistics =
            storage.type_statistics(handler.handler_type(), export.stats.methods(), include_by_method);

        let exported = Arc::clone(&export);
        let extender: StatisticsExtender = Arc::new(move |req| exported.extend(req));
        let entry = storage.register(format!("{HANDLER_PREFIX}{}", handler.handler_name()), extender)?;

        tracing::info!(
            handler = handler.handler_name(),
            handler_type = handler.handler_type(),
            methods = ?export.stats.methods(),
            auth = auth_checker.is_some(),
            "handler registered"
        );

        Ok(Self {
            handler,
            settings,
            auth_checker,
            export,
            type_statistics,
            _statistics_entry: entry,
        })
    }

    pub fn handler_name(&self) -> &str {
        self.handler.handler_name()
    }

    pub fn settings(&self) -> &HandlerSettings {
        &self.settings
    }

    /// Methods this handler declares, in declaration order.
    pub fn allowed_methods(&self) -> &[HttpMethod] {
        self.export.stats.methods()
    }

    /// Live per-instance counters.
    pub fn request_statistics(&self) -> &HandlerStatistics {
        &self.export.stats
    }

    /// Live counters shared by every instance of this handler type.
    pub fn type_statistics(&self) -> &HandlerStatistics {
        &self.type_statistics
    }

    pub fn is_method_statistic_included(&self) -> bool {
        self.export.include_by_method
    }

    pub fn format_statistics(&self, stats: &HandlerStatistics) -> Value {
        statistics::format_statistics(stats, self.is_method_statistic_included())
    }

    /// This handler's subtree of the statistics report, as served under
    /// `http.handler.<name>`.
    pub fn extend_statistics(&self, request: &StatisticsRequest) -> Value {
        self.export.extend(request)
    }

    /// Transport entry point. Never fails: every error is turned into a
    /// response and accounted. The completion hook runs on a separate task.
    pub async fn handle_request(self: &Arc<Self>, request: Arc<HttpRequest>, mut ctx: RequestContext) -> HttpResponse {
        let response = self.process_request(&request, &mut ctx).await;

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.on_request_complete(&request, &ctx).await;
        });

        response
    }

    /// Authenticate, execute and account one request.
    pub async fn process_request(&self, request: &HttpRequest, ctx: &mut RequestContext) -> HttpResponse {
        let span = tracing::info_span!(
            "http_request",
            handler = self.handler_name(),
            request_id = ctx.id(),
        );
        self.process_inner(request, ctx).instrument(span).await
    }

    async fn process_inner(&self, request: &HttpRequest, ctx: &mut RequestContext) -> HttpResponse {
        let method = request.method();
        let instance_scope = StatisticsScope::new(&self.export.stats, method);
        let type_scope = StatisticsScope::new(&self.type_statistics, method);

        // One budget for the auth check and the handler body.
        let deadline = self.settings.timeout.map(|t| tokio::time::Instant::now() + t);

        let response = match self.check_auth(request, ctx, deadline).await {
            Some(rejection) => rejection,
            None => self.run_handler(request, ctx, deadline).await,
        };

        let elapsed = instance_scope.elapsed();
        instance_scope.account(response.status, elapsed);
        type_scope.account(response.status, elapsed);

        self.log_request(request, response.status, elapsed);
        response
    }

    /// Bound `fut` by the request deadline and the context's cancel signal.
    async fn guarded<T>(
        &self,
        cancel: &CancelHandle,
        deadline: Option<tokio::time::Instant>,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout_ms = self.settings.timeout.map_or(0, duration_ms);
        let bounded = async move {
            match deadline {
                Some(at) => tokio::time::timeout_at(at, fut)
                    .await
                    .unwrap_or_else(|_| Err(HandlrError::Timeout(timeout_ms))),
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HandlrError::Cancelled),
            r = bounded => r,
        }
    }

    /// `Some(response)` when the request must not reach the handler body.
    async fn check_auth(
        &self,
        request: &HttpRequest,
        ctx: &RequestContext,
        deadline: Option<tokio::time::Instant>,
    ) -> Option<HttpResponse> {
        let checker = self.auth_checker.as_ref()?;

        let check = AssertUnwindSafe(checker.check(request, ctx))
            .catch_unwind()
            .map(|r| {
                r.unwrap_or_else(|panic| {
                    tracing::error!(panic = %panic_message(panic.as_ref()), "auth checker panicked");
                    Err(HandlrError::Internal("auth check failed".into()))
                })
            });

        match self.guarded(ctx.cancel_handle(), deadline, check).await {
            Ok(AuthCheckResult::Allow) => None,
            Ok(AuthCheckResult::Deny { status, reason }) => {
                tracing::debug!(status, %reason, "auth rejected");
                let code = ClientCode::from_status(status);
                Some(HttpResponse::error_json(status, code.as_str(), &reason))
            }
            Err(e) => {
                tracing::warn!(error = %e, status = e.status_code(), "auth check failed");
                Some(HttpResponse::from_error(&e))
            }
        }
    }

    async fn run_handler(
        &self,
        request: &HttpRequest,
        ctx: &mut RequestContext,
        deadline: Option<tokio::time::Instant>,
    ) -> HttpResponse {
        let cancel = ctx.cancel_handle().clone();

        let body = AssertUnwindSafe(self.handler.handle_request_throw(request, ctx))
            .catch_unwind()
            .map(|r| {
                r.unwrap_or_else(|panic| {
                    tracing::error!(panic = %panic_message(panic.as_ref()), "handler panicked");
                    Err(HandlrError::Internal("handler panicked".into()))
                })
            });
        let outcome = self.guarded(&cancel, deadline, body).await;

        match outcome {
            Ok(body) => {
                let mut response = HttpResponse::new(ctx.status().unwrap_or(200), body);
                for (k, v) in ctx.take_headers() {
                    response.set_header(k, v);
                }
                response
            }
            Err(e) => {
                if e.is_server_error() {
                    tracing::error!(error = %e, status = e.status_code(), "handler failed");
                } else {
                    tracing::debug!(error = %e, status = e.status_code(), "handler rejected request");
                }
                HttpResponse::from_error(&e)
            }
        }
    }

    /// Best-effort hook after the response was sent. Failures are only logged.
    pub async fn on_request_complete(&self, request: &HttpRequest, ctx: &RequestContext) {
        let res = AssertUnwindSafe(self.handler.on_request_complete_throw(request, ctx))
            .catch_unwind()
            .await;
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(handler = self.handler_name(), request_id = ctx.id(), error = %e, "on_request_complete failed");
            }
            Err(panic) => {
                tracing::error!(
                    handler = self.handler_name(),
                    request_id = ctx.id(),
                    panic = %panic_message(panic.as_ref()),
                    "on_request_complete panicked"
                );
            }
        }
    }

    fn log_request(&self, request: &HttpRequest, status: u16, elapsed: Duration) {
        if self.settings.log_request {
            tracing::info!(
                method = request.raw_method(),
                target = request.target(),
                status,
                elapsed_ms = duration_ms(elapsed),
                "request handled"
            );
        }
        if self.settings.log_request_headers {
            tracing::debug!(headers = ?request.headers(), "request headers");
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
