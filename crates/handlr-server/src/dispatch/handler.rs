use async_trait::async_trait;

use handlr_core::error::Result;
use handlr_core::http::{HttpRequest, RequestContext};

/// Endpoint business logic. The fixed request lifecycle around it lives in
/// [`HttpHandlerBase`](super::HttpHandlerBase).
#[async_trait]
pub trait HttpHandler: Send + Sync {
    /// Stable label used in logs and statistics keys.
    fn handler_name(&self) -> &str;

    /// Label shared by every instance of the same implementation.
    fn handler_type(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Report per-method statistics besides the all-methods aggregate.
    fn is_method_statistic_included(&self) -> bool {
        false
    }

    /// Produce the response body. The success status defaults to 200 and can
    /// be changed through `ctx`.
    async fn handle_request_throw(&self, request: &HttpRequest, ctx: &mut RequestContext) -> Result<String>;

    /// Bookkeeping after the response has been handed to the transport.
    async fn on_request_complete_throw(&self, _request: &HttpRequest, _ctx: &RequestContext) -> Result<()> {
        Ok(())
    }
}
