use async_trait::async_trait;

use handlr_core::error::{HandlrError, Result};
use handlr_core::http::{HttpRequest, RequestContext};

use crate::dispatch::HttpHandler;

/// Echo the request body back. Useful to prove the request path end to end.
pub struct EchoHandler {
    name: String,
}

impl EchoHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl HttpHandler for EchoHandler {
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn is_method_statistic_included(&self) -> bool {
        true
    }

    async fn handle_request_throw(&self, request: &HttpRequest, ctx: &mut RequestContext) -> Result<String> {
        let body = std::str::from_utf8(request.body())
            .map_err(|e| HandlrError::BadRequest(format!("echo body must be utf-8: {e}")))?;

        if let Some(ct) = request.header("content-type") {
            ctx.set_header("content-type", ct);
        }
        Ok(body.to_string())
    }
}
