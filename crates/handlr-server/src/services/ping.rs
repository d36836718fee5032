use async_trait::async_trait;

use handlr_core::error::Result;
use handlr_core::http::{HttpRequest, RequestContext};

use crate::dispatch::HttpHandler;

/// Liveness-style endpoint: always answers `pong`.
pub struct PingHandler {
    name: String,
}

impl PingHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl HttpHandler for PingHandler {
    fn handler_name(&self) -> &str {
        &self.name
    }

    async fn handle_request_throw(&self, _request: &HttpRequest, ctx: &mut RequestContext) -> Result<String> {
        ctx.set_header("content-type", "text/plain; charset=utf-8");
        Ok("pong".to_string())
    }
}
