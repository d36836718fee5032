use std::collections::HashSet;
use std::net::SocketAddr;

use serde::Deserialize;
use handlr_core::error::{HandlrError, Result};
use handlr_core::HttpMethod;

/// Paths served by the ops endpoints.
pub const RESERVED_PATHS: [&str; 2] = ["/healthz", "/readyz"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HandlrError::UnsupportedVersion);
        }
        if self.handlers.is_empty() {
            return Err(HandlrError::BadRequest("handlers must not be empty".into()));
        }

        self.server.validate()?;

        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        for h in &self.handlers {
            h.validate()?;
            if !names.insert(h.name.as_str()) {
                return Err(HandlrError::BadRequest(format!("duplicate handler name: {}", h.name)));
            }
            if RESERVED_PATHS.contains(&h.path.as_str()) {
                return Err(HandlrError::BadRequest(format!("handler path is reserved: {}", h.path)));
            }
            if !paths.insert(h.path.as_str()) {
                return Err(HandlrError::BadRequest(format!("duplicate handler path: {}", h.path)));
            }
        }
        if paths.contains(self.server.statistics_path.as_str()) {
            return Err(HandlrError::BadRequest(
                "server.statistics_path collides with a handler path".into(),
            ));
        }

        Ok(())
    }
}

/// Process-wide request handling settings shared by every handler.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_true")]
    pub log_request: bool,

    #[serde(default)]
    pub log_request_headers: bool,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_statistics_path")]
    pub statistics_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            log_request: default_true(),
            log_request_headers: false,
            max_body_bytes: default_max_body_bytes(),
            statistics_path: default_statistics_path(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<SocketAddr>().is_err() {
            return Err(HandlrError::BadRequest(
                "server.listen must be a valid socket address".into(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(HandlrError::BadRequest("server.max_body_bytes must be > 0".into()));
        }
        if !self.statistics_path.starts_with('/') {
            return Err(HandlrError::BadRequest(
                "server.statistics_path must start with '/'".into(),
            ));
        }
        if RESERVED_PATHS.contains(&self.statistics_path.as_str()) {
            return Err(HandlrError::BadRequest(
                "server.statistics_path is reserved".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_true() -> bool {
    true
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}
fn default_statistics_path() -> String {
    "/statistics".into()
}

/// Built-in handler implementations selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerKind {
    Ping,
    Echo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    pub name: String,
    pub kind: HandlerKind,
    pub path: String,

    /// Methods with a dedicated statistics slot. Empty: aggregate only.
    #[serde(default)]
    pub methods: Vec<HttpMethod>,

    #[serde(default)]
    pub method_statistics: bool,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

impl HandlerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HandlrError::BadRequest("handler name must not be empty".into()));
        }
        if !self.path.starts_with('/') {
            return Err(HandlrError::BadRequest(format!(
                "handler {}: path must start with '/'",
                self.name
            )));
        }
        if self.path.contains(|c: char| matches!(c, ':' | '*' | '{' | '}' | '?' | '#')) || self.path.contains("//") {
            return Err(HandlrError::BadRequest(format!(
                "handler {}: path must be a literal path without parameters or wildcards",
                self.name
            )));
        }
        if self.methods.contains(&HttpMethod::Unknown) {
            return Err(HandlrError::BadRequest(format!(
                "handler {}: methods must be standard HTTP methods",
                self.name
            )));
        }
        if let Some(ms) = self.timeout_ms {
            if !(1..=600_000).contains(&ms) {
                return Err(HandlrError::BadRequest(format!(
                    "handler {}: timeout_ms must be between 1 and 600000",
                    self.name
                )));
            }
        }
        if let Some(auth) = &self.auth {
            auth.validate()
                .map_err(|e| HandlrError::BadRequest(format!("handler {}: {e}", self.name)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", deny_unknown_fields)]
pub enum AuthConfig {
    /// Static token list checked against one request header.
    HeaderToken {
        header: String,
        /// Optional scheme prefix, e.g. `Bearer`.
        #[serde(default)]
        scheme: Option<String>,
        tokens: Vec<String>,
    },
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            AuthConfig::HeaderToken { header, tokens, .. } => {
                if header.trim().is_empty() {
                    return Err(HandlrError::BadRequest("auth.header must not be empty".into()));
                }
                if tokens.is_empty() || tokens.iter().any(|t| t.is_empty()) {
                    return Err(HandlrError::BadRequest(
                        "auth.tokens must contain non-empty tokens".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}
