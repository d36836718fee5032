//! Shared application state for the handlr server.
//!
//! Builds every configured handler once at startup; startup errors are
//! returned instead of panicking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use handlr_core::error::Result;

use crate::auth;
use crate::config::ServerConfig;
use crate::dispatch::{HandlerSettings, HttpHandlerBase};
use crate::obs::StatisticsStorage;
use crate::services;

/// A handler bound to the path the transport serves it on.
#[derive(Clone)]
pub struct MountedHandler {
    pub path: String,
    pub handler: Arc<HttpHandlerBase>,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    storage: Arc<StatisticsStorage>,
    handlers: Vec<MountedHandler>,
    draining: AtomicBool,
}

impl AppState {
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let storage = StatisticsStorage::new();

        let mut handlers = Vec::with_capacity(cfg.handlers.len());
        for h in &cfg.handlers {
            let checker = h.auth.as_ref().map(auth::build_checker).transpose()?;
            let base = HttpHandlerBase::new(
                services::build_handler(h.kind, &h.name),
                HandlerSettings::from_config(h, &cfg.server),
                checker,
                &storage,
            )?;
            handlers.push(MountedHandler {
                path: h.path.clone(),
                handler: Arc::new(base),
            });
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                storage,
                handlers,
                draining: AtomicBool::new(false),
            }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn storage(&self) -> Arc<StatisticsStorage> {
        Arc::clone(&self.inner.storage)
    }

    pub fn handlers(&self) -> &[MountedHandler] {
        &self.inner.handlers
    }

    pub fn handler(&self, name: &str) -> Option<Arc<HttpHandlerBase>> {
        self.inner
            .handlers
            .iter()
            .find(|m| m.handler.handler_name() == name)
            .map(|m| Arc::clone(&m.handler))
    }

    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
