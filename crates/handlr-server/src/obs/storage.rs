//! Statistics registry for the monitoring endpoint.
//!
//! Handlers register an extender under a dotted key
//! (`http.handler.<name>`); the storage also owns the per-handler-type
//! [`HandlerStatistics`] shared across instances of the same type. Backed by
//! `DashMap` so registration never contends with request accounting, which
//! only touches the atomics inside `HandlerStatistics`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use serde_json::{Map, Value};

use handlr_core::error::{HandlrError, Result};
use handlr_core::statistics::{format_statistics, HandlerStatistics};
use handlr_core::HttpMethod;

/// Key prefix for per-instance handler reports.
pub const HANDLER_PREFIX: &str = "http.handler.";
/// Key prefix for per-handler-type reports.
pub const HANDLER_TYPE_PREFIX: &str = "http.handler-type.";

/// Filter for a statistics pull.
#[derive(Debug, Clone, Default)]
pub struct StatisticsRequest {
    pub prefix: Option<String>,
}

impl StatisticsRequest {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        self.prefix.as_deref().map_or(true, |p| key.starts_with(p))
    }
}

/// Produces one report subtree on demand.
pub type StatisticsExtender = Arc<dyn Fn(&StatisticsRequest) -> Value + Send + Sync>;

#[derive(Default)]
pub struct StatisticsStorage {
    extenders: DashMap<String, StatisticsExtender>,
    types: DashMap<String, TypeStatistics>,
}

struct TypeStatistics {
    stats: Arc<HandlerStatistics>,
    /// Set once any instance of the type reports per-method statistics.
    include_by_method: AtomicBool,
}

impl StatisticsStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `extender` under `key`. The returned entry unregisters on drop.
    pub fn register(
        self: &Arc<Self>,
        key: impl Into<String>,
        extender: StatisticsExtender,
    ) -> Result<StatisticsEntry> {
        let key = key.into();
        match self.extenders.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(HandlrError::Conflict(format!(
                "statistics key already registered: {key}"
            ))),
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(extender);
                tracing::debug!(%key, "statistics extender registered");
                Ok(StatisticsEntry {
                    key,
                    storage: Arc::downgrade(self),
                })
            }
        }
    }

    /// Shared statistics for `handler_type`, created with `methods` on first use.
    ///
    /// The type report carries `by-method` when any instance asked for it.
    pub fn type_statistics(
        &self,
        handler_type: &str,
        methods: &[HttpMethod],
        include_by_method: bool,
    ) -> Arc<HandlerStatistics> {
        let entry = self
            .types
            .entry(handler_type.to_string())
            .or_insert_with(|| TypeStatistics {
                stats: Arc::new(HandlerStatistics::new(methods)),
                include_by_method: AtomicBool::new(false),
            });
        entry.include_by_method.fetch_or(include_by_method, Ordering::Relaxed);
        if entry.stats.methods() != methods {
            tracing::debug!(
                handler_type,
                "handler type statistics keep the slots of the first registered instance"
            );
        }
        Arc::clone(&entry.stats)
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.extenders.contains_key(key)
    }

    /// Collect every registered report matching `request`, keyed by its registration key.
    pub fn collect(&self, request: &StatisticsRequest) -> Value {
        // Clone extenders out first so no shard guard is held while they run.
        let extenders: Vec<(String, StatisticsExtender)> = self
            .extenders
            .iter()
            .filter(|e| request.matches(e.key()))
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();

        let mut out = Map::new();
        for (key, ext) in extenders {
            out.insert(key, ext(request));
        }

        for t in self.types.iter() {
            let key = format!("{HANDLER_TYPE_PREFIX}{}", t.key());
            if request.matches(&key) {
                let include_by_method = t.include_by_method.load(Ordering::Relaxed);
                out.insert(key, format_statistics(&t.stats, include_by_method));
            }
        }
        Value::Object(out)
    }

    fn unregister(&self, key: &str) {
        if self.extenders.remove(key).is_some() {
            tracing::debug!(%key, "statistics extender unregistered");
        }
    }
}

/// Registration handle; dropping it removes the extender.
#[derive(Debug)]
pub struct StatisticsEntry {
    key: String,
    storage: Weak<StatisticsStorage>,
}

impl StatisticsEntry {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for StatisticsEntry {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.upgrade() {
            storage.unregister(&self.key);
        }
    }
}
