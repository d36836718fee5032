//! Point-in-time reports over live counters.
//!
//! Reads never block writers. Each counter is read independently, so a report
//! may mix values from slightly different moments; every individual value is
//! accurate at the time it was loaded.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::handler::HandlerStatistics;
use super::method::LATENCY_BUCKETS_MS;

const PERCENTILES: [(&str, f64); 3] = [("p50", 0.50), ("p95", 0.95), ("p99", 0.99)];

/// Latency summary in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimingsSnapshot {
    pub count: u64,
    pub sum_ms: u64,
    pub avg_ms: f64,
    pub max_ms: u64,
    /// Percentile estimates (bucket upper bound, capped by the observed max).
    #[serde(flatten)]
    pub percentiles: BTreeMap<String, u64>,
}

impl TimingsSnapshot {
    pub(crate) fn from_buckets(count: u64, sum_ms: u64, max_ms: u64, buckets: &[u64]) -> Self {
        let avg_ms = if count == 0 {
            0.0
        } else {
            sum_ms as f64 / count as f64
        };

        let total: u64 = buckets.iter().sum();
        let percentiles = PERCENTILES
            .iter()
            .map(|&(name, p)| (name.to_string(), estimate(buckets, total, max_ms, p)))
            .collect();

        Self {
            count,
            sum_ms,
            avg_ms,
            max_ms,
            percentiles,
        }
    }

    pub fn percentile(&self, name: &str) -> Option<u64> {
        self.percentiles.get(name).copied()
    }
}

fn estimate(buckets: &[u64], total: u64, max_ms: u64, p: f64) -> u64 {
    if total == 0 {
        return 0;
    }
    let rank = ((total as f64) * p).ceil().max(1.0) as u64;
    let mut seen = 0u64;
    for (i, &n) in buckets.iter().enumerate() {
        seen += n;
        if seen >= rank {
            return LATENCY_BUCKETS_MS
                .get(i)
                .map(|&bound| bound.min(max_ms))
                .unwrap_or(max_ms);
        }
    }
    max_ms
}

/// Report for one counter block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MethodStatisticsSnapshot {
    /// Counts per status class (`1xx`..`5xx`, `other`).
    pub reply_codes: BTreeMap<String, u64>,
    /// Counts per exact status code, non-zero only.
    pub reply_codes_exact: BTreeMap<String, u64>,
    pub timings: TimingsSnapshot,
    pub in_flight: u64,
}

impl MethodStatisticsSnapshot {
    pub(crate) fn new(
        exact: Vec<(u16, u64)>,
        other: u64,
        timings: TimingsSnapshot,
        in_flight: u64,
    ) -> Self {
        let mut reply_codes: BTreeMap<String, u64> =
            (1..=5).map(|c| (format!("{c}xx"), 0)).collect();
        reply_codes.insert("other".to_string(), other);

        let mut reply_codes_exact = BTreeMap::new();
        for (code, n) in exact {
            *reply_codes.entry(format!("{}xx", code / 100)).or_insert(0) += n;
            reply_codes_exact.insert(code.to_string(), n);
        }

        Self {
            reply_codes,
            reply_codes_exact,
            timings,
            in_flight,
        }
    }

    /// Sum over all reply code classes.
    pub fn total_replies(&self) -> u64 {
        self.reply_codes.values().sum()
    }
}

/// Report for a whole [`HandlerStatistics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HandlerStatisticsSnapshot {
    pub total: MethodStatisticsSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_method: Option<BTreeMap<String, MethodStatisticsSnapshot>>,
}

impl HandlerStatisticsSnapshot {
    pub fn capture(stats: &HandlerStatistics, include_by_method: bool) -> Self {
        let by_method = include_by_method.then(|| {
            stats
                .methods()
                .iter()
                .filter_map(|&m| {
                    stats
                        .statistic_by_method(m)
                        .map(|s| (m.as_str().to_string(), s.snapshot()))
                })
                .collect()
        });

        Self {
            total: stats.total_statistics().snapshot(),
            by_method,
        }
    }
}

/// JSON report: `{"total": {...}, "by-method": {"GET": {...}}}`.
pub fn format_statistics(stats: &HandlerStatistics, include_by_method: bool) -> Value {
    let snapshot = HandlerStatisticsSnapshot::capture(stats, include_by_method);
    serde_json::to_value(snapshot).unwrap_or_else(|e| {
        tracing::error!(error = %e, "statistics serialization failed");
        Value::Null
    })
}
