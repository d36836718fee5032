//! Counter block for one HTTP method (or the aggregate).
//!
//! Everything is a plain atomic updated with `Relaxed` ordering: accounting is
//! commutative and readers only need each counter to be accurate on its own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::export::{MethodStatisticsSnapshot, TimingsSnapshot};

const MIN_CODE: u16 = 100;
const MAX_CODE: u16 = 599;
const CODE_SLOTS: usize = (MAX_CODE - MIN_CODE + 1) as usize;

/// Latency bucket upper bounds in milliseconds. The last bucket is overflow.
pub const LATENCY_BUCKETS_MS: [u64; 13] =
    [1, 2, 5, 10, 20, 50, 100, 200, 500, 1_000, 2_000, 5_000, 10_000];

/// Reply code histogram: one counter per valid code, one for anything else.
struct ReplyCodes {
    by_code: Box<[AtomicU64]>,
    other: AtomicU64,
}

impl ReplyCodes {
    fn new() -> Self {
        Self {
            by_code: (0..CODE_SLOTS).map(|_| AtomicU64::new(0)).collect(),
            other: AtomicU64::new(0),
        }
    }

    fn slot(&self, code: u16) -> &AtomicU64 {
        if (MIN_CODE..=MAX_CODE).contains(&code) {
            if let Some(c) = self.by_code.get(usize::from(code - MIN_CODE)) {
                return c;
            }
        }
        &self.other
    }

    fn inc(&self, code: u16) {
        self.slot(code).fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self, code: u16) -> u64 {
        self.slot(code).load(Ordering::Relaxed)
    }

    /// Non-zero exact codes in ascending order.
    fn nonzero(&self) -> Vec<(u16, u64)> {
        self.by_code
            .iter()
            .zip(MIN_CODE..)
            .filter_map(|(c, code)| {
                let n = c.load(Ordering::Relaxed);
                (n > 0).then_some((code, n))
            })
            .collect()
    }
}

struct LatencyHistogram {
    count: AtomicU64,
    sum_ms: AtomicU64,
    max_ms: AtomicU64,
    // LATENCY_BUCKETS_MS.len() + 1 overflow
    buckets: [AtomicU64; 14],
}

impl LatencyHistogram {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_ms: AtomicU64::new(0),
            max_ms: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    fn observe(&self, ms: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_ms.fetch_add(ms, Ordering::Relaxed);
        self.max_ms.fetch_max(ms, Ordering::Relaxed);

        // Non-cumulative: exactly one bucket per sample.
        let idx = LATENCY_BUCKETS_MS
            .iter()
            .position(|&b| ms <= b)
            .unwrap_or(LATENCY_BUCKETS_MS.len());
        if let Some(b) = self.buckets.get(idx) {
            b.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> TimingsSnapshot {
        let buckets: Vec<u64> = self
            .buckets
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect();
        let count = self.count.load(Ordering::Relaxed);
        let sum_ms = self.sum_ms.load(Ordering::Relaxed);
        let max_ms = self.max_ms.load(Ordering::Relaxed);
        TimingsSnapshot::from_buckets(count, sum_ms, max_ms, &buckets)
    }
}

/// Mutable counter set scoped to one HTTP method (or "all methods").
pub struct MethodStatistics {
    reply_codes: ReplyCodes,
    timings: LatencyHistogram,
    in_flight: AtomicU64,
}

impl Default for MethodStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MethodStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodStatistics")
            .field("completed", &self.completed())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl MethodStatistics {
    pub fn new() -> Self {
        Self {
            reply_codes: ReplyCodes::new(),
            timings: LatencyHistogram::new(),
            in_flight: AtomicU64::new(0),
        }
    }

    /// Record one completed request.
    pub fn account(&self, code: u16, elapsed: Duration) {
        self.reply_codes.inc(code);
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.timings.observe(ms);
    }

    pub fn increment_in_flight(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_in_flight(&self) {
        // Never wraps below zero.
        let prev = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
        if prev.is_err() {
            tracing::error!("in-flight gauge decremented below zero");
            debug_assert!(false, "in-flight gauge decremented below zero");
        }
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Number of accounted completions.
    pub fn completed(&self) -> u64 {
        self.timings.count.load(Ordering::Relaxed)
    }

    /// Completions recorded with exactly `code`. Out-of-range codes share one counter.
    pub fn reply_count(&self, code: u16) -> u64 {
        self.reply_codes.get(code)
    }

    /// Completions recorded with codes outside 100..=599.
    pub fn other_reply_count(&self) -> u64 {
        self.reply_codes.other.load(Ordering::Relaxed)
    }

    /// Completions whose code falls in `class` (1..=5, e.g. 2 for `2xx`).
    pub fn class_count(&self, class: u16) -> u64 {
        self.reply_codes
            .nonzero()
            .into_iter()
            .filter(|(code, _)| code / 100 == class)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn snapshot(&self) -> MethodStatisticsSnapshot {
        MethodStatisticsSnapshot::new(
            self.reply_codes.nonzero(),
            self.other_reply_count(),
            self.timings.snapshot(),
            self.in_flight(),
        )
    }
}
