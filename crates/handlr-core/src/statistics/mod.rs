//! Per-handler request statistics.
//!
//! [`HandlerStatistics`] owns an aggregate [`MethodStatistics`] plus one slot
//! per declared HTTP method. Every request opens a [`StatisticsScope`] that
//! keeps the in-flight gauges honest and records the outcome exactly once.
//! Reports are built by the [`export`] module without locking writers.

pub mod export;
pub mod handler;
pub mod method;
pub mod scope;

pub use export::{format_statistics, HandlerStatisticsSnapshot, MethodStatisticsSnapshot, TimingsSnapshot};
pub use handler::HandlerStatistics;
pub use method::{MethodStatistics, LATENCY_BUCKETS_MS};
pub use scope::StatisticsScope;
