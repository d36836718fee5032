//! Observability: statistics registry behind the monitoring endpoint.
//!
//! Counters live in `handlr_core::statistics`; this module only keeps track
//! of who exports what and assembles the JSON report on demand.

pub mod storage;

pub use storage::{StatisticsEntry, StatisticsExtender, StatisticsRequest, StatisticsStorage};
