use std::time::{Duration, Instant};

use crate::error::STATUS_CLIENT_CLOSED;
use crate::method::HttpMethod;

use super::handler::HandlerStatistics;

/// Accounting obligation for one in-flight request.
///
/// Creating the scope bumps the in-flight gauges. [`StatisticsScope::account`]
/// consumes the scope, records the outcome and releases the gauges, so a
/// scope can be accounted at most once. A scope dropped unaccounted (the
/// request future was cancelled) is recorded as
/// [`STATUS_CLIENT_CLOSED`](crate::error::STATUS_CLIENT_CLOSED).
#[must_use = "a statistics scope must be accounted with the request outcome"]
pub struct StatisticsScope<'a> {
    stats: &'a HandlerStatistics,
    method: HttpMethod,
    started: Instant,
    accounted: bool,
}

impl<'a> StatisticsScope<'a> {
    pub fn new(stats: &'a HandlerStatistics, method: HttpMethod) -> Self {
        stats.increment_in_flight(method);
        Self {
            stats,
            method,
            started: Instant::now(),
            accounted: false,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Time since the scope was opened.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn account(mut self, code: u16, elapsed: Duration) {
        self.finish(code, elapsed);
    }

    fn finish(&mut self, code: u16, elapsed: Duration) {
        if self.accounted {
            return;
        }
        self.accounted = true;
        self.stats.account(self.method, code, elapsed);
        self.stats.decrement_in_flight(self.method);
    }
}

impl Drop for StatisticsScope<'_> {
    fn drop(&mut self) {
        if !self.accounted {
            tracing::warn!(method = %self.method, "request dropped before accounting");
            let elapsed = self.started.elapsed();
            self.finish(STATUS_CLIENT_CLOSED, elapsed);
        }
    }
}
