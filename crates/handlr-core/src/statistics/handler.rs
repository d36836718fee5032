use std::time::Duration;

use crate::method::HttpMethod;

use super::method::MethodStatistics;

/// Aggregate counters plus one optional slot per standard HTTP method.
///
/// The slot layout is fixed at construction; only counters change afterwards.
#[derive(Debug)]
pub struct HandlerStatistics {
    total: MethodStatistics,
    by_method: Vec<Option<MethodStatistics>>,
    methods: Vec<HttpMethod>,
}

impl HandlerStatistics {
    /// Build slots for `methods`. Duplicates and [`HttpMethod::Unknown`] are ignored.
    pub fn new(methods: &[HttpMethod]) -> Self {
        let mut by_method: Vec<Option<MethodStatistics>> =
            (0..HttpMethod::COUNT).map(|_| None).collect();
        let mut declared = Vec::with_capacity(methods.len());

        for &m in methods {
            let Some(slot) = m.index().and_then(|i| by_method.get_mut(i)) else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(MethodStatistics::new());
                declared.push(m);
            }
        }

        Self {
            total: MethodStatistics::new(),
            by_method,
            methods: declared,
        }
    }

    /// Slot for `method`; `None` means the caller skipped [`Self::is_ok_method`].
    pub fn statistic_by_method(&self, method: HttpMethod) -> Option<&MethodStatistics> {
        method
            .index()
            .and_then(|i| self.by_method.get(i))
            .and_then(Option::as_ref)
    }

    pub fn total_statistics(&self) -> &MethodStatistics {
        &self.total
    }

    pub fn is_ok_method(&self, method: HttpMethod) -> bool {
        self.statistic_by_method(method).is_some()
    }

    /// Methods with a slot, in declaration order.
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// Record a completion into the aggregate and, if present, the method slot.
    pub fn account(&self, method: HttpMethod, code: u16, elapsed: Duration) {
        self.total.account(code, elapsed);
        if let Some(s) = self.statistic_by_method(method) {
            s.account(code, elapsed);
        }
    }

    pub(crate) fn increment_in_flight(&self, method: HttpMethod) {
        self.total.increment_in_flight();
        if let Some(s) = self.statistic_by_method(method) {
            s.increment_in_flight();
        }
    }

    pub(crate) fn decrement_in_flight(&self, method: HttpMethod) {
        self.total.decrement_in_flight();
        if let Some(s) = self.statistic_by_method(method) {
            s.decrement_in_flight();
        }
    }
}
