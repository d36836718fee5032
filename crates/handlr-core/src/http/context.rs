use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

/// Cloneable cancellation signal shared between the transport and the handler.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once [`CancelHandle::cancel`] has been called.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Per-request state carried alongside the request.
///
/// Handlers use it to set the success status and extra response headers.
/// Those are applied only when the handler body succeeds.
#[derive(Debug)]
pub struct RequestContext {
    id: u64,
    cancel: CancelHandle,
    status: Option<u16>,
    headers: Vec<(String, String)>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_cancel(CancelHandle::new())
    }

    /// Context bound to a cancel handle owned by the transport.
    pub fn with_cancel(cancel: CancelHandle) -> Self {
        Self {
            id: REQUEST_SEQ.fetch_add(1, Ordering::Relaxed),
            cancel,
            status: None,
            headers: Vec::new(),
        }
    }

    /// Process-wide request sequence number.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .push((name.as_ref().to_ascii_lowercase(), value.into()));
    }

    /// Drain pending response headers.
    pub fn take_headers(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.headers)
    }
}
