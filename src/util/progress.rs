//! Progress and cancellation token for long-running operations.
//!
//! The write path runs on a worker thread; callers observe it through a
//! shared [`ProgressToken`]. Cancellation is cooperative: the op checks the
//! token before starting each sub-step, and a sub-step that already ran is
//! never rolled back.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    completed: AtomicU32,
    total: AtomicU32,
    step: Mutex<String>,
}

/// Shared handle for observing and cancelling a background operation.
#[derive(Debug, Clone, Default)]
pub struct ProgressToken {
    inner: Arc<Inner>,
}

impl ProgressToken {
    pub fn new() -> Self {
        ProgressToken::default()
    }

    /// Request cancellation. The operation stops before its next sub-step.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Set the total number of work units for this operation.
    pub fn begin(&self, total: u32) {
        self.inner.total.store(total, Ordering::SeqCst);
        self.inner.completed.store(0, Ordering::SeqCst);
    }

    /// Record completed work units.
    pub fn worked(&self, units: u32) {
        self.inner.completed.fetch_add(units, Ordering::SeqCst);
    }

    /// Name the sub-step currently running.
    pub fn set_step(&self, step: impl Into<String>) {
        *self.inner.step.lock().unwrap_or_else(|e| e.into_inner()) = step.into();
    }

    pub fn step(&self) -> String {
        self.inner
            .step
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn completed(&self) -> u32 {
        self.inner.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u32 {
        self.inner.total.load(Ordering::SeqCst)
    }
}
