use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Passive hook into a scan: progress notifications plus a polled cancellation check.
///
/// Both are consulted once per conversation. Neither may influence ordering; a cancelled scan
/// just stops early and returns what it has.
pub trait ScanObserver {
    fn on_progress(&mut self, _processed: usize, _total: usize) {}

    fn should_cancel(&self) -> bool {
        false
    }
}

impl ScanObserver for () {}

/// Adapts a `(processed, total)` closure into an observer.
pub struct ProgressFn<F: FnMut(usize, usize)>(pub F);

impl<F: FnMut(usize, usize)> ScanObserver for ProgressFn<F> {
    fn on_progress(&mut self, processed: usize, total: usize) {
        (self.0)(processed, total)
    }
}

/// Shared cancellation flag; clone it, hand one copy to the scan and flip the other.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl ScanObserver for CancelFlag {
    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}
