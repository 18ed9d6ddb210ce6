use std::sync::atomic::{AtomicBool, Ordering};

static GLOBAL_CANCEL: CancelFlag = CancelFlag::new();

/// Cooperative cancellation flag, polled by running tasks once per output row.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// The process-wide flag the host sets to stop a run.
    pub fn global() -> &'static CancelFlag {
        &GLOBAL_CANCEL
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
