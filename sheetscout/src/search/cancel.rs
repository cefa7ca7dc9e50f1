use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop flag shared between the UI and the worker.
///
/// Cloning yields another handle to the same flag. The worker polls
/// [`is_cancelled`](Self::is_cancelled) between files and between rows; nothing
/// is interrupted mid-row.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clears a stop request left over from a previous search
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
