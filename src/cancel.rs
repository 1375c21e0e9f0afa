use crate::errors::{CoreError, Operation, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag checked before every remote call.
///
/// Cancelling never interrupts a call in flight; the walk stops before the
/// next one.
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

    /// Errors with `Cancelled` if cancellation was requested.
    pub fn check(&self, op: Operation, path: &str) -> Result<()> {
        if self.is_cancelled() {
            Err(CoreError::Cancelled {
                op,
                path: path.to_string(),
            })
        } else {
            Ok(())
        }
    }
}
