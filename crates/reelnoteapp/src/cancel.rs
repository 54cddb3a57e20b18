use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ReelnoteError, Result};

/// Cooperative cancellation shared between a UI and a running batch.
///
/// Cloning shares the flag. The batch checks it before each note, and the
/// catalog client checks it before every request attempt and while backing off.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ReelnoteError::Cancelled)
        } else {
            Ok(())
        }
    }
}
