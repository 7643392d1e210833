//! Cooperative cancellation for walks and lookups

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation handle
///
/// Every clone observes the same flag. Walks and lookups check it before each
/// loader call and at each traversal step, and fail with
/// [`crate::Error::Cancelled`] once it is set.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with `Cancelled` carrying `path` if cancellation was requested
    pub(crate) fn check(&self, path: &[u8]) -> crate::Result<()> {
        if self.is_cancelled() {
            tracing::debug!(path = %String::from_utf8_lossy(path), "cancellation observed");
            return Err(crate::Error::cancelled(path));
        }
        Ok(())
    }
}
