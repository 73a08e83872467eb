//! Single-permit fetch guard. Acquisition never waits: a second fetch while
//! the permit is out is rejected on the spot.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct FetchGuard {
    permit: Arc<Semaphore>,
}

impl Default for FetchGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchGuard {
    pub fn new() -> Self {
        Self { permit: Arc::new(Semaphore::new(1)) }
    }

    /// The permit, or `None` while a fetch holds it.
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.permit.clone().try_acquire_owned().ok()
    }

    pub fn is_busy(&self) -> bool {
        self.permit.available_permits() == 0
    }
}
