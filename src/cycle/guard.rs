use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Mutual-exclusion flag ensuring at most one cycle is in flight.
///
/// The scheduler and the gateway's on-demand triggers share one guard, so a
/// manual trigger can never overlap a scheduled run. A tick or request that
/// finds the slot taken is skipped, not queued.
#[derive(Clone)]
pub struct CycleGuard {
    semaphore: Arc<Semaphore>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Claim the in-flight slot. Returns `None` when a cycle is already
    /// running. The slot is released when the returned token is dropped.
    pub fn try_acquire(&self) -> Option<CycleSlot> {
        match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(permit) => Some(CycleSlot { _permit: permit }),
            Err(TryAcquireError::NoPermits | TryAcquireError::Closed) => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

impl Default for CycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned token for a claimed cycle slot; safe to move into a spawned task.
pub struct CycleSlot {
    _permit: OwnedSemaphorePermit,
}
