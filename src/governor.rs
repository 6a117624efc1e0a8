//! Per-Provider Concurrency Governor
//!
//! Bounded admission control over in-flight validations, one governor per
//! provider. Admission hands back an owned permit that releases its slot on
//! drop, so the slot is returned on every exit path — success, failure, or
//! cancellation — and a misbehaving adapter can never leak capacity.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;

/// Bounded admission gate for one provider's validations.
#[derive(Clone)]
pub struct ConcurrencyGovernor {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyGovernor {
    /// A governor admitting at most `capacity` concurrent validations.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Configured slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Currently free slots. Test/diagnostic visibility only.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a slot, or bail out when the caller cancels.
    ///
    /// Cancellation during the wait aborts admission without side effects.
    pub async fn admit(
        &self,
        cancel: &CancellationToken,
    ) -> Result<OwnedSemaphorePermit, KeyCheckError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(KeyCheckError::Cancelled),
            permit = self.semaphore.clone().acquire_owned() => permit
                .map_err(|_| KeyCheckError::InternalError("governor semaphore closed".into())),
        }
    }
}

impl std::fmt::Debug for ConcurrencyGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrencyGovernor")
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permits_release_on_drop() {
        let governor = ConcurrencyGovernor::new(2);
        let cancel = CancellationToken::new();

        let first = governor.admit(&cancel).await.unwrap();
        let second = governor.admit(&cancel).await.unwrap();
        assert_eq!(governor.available(), 0);

        drop(first);
        assert_eq!(governor.available(), 1);
        drop(second);
        assert_eq!(governor.available(), 2);
    }

    #[tokio::test]
    async fn cancelled_wait_has_no_side_effects() {
        let governor = ConcurrencyGovernor::new(1);
        let cancel = CancellationToken::new();
        let _held = governor.admit(&cancel).await.unwrap();

        let waiter_cancel = cancel.child_token();
        waiter_cancel.cancel();
        let outcome = governor.admit(&waiter_cancel).await;
        assert!(matches!(outcome, Err(KeyCheckError::Cancelled)));
        assert_eq!(governor.available(), 0);
    }
}
