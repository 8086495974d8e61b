//! Per-wager settlement leases
//!
//! Two settlement runs for the same wager must never interleave; runs for
//! different wagers proceed in parallel.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct WagerLeases {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held for the duration of one settlement run
pub struct WagerLease {
    wager_id: String,
    _guard: OwnedMutexGuard<()>,
}

impl WagerLease {
    pub fn wager_id(&self) -> &str {
        &self.wager_id
    }
}

impl WagerLeases {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, wager_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(wager_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Wait for the lease on `wager_id`
    pub async fn acquire(&self, wager_id: &str) -> WagerLease {
        let lock = self.lock_for(wager_id);
        WagerLease {
            wager_id: wager_id.to_string(),
            _guard: lock.lock_owned().await,
        }
    }

    /// Lease only if nobody else holds it
    pub fn try_acquire(&self, wager_id: &str) -> Option<WagerLease> {
        let lock = self.lock_for(wager_id);
        let guard = lock.try_lock_owned().ok()?;
        Some(WagerLease {
            wager_id: wager_id.to_string(),
            _guard: guard,
        })
    }

    /// Give a lease back. The wager's lock is forgotten once nobody else
    /// holds or waits on it.
    pub fn release(&self, lease: WagerLease) {
        let WagerLease { wager_id, _guard: guard } = lease;
        drop(guard);
        // the map's own Arc is the only one left
        self.locks
            .remove_if(&wager_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_wager_is_exclusive() {
        let leases = WagerLeases::new();
        let held = leases.acquire("w1").await;
        assert_eq!(held.wager_id(), "w1");
        assert!(leases.try_acquire("w1").is_none());
        assert!(leases.try_acquire("w2").is_some());
        drop(held);
        assert!(leases.try_acquire("w1").is_some());
    }

    #[tokio::test]
    async fn test_release_forgets_idle_wagers() {
        let leases = WagerLeases::new();
        let held = leases.acquire("w1").await;
        let other = leases.acquire("w2").await;
        leases.release(other);
        assert_eq!(leases.len(), 1);
        leases.release(held);
        assert!(leases.is_empty());
    }

    #[tokio::test]
    async fn test_release_keeps_lock_with_waiter() {
        let leases = Arc::new(WagerLeases::new());
        let held = leases.acquire("w1").await;

        let waiter = {
            let leases = leases.clone();
            tokio::spawn(async move {
                let lease = leases.acquire("w1").await;
                leases.release(lease);
            })
        };
        // let the waiter queue on the lock
        while Arc::strong_count(&leases.lock_for("w1")) < 4 {
            tokio::task::yield_now().await;
        }
        leases.release(held);
        waiter.await.unwrap();
        assert!(leases.is_empty());
    }
}
