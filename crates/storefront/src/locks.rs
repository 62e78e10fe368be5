//! Per-session cart locks.
//!
//! The cart engine is stateless, so whole-request consistency hangs on the
//! load-mutate-save cycle against the session store. Two concurrent requests
//! from the same browser session that both read the same prior cart and then
//! save would lose one of the updates; handlers take the session's lock for
//! the whole cycle instead. Entries are evicted after sitting idle, so the
//! registry stays bounded by the set of recently active sessions.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Locks are dropped after this much inactivity.
const LOCK_IDLE_EVICTION: Duration = Duration::from_secs(30 * 60);

/// Upper bound on concurrently tracked sessions.
const LOCK_CAPACITY: u64 = 100_000;

/// Registry of one mutex per session id.
#[derive(Clone)]
pub struct CartLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl CartLocks {
    /// Create an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(LOCK_CAPACITY)
                .time_to_idle(LOCK_IDLE_EVICTION)
                .build(),
        }
    }

    /// Take the session's cart lock, creating it on first use.
    ///
    /// The returned guard serializes every cart load-mutate-save cycle for
    /// the session; hold it until the updated document is saved.
    pub async fn acquire(&self, session_key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(session_key.to_owned(), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}

impl Default for CartLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_same_key_shares_one_mutex() {
        let locks = CartLocks::new();
        let guard = locks.acquire("session-a").await;

        // A second acquire on the same key must wait for the guard.
        let pending =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("session-a")).await;
        assert!(pending.is_err());

        // A different session is unaffected.
        let other =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("session-b")).await;
        assert!(other.is_ok());

        drop(guard);
        let reacquired =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("session-a")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_guarded_cycles_do_not_lose_updates() {
        let locks = CartLocks::new();
        let stored = Arc::new(AtomicI64::new(0));

        // Each task simulates a full load-mutate-save cycle with a yield in
        // the middle, the exact interleaving that loses an increment when
        // the cycles are not serialized.
        let mut handles = Vec::new();
        for _ in 0..2 {
            let locks = locks.clone();
            let stored = stored.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("session-a").await;
                let read = stored.load(Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                stored.store(read + 1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(stored.load(Ordering::SeqCst), 2);
    }
}
