//! Keyed mutual exclusion.
//!
//! Cloning and dependency installation are expensive and not safe to run
//! twice in parallel for the same checkout, so callers serialize per cache
//! key: the second caller for a key waits for the first to finish and then
//! re-checks the cache. Callers for different keys do not contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// A map of per-key async mutexes. Entries exist only while a holder or
/// waiter references them; the last guard out removes the map entry.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: LockMap,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting behind any in-flight holder.
    pub async fn acquire(&self, key: &str) -> KeyLockGuard {
        let mutex = {
            let mut map = self.locks.lock().expect("keyed lock map poisoned");
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = mutex.lock_owned().await;
        KeyLockGuard {
            key: key.to_string(),
            locks: self.locks.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.lock().expect("keyed lock map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held lock for one key. Dropping releases the key and removes the map
/// entry once no other caller references it.
pub struct KeyLockGuard {
    key: String,
    locks: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyLockGuard {
    fn drop(&mut self) {
        // Release the mutex before inspecting the refcount, so a queued
        // waiter can proceed immediately.
        self.guard.take();

        let mut map = self.locks.lock().expect("keyed lock map poisoned");
        if let Some(mutex) = map.get(&self.key) {
            // strong_count == 1 means only the map itself still references
            // the mutex: no holder, no waiters.
            if Arc::strong_count(mutex) == 1 {
                map.remove(&self.key);
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
