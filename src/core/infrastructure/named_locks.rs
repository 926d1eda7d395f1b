//! Process-wide registry of named mutual-exclusion locks.
//!
//! Resources that mutate the same remote object (for example the DNS servers and
//! the virtual network itself) acquire the lock named after that object before
//! reading and rewriting it, so their read-modify-write windows never interleave.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

static SHARED: LazyLock<Arc<NamedLocks>> = LazyLock::new(|| Arc::new(NamedLocks::new()));

type LockTable = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// A registry of async mutexes keyed by `(resource type, name)`.
///
/// Entries are created on first use and removed once no guard or waiter
/// refers to them, so the registry only holds names that are in use.
#[derive(Debug, Default)]
pub struct NamedLocks {
    locks: Arc<LockTable>,
}

impl NamedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registry shared by the whole process.
    pub fn shared() -> Arc<NamedLocks> {
        Arc::clone(&SHARED)
    }

    /// Waits until the lock for `name` of `resource_type` is free and takes it.
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn acquire(&self, name: &str, resource_type: &str) -> NamedLockGuard {
        let key = lock_key(name, resource_type);
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Left behind by waiters that gave up before getting the lock.
            locks.retain(|_, m| Arc::strong_count(m) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        debug!(lock = %key, "acquiring lock");
        let guard = mutex.lock_owned().await;
        debug!(lock = %key, "acquired lock");

        NamedLockGuard {
            key,
            table: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Returns the number of names currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the lock is currently held.
    pub fn is_locked(&self, name: &str, resource_type: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .get(&lock_key(name, resource_type))
            .map(|m| m.try_lock().is_err())
            .unwrap_or(false)
    }
}

fn lock_key(name: &str, resource_type: &str) -> String {
    format!("{}.{}", resource_type, name)
}

/// Holds a named lock until dropped.
#[derive(Debug)]
pub struct NamedLockGuard {
    key: String,
    table: Arc<LockTable>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl NamedLockGuard {
    /// Releases the lock. Equivalent to dropping the guard.
    pub fn release(self) {}

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the table refers to the mutex: nobody holds or waits for it.
        if locks
            .get(&self.key)
            .is_some_and(|m| Arc::strong_count(m) == 1)
        {
            locks.remove(&self.key);
        }
        debug!(lock = %self.key, "released lock");
    }
}
