//! Per-key async mutual exclusion
//!
//! Serializes read-modify-write cycles on the same key inside one process.
//! Entries are removed once no task holds or waits on them.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// Held for the duration of one critical section on a key
pub struct KeyGuard {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> KeyGuard {
        // Created before waiting so a cancelled wait still prunes the entry
        let mut key_guard = KeyGuard {
            locks: self.locks.clone(),
            key: key.to_string(),
            guard: None,
        };

        // The map shard lock is released before awaiting the key mutex
        let mutex = self.locks.entry(key.to_string()).or_default().clone();
        key_guard.guard = Some(mutex.lock_owned().await);
        key_guard
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody holds or waits on this key
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
