//! Per-item serialization of selection-stat updates.
//!
//! Stores that cannot update a row atomically funnel every read-modify-write of
//! an item's stats through the lock for that item id. Updates on different items
//! never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutexes, one per item id.
#[derive(Debug, Clone, Default)]
pub struct SelectionLocks {
    /// Lock per item id
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SelectionLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the given item.
    ///
    /// The returned guard releases the item when dropped.
    pub async fn acquire(&self, item_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(item_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop the entry for `item_id` once nobody holds or waits on it.
    ///
    /// Call after the guard from [`SelectionLocks::acquire`] is dropped.
    pub async fn release(&self, item_id: &str) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(item_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(item_id);
        }
    }

    /// Drop locks nobody holds or waits on
    pub async fn prune(&self) -> usize {
        let mut locks = self.locks.lock().await;
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Number of item ids with a lock entry
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Check if the table is empty
    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}
