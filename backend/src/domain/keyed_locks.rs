//! Per-key async locks used to serialise mutations on one slot or plate.
//!
//! Entries are created on demand and pruned once the last holder or waiter
//! lets go, so the table only ever holds keys with live interest.

use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{PlateNumber, SlotId};

type LockTable = HashMap<String, Arc<AsyncMutex<()>>>;

/// Lock key for a slot.
pub(crate) fn slot_key(slot_id: SlotId) -> String {
    format!("slot:{slot_id}")
}

/// Lock key for a plate.
pub(crate) fn plate_key(plate: &PlateNumber) -> String {
    format!("plate:{plate}")
}

/// Table of named async mutexes.
#[derive(Debug, Default, Clone)]
pub(crate) struct KeyedLocks {
    table: Arc<Mutex<LockTable>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Lock every key in `keys`, waiting for current holders.
    ///
    /// Keys are deduplicated and taken in sorted order, so callers locking
    /// overlapping sets cannot deadlock each other.
    pub(crate) async fn acquire<I>(&self, keys: I) -> KeyedGuard
    where
        I: IntoIterator<Item = String>,
    {
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mutexes: Vec<_> = keys.iter().map(|key| self.entry(key)).collect();
        let mut guard = KeyedGuard {
            table: Arc::clone(&self.table),
            keys,
            held: Vec::with_capacity(mutexes.len()),
        };
        for mutex in mutexes {
            guard.held.push(mutex.lock_owned().await);
        }
        guard
    }

    fn entry(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(table.entry(key.to_owned()).or_default())
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Holds a set of keyed locks until dropped.
#[derive(Debug)]
pub(crate) struct KeyedGuard {
    table: Arc<Mutex<LockTable>>,
    keys: Vec<String>,
    held: Vec<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        drop(mem::take(&mut self.held));
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        for key in &self.keys {
            let unused = table
                .get(key)
                .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
            if unused {
                table.remove(key);
            }
        }
    }
}
