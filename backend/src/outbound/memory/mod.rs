//! In-process parking store.
//!
//! Both adapters share one table set behind a `RwLock`, so readers see a
//! consistent snapshot and each mutation is a single write-locked step. Used
//! when no database is configured or reachable, and by tests.

mod session_ledger;
mod slot_registry;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{ParkingSession, PlateNumber, SessionId, Slot, SlotId};

pub use self::session_ledger::InMemorySessionLedger;
pub use self::slot_registry::InMemorySlotRegistry;

#[derive(Debug, Default)]
struct Tables {
    slots: BTreeMap<SlotId, Slot>,
    sessions: HashMap<SessionId, ParkingSession>,
    active_by_plate: HashMap<PlateNumber, SessionId>,
}

/// Shared state behind the in-memory adapters.
///
/// # Examples
/// ```
/// use lotkeeper::outbound::memory::InMemoryParkingStore;
///
/// let store = InMemoryParkingStore::new();
/// let _slots = store.slot_registry();
/// let _ledger = store.session_ledger();
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryParkingStore {
    tables: Arc<RwLock<Tables>>,
}

/// Raised when a writer panicked while holding the table lock.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("in-memory parking store lock poisoned")]
struct Poisoned;

impl InMemoryParkingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot registry view over this store.
    pub fn slot_registry(&self) -> InMemorySlotRegistry {
        InMemorySlotRegistry::new(self.clone())
    }

    /// Session ledger view over this store.
    pub fn session_ledger(&self) -> InMemorySessionLedger {
        InMemorySessionLedger::new(self.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, Poisoned> {
        self.tables.read().map_err(|_| Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, Poisoned> {
        self.tables.write().map_err(|_| Poisoned)
    }
}
