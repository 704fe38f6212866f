//! In-memory slot registry adapter.

use async_trait::async_trait;

use crate::domain::ports::{SlotRegistry, SlotRegistryError};
use crate::domain::{SessionId, Slot, SlotCounts, SlotId, VehicleClass};

use super::{InMemoryParkingStore, Poisoned};

fn map_poisoned(error: Poisoned) -> SlotRegistryError {
    SlotRegistryError::connection(error.to_string())
}

/// [`SlotRegistry`] over an [`InMemoryParkingStore`].
#[derive(Debug, Clone)]
pub struct InMemorySlotRegistry {
    store: InMemoryParkingStore,
}

impl InMemorySlotRegistry {
    pub fn new(store: InMemoryParkingStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SlotRegistry for InMemorySlotRegistry {
    async fn initialize(&self, counts: &SlotCounts) -> Result<bool, SlotRegistryError> {
        let mut tables = self.store.write().map_err(map_poisoned)?;
        if !tables.slots.is_empty() {
            return Ok(false);
        }
        tables.slots = counts
            .catalogue()
            .into_iter()
            .map(|slot| (slot.id(), slot))
            .collect();
        Ok(true)
    }

    async fn list_available(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<SlotId>, SlotRegistryError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        Ok(tables
            .slots
            .values()
            .filter(|slot| slot.vehicle_class() == vehicle_class && !slot.occupied())
            .map(Slot::id)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Slot>, SlotRegistryError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        Ok(tables.slots.values().cloned().collect())
    }

    async fn find(&self, slot_id: SlotId) -> Result<Option<Slot>, SlotRegistryError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        Ok(tables.slots.get(&slot_id).cloned())
    }

    async fn occupy(
        &self,
        slot_id: SlotId,
        session_id: &SessionId,
    ) -> Result<(), SlotRegistryError> {
        let mut tables = self.store.write().map_err(map_poisoned)?;
        let slot = tables
            .slots
            .get_mut(&slot_id)
            .ok_or_else(|| SlotRegistryError::slot_not_found(slot_id))?;
        if let Some(occupant) = slot.session_id() {
            return Err(SlotRegistryError::slot_already_occupied(
                slot_id,
                occupant.clone(),
            ));
        }
        slot.set_occupant(Some(session_id.clone()));
        Ok(())
    }

    async fn release(&self, slot_id: SlotId) -> Result<(), SlotRegistryError> {
        let mut tables = self.store.write().map_err(map_poisoned)?;
        let slot = tables
            .slots
            .get_mut(&slot_id)
            .ok_or_else(|| SlotRegistryError::slot_not_found(slot_id))?;
        slot.set_occupant(None);
        Ok(())
    }
}
