//! Port for the fixed slot catalogue and its occupancy.

use async_trait::async_trait;

use crate::domain::{SessionId, Slot, SlotCounts, SlotId, VehicleClass};

use super::define_port_error;

define_port_error! {
    /// Errors raised by slot registry adapters.
    pub enum SlotRegistryError {
        /// Registry connection could not be established.
        Connection { message: String } =>
            "slot registry connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "slot registry query failed: {message}",
        SlotNotFound { slot_id: SlotId } => "slot {slot_id} does not exist",
        /// A conditional occupy found the slot already taken.
        SlotAlreadyOccupied { slot_id: SlotId, occupant: SessionId } =>
            "slot {slot_id} is already occupied by session {occupant}",
    }
}

/// Port for reading and mutating slot occupancy.
///
/// Slots are listed in natural id order: two-wheeler slots first, then by
/// slot number.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotRegistry: Send + Sync {
    /// Create the catalogue when the registry is empty.
    ///
    /// Returns `true` when slots were created and `false` when the registry
    /// was already populated.
    async fn initialize(&self, counts: &SlotCounts) -> Result<bool, SlotRegistryError>;

    /// Ids of unoccupied slots of `vehicle_class`.
    async fn list_available(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<SlotId>, SlotRegistryError>;

    /// Every slot with its occupancy.
    async fn list_all(&self) -> Result<Vec<Slot>, SlotRegistryError>;

    async fn find(&self, slot_id: SlotId) -> Result<Option<Slot>, SlotRegistryError>;

    /// Mark a free slot as occupied by `session_id`.
    ///
    /// Must be a single conditional update: a slot that is already occupied
    /// yields [`SlotRegistryError::SlotAlreadyOccupied`].
    async fn occupy(&self, slot_id: SlotId, session_id: &SessionId)
    -> Result<(), SlotRegistryError>;

    /// Clear occupancy. Releasing a free slot succeeds.
    async fn release(&self, slot_id: SlotId) -> Result<(), SlotRegistryError>;
}
