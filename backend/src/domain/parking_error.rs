//! Failure taxonomy for parking operations.

use chrono::{DateTime, Utc};

use super::ports::define_port_error;
use super::{SessionId, SlotId, VehicleClass};

define_port_error! {
    /// Errors returned by the allocation service.
    pub enum ParkingError {
        /// Caller input failed validation.
        InvalidRequest { message: String } => "invalid request: {message}",
        /// A backing store failed; the operation had no lasting effect.
        Storage { message: String } => "parking storage failed: {message}",
        SlotNotFound { slot_id: String } => "slot {slot_id} does not exist",
        SlotOccupied { slot_id: SlotId, occupant: SessionId } =>
            "slot {slot_id} is already occupied by session {occupant}",
        VehicleClassMismatch {
            slot_id: SlotId,
            slot_class: VehicleClass,
            requested: VehicleClass,
        } => "slot {slot_id} accepts {slot_class} vehicles, not {requested}",
        /// The plate already has an active session.
        VehicleAlreadyParked { plate: String, slot_id: SlotId } =>
            "vehicle {plate} is already parked in slot {slot_id}",
        SessionNotFound { session_id: String } =>
            "no active session {session_id}",
        /// Storage refused a second active session for the plate.
        DuplicateActiveSession { plate: String } =>
            "vehicle {plate} already has an active session",
        InvalidTimeRange { entry: DateTime<Utc>, exit: DateTime<Utc> } =>
            "exit time {exit} precedes entry time {entry}",
    }
}

impl ParkingError {
    /// Whether the failure came from storage rather than a domain rule.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}
