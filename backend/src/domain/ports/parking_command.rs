//! Driving port for parking lot mutations.
//!
//! Inbound adapters hand raw request values to this port; validation and the
//! entry/settle discipline live behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ParkingError, ParkingSession, PaymentMethod, PaymentStatus, Slot, VehicleClass,
};

/// Request to park a vehicle in a chosen slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnterVehicleRequest {
    #[schema(example = "Asha Rao")]
    pub owner_name: String,
    #[schema(example = "9000000000")]
    pub owner_mobile: String,
    #[schema(example = "KA05CD5678")]
    pub plate_number: String,
    pub vehicle_class: VehicleClass,
    #[schema(example = "4W-03")]
    pub slot_id: String,
}

/// Request to settle an active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleExitRequest {
    pub session_id: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// Outcome of a successful settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    pub session_id: String,
    pub slot_id: String,
    pub exit_time: DateTime<Utc>,
    pub fee: u64,
    pub duration_hours: u32,
    #[schema(example = "Vehicle exited after 2 hour(s). Payment of ₹120 received via cash.")]
    pub message: String,
}

/// Serialisable view of a parking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSessionPayload {
    pub session_id: String,
    pub owner_name: String,
    pub owner_mobile: String,
    pub plate_number: String,
    pub vehicle_class: VehicleClass,
    pub slot_id: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub fee: u64,
    pub duration_hours: Option<u32>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
}

impl From<&ParkingSession> for ParkingSessionPayload {
    fn from(value: &ParkingSession) -> Self {
        let closure = value.closure();
        Self {
            session_id: value.id().to_string(),
            owner_name: value.owner_name().as_ref().to_owned(),
            owner_mobile: value.owner_mobile().as_ref().to_owned(),
            plate_number: value.plate().to_string(),
            vehicle_class: value.vehicle_class(),
            slot_id: value.slot_id().to_string(),
            entry_time: value.entry_time(),
            exit_time: closure.map(|c| c.exit_time),
            fee: value.fee(),
            duration_hours: closure.map(|c| c.duration_hours),
            payment_method: closure.map(|c| c.payment_method),
            payment_status: closure.map(|c| c.payment_status),
        }
    }
}

impl From<ParkingSession> for ParkingSessionPayload {
    fn from(value: ParkingSession) -> Self {
        Self::from(&value)
    }
}

/// Serialisable view of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotPayload {
    #[schema(example = "2W-01")]
    pub slot_id: String,
    pub vehicle_class: VehicleClass,
    pub occupied: bool,
    pub session_id: Option<String>,
}

impl From<&Slot> for SlotPayload {
    fn from(value: &Slot) -> Self {
        Self {
            slot_id: value.id().to_string(),
            vehicle_class: value.vehicle_class(),
            occupied: value.occupied(),
            session_id: value.session_id().map(ToString::to_string),
        }
    }
}

/// Driving port for parking lot mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingCommand: Send + Sync {
    /// Create the slot catalogue if the lot is empty; returns whether slots
    /// were created.
    async fn initialize_parking_lot(
        &self,
        two_wheeler_count: u32,
        four_wheeler_count: u32,
    ) -> Result<bool, ParkingError>;

    /// Open a session for a vehicle in the requested slot.
    async fn enter_vehicle(
        &self,
        request: EnterVehicleRequest,
    ) -> Result<ParkingSession, ParkingError>;

    /// Close an active session, record payment and free its slot.
    async fn settle_exit(
        &self,
        request: SettleExitRequest,
    ) -> Result<SettlementReceipt, ParkingError>;
}
