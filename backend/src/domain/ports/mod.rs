//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_verifier;
mod parking_command;
mod parking_query;
mod session_ledger;
mod slot_registry;

#[cfg(test)]
pub use credential_verifier::MockCredentialVerifier;
pub use credential_verifier::CredentialVerifier;
#[cfg(any(test, feature = "test-support"))]
pub use credential_verifier::FixtureCredentialVerifier;
#[cfg(test)]
pub use parking_command::MockParkingCommand;
pub use parking_command::{
    EnterVehicleRequest, ParkingCommand, ParkingSessionPayload, SettleExitRequest,
    SettlementReceipt, SlotPayload,
};
#[cfg(test)]
pub use parking_query::MockParkingQuery;
pub use parking_query::{
    ClassOccupancy, DEFAULT_HISTORY_LIMIT, HistoryPage, MAX_HISTORY_LIMIT, OccupancySummary,
    ParkingQuery,
};
#[cfg(test)]
pub use session_ledger::MockSessionLedger;
pub use session_ledger::{SessionLedger, SessionLedgerError};
#[cfg(test)]
pub use slot_registry::MockSlotRegistry;
pub use slot_registry::{SlotRegistry, SlotRegistryError};
