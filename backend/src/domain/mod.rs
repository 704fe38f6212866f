//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed parking model (slots, sessions, fees)
//! and the allocation service that enforces the lot's occupancy rules.
//! Storage and transport live behind the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - VehicleClass, PlateNumber, OwnerName, MobileNumber: validated entry values.
//! - SlotId, Slot, SlotCounts: the fixed slot catalogue.
//! - SessionId, ParkingSession, SessionClosure: session lifecycle.
//! - FeeSchedule, FeeQuote, compute_fee: fee calculation.
//! - AllocationService: implements the parking driving ports.

pub mod error;
pub mod ports;

mod allocation_service;
mod auth;
mod fee;
mod keyed_locks;
mod parking_error;
mod session;
mod slot;
mod vehicle;

pub use self::allocation_service::AllocationService;
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::fee::{FeeError, FeeQuote, FeeSchedule, compute_fee};
pub use self::parking_error::ParkingError;
pub use self::session::{
    ParkingSession, ParkingSessionDraft, ParkingSessionValidationError, PaymentMethod,
    PaymentStatus, SessionClosure, SessionCloseError, SessionId, SessionIdValidationError,
    UnknownPaymentValue,
};
pub use self::slot::{Slot, SlotCounts, SlotId, SlotIdValidationError};
pub use self::vehicle::{
    MobileNumber, OwnerName, PlateNumber, UnknownVehicleClass, VehicleClass,
    VehicleValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use lotkeeper::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("login required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
