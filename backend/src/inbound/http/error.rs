//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn parking failures into consistent JSON responses and
//! status codes.

use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, ParkingError};
use crate::middleware::trace::{TRACE_ID_HEADER, TraceId};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(value) =
            TraceId::current().and_then(|id| HeaderValue::from_str(&id.to_string()).ok())
        {
            builder.insert_header((HeaderName::from_static(TRACE_ID_HEADER), value));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

impl From<ParkingError> for Error {
    fn from(err: ParkingError) -> Self {
        let message = err.to_string();
        match err {
            ParkingError::InvalidRequest { .. } => Error::invalid_request(message),
            ParkingError::InvalidTimeRange { entry, exit } => Error::invalid_request(message)
                .with_details(json!({ "entryTime": entry, "exitTime": exit })),
            ParkingError::Storage { .. } => {
                Error::service_unavailable("parking storage is unavailable")
            }
            ParkingError::SlotNotFound { slot_id } => {
                Error::not_found(message).with_details(json!({ "slotId": slot_id }))
            }
            ParkingError::SessionNotFound { session_id } => {
                Error::not_found(message).with_details(json!({ "sessionId": session_id }))
            }
            ParkingError::SlotOccupied { slot_id, occupant } => {
                Error::conflict(message).with_details(json!({
                    "slotId": slot_id.to_string(),
                    "occupant": occupant.to_string(),
                }))
            }
            ParkingError::VehicleClassMismatch {
                slot_id,
                slot_class,
                requested,
            } => Error::conflict(message).with_details(json!({
                "slotId": slot_id.to_string(),
                "slotClass": slot_class,
                "requested": requested,
            })),
            ParkingError::VehicleAlreadyParked { plate, slot_id } => {
                Error::conflict(message).with_details(json!({
                    "plateNumber": plate,
                    "slotId": slot_id.to_string(),
                }))
            }
            ParkingError::DuplicateActiveSession { plate } => {
                Error::conflict(message).with_details(json!({ "plateNumber": plate }))
            }
        }
    }
}
