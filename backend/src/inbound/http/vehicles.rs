//! Vehicle entry and exit handlers.
//!
//! ```text
//! POST /api/v1/vehicles
//! GET  /api/v1/vehicles
//! GET  /api/v1/vehicles/{sessionId}/quote
//! POST /api/v1/vehicles/{sessionId}/settle {"paymentMethod":"cash"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    EnterVehicleRequest, ParkingSessionPayload, SettleExitRequest, SettlementReceipt,
};
use crate::domain::{Error, FeeQuote, PaymentMethod, PaymentStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/v1/vehicles/{sessionId}/settle`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleBody {
    pub payment_method: PaymentMethod,
    /// Defaults to `completed`.
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// Park a vehicle in the requested slot.
#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    request_body = EnterVehicleRequest,
    responses(
        (status = 201, description = "Session opened", body = ParkingSessionPayload),
        (status = 400, description = "Invalid owner or vehicle details", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown slot", body = Error),
        (status = 409, description = "Slot occupied, class mismatch or vehicle already parked", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "enterVehicle"
)]
#[post("/vehicles")]
pub async fn enter_vehicle(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EnterVehicleRequest>,
) -> ApiResult<HttpResponse> {
    session.require_operator()?;
    let opened = state.parking.enter_vehicle(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(ParkingSessionPayload::from(opened)))
}

/// Vehicles currently parked, oldest entry first.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    responses(
        (status = 200, description = "Active sessions", body = [ParkingSessionPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "listActiveVehicles"
)]
#[get("/vehicles")]
pub async fn list_active_vehicles(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ParkingSessionPayload>>> {
    session.require_operator()?;
    let active = state.parking_query.list_active_vehicles().await?;
    Ok(web::Json(
        active.into_iter().map(ParkingSessionPayload::from).collect(),
    ))
}

/// Fee the session would owe if it left now. Changes nothing.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{sessionId}/quote",
    params(("sessionId" = String, Path, description = "Active session id")),
    responses(
        (status = 200, description = "Fee preview", body = FeeQuote),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such active session", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "quoteExit"
)]
#[get("/vehicles/{session_id}/quote")]
pub async fn quote_exit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<FeeQuote>> {
    session.require_operator()?;
    let quote = state.parking_query.quote_exit(&path.into_inner()).await?;
    Ok(web::Json(quote))
}

/// Close the session, record payment and free the slot.
#[utoipa::path(
    post,
    path = "/api/v1/vehicles/{sessionId}/settle",
    params(("sessionId" = String, Path, description = "Active session id")),
    request_body = SettleBody,
    responses(
        (status = 200, description = "Receipt", body = SettlementReceipt),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such active session", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["vehicles"],
    operation_id = "settleExit"
)]
#[post("/vehicles/{session_id}/settle")]
pub async fn settle_exit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SettleBody>,
) -> ApiResult<web::Json<SettlementReceipt>> {
    session.require_operator()?;
    let SettleBody {
        payment_method,
        payment_status,
    } = payload.into_inner();
    let receipt = state
        .parking
        .settle_exit(SettleExitRequest {
            session_id: path.into_inner(),
            payment_method,
            payment_status,
        })
        .await?;
    Ok(web::Json(receipt))
}

#[cfg(test)]
#[path = "vehicles_tests.rs"]
mod tests;
