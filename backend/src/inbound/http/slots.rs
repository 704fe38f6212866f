//! Slot catalogue handlers.
//!
//! ```text
//! GET /api/v1/slots
//! GET /api/v1/slots/available?vehicleClass=2W
//! GET /api/v1/slots/summary
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::ports::{OccupancySummary, SlotPayload};
use crate::domain::{Error, VehicleClass};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query string for `GET /api/v1/slots/available`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailableSlotsQuery {
    /// `2W` or `4W`.
    #[param(example = "2W")]
    pub vehicle_class: Option<String>,
}

fn parse_vehicle_class(raw: Option<&str>) -> Result<VehicleClass, Error> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(Error::invalid_request("vehicleClass is required")
            .with_details(json!({ "field": "vehicleClass", "code": "missing" })));
    }
    raw.parse().map_err(|err: crate::domain::UnknownVehicleClass| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "vehicleClass", "code": "unknown_vehicle_class" }))
    })
}

/// Every slot with its occupancy.
#[utoipa::path(
    get,
    path = "/api/v1/slots",
    responses(
        (status = 200, description = "Slot catalogue", body = [SlotPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["slots"],
    operation_id = "listSlots"
)]
#[get("/slots")]
pub async fn list_slots(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<SlotPayload>>> {
    session.require_operator()?;
    let slots = state.parking_query.list_all_slots().await?;
    Ok(web::Json(slots.iter().map(SlotPayload::from).collect()))
}

/// Free slot ids for one vehicle class, in slot-number order.
#[utoipa::path(
    get,
    path = "/api/v1/slots/available",
    params(AvailableSlotsQuery),
    responses(
        (status = 200, description = "Free slot ids", body = [String]),
        (status = 400, description = "Missing or unknown vehicle class", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["slots"],
    operation_id = "listAvailableSlots"
)]
#[get("/slots/available")]
pub async fn list_available_slots(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AvailableSlotsQuery>,
) -> ApiResult<web::Json<Vec<String>>> {
    session.require_operator()?;
    let vehicle_class = parse_vehicle_class(query.vehicle_class.as_deref())?;
    let ids = state
        .parking_query
        .list_available_slots(vehicle_class)
        .await?;
    Ok(web::Json(ids.iter().map(ToString::to_string).collect()))
}

/// Total, free and occupied counts per class.
#[utoipa::path(
    get,
    path = "/api/v1/slots/summary",
    responses(
        (status = 200, description = "Occupancy per class", body = OccupancySummary),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["slots"],
    operation_id = "slotSummary"
)]
#[get("/slots/summary")]
pub async fn slot_summary(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<OccupancySummary>> {
    session.require_operator()?;
    Ok(web::Json(state.parking_query.occupancy_summary().await?))
}
