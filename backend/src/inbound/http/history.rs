//! Closed-session history.
//!
//! ```text
//! GET /api/v1/history?limit=50&offset=100
//! ```

use actix_web::{get, web};
use serde::Deserialize;

use crate::domain::Error;
use crate::domain::ports::{HistoryPage, ParkingSessionPayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Paging query for `GET /api/v1/history`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Page size; defaults to 100 and is capped at 500.
    pub limit: Option<usize>,
    /// Rows to skip; defaults to 0.
    pub offset: Option<usize>,
}

/// Closed sessions, most recent exit first.
#[utoipa::path(
    get,
    path = "/api/v1/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Closed sessions", body = [ParkingSessionPayload]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["history"],
    operation_id = "listHistory"
)]
#[get("/history")]
pub async fn list_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<HistoryQuery>,
) -> ApiResult<web::Json<Vec<ParkingSessionPayload>>> {
    session.require_operator()?;
    let page = HistoryPage::new(query.limit, query.offset);
    let sessions = state.parking_query.list_history(page).await?;
    Ok(web::Json(
        sessions.into_iter().map(ParkingSessionPayload::from).collect(),
    ))
}
