//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every operator endpoint, the parking payload schemas
//! and the session cookie security scheme. Swagger UI serves it in debug
//! builds.

use crate::domain::ports::{
    ClassOccupancy, EnterVehicleRequest, OccupancySummary, ParkingSessionPayload,
    SettlementReceipt, SlotPayload,
};
use crate::domain::{Error, ErrorCode, FeeQuote, PaymentMethod, PaymentStatus, VehicleClass};
use crate::inbound::http::operator::LoginRequest;
use crate::inbound::http::vehicles::SettleBody;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Add the session cookie security scheme to the generated document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Operator session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the operator API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lotkeeper API",
        description = "Slot allocation, vehicle entry and exit, fee settlement and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::operator::login,
        crate::inbound::http::operator::logout,
        crate::inbound::http::slots::list_slots,
        crate::inbound::http::slots::list_available_slots,
        crate::inbound::http::slots::slot_summary,
        crate::inbound::http::vehicles::enter_vehicle,
        crate::inbound::http::vehicles::list_active_vehicles,
        crate::inbound::http::vehicles::quote_exit,
        crate::inbound::http::vehicles::settle_exit,
        crate::inbound::http::history::list_history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        EnterVehicleRequest,
        SettleBody,
        ParkingSessionPayload,
        SlotPayload,
        FeeQuote,
        SettlementReceipt,
        ClassOccupancy,
        OccupancySummary,
        VehicleClass,
        PaymentMethod,
        PaymentStatus,
    )),
    tags(
        (name = "operator", description = "Operator sign-in"),
        (name = "slots", description = "Slot catalogue and occupancy"),
        (name = "vehicles", description = "Vehicle entry, fee quotes and settlement"),
        (name = "history", description = "Closed parking sessions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
