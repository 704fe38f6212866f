//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::AllocationService;
use crate::domain::ports::{CredentialVerifier, FixtureCredentialVerifier};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryParkingStore;
use crate::test_support::MutableClock;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// 2024-03-01 09:00 UTC.
pub fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// State over an in-memory lot with two slots per class and a test clock.
pub async fn memory_state() -> (HttpState, Arc<MutableClock>) {
    memory_state_with(Arc::new(FixtureCredentialVerifier)).await
}

pub async fn memory_state_with(
    credentials: Arc<dyn CredentialVerifier>,
) -> (HttpState, Arc<MutableClock>) {
    use crate::domain::ports::ParkingCommand as _;

    let clock = Arc::new(MutableClock::new(opening_time()));
    let store = InMemoryParkingStore::new();
    let service = Arc::new(AllocationService::new(
        Arc::new(store.slot_registry()),
        Arc::new(store.session_ledger()),
        clock.clone(),
    ));
    service
        .initialize_parking_lot(2, 2)
        .await
        .expect("initialise lot");
    (
        HttpState::new(credentials, service.clone(), service),
        clock,
    )
}

/// Extract the session cookie set by a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Sign in with the fixture operator and return the session cookie.
///
/// The app must mount `login` under `/api/v1` and hold a state whose
/// verifier accepts [`FixtureCredentialVerifier`]'s pair.
pub async fn operator_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
) -> Cookie<'static> {
    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({
                "username": FixtureCredentialVerifier::USERNAME,
                "password": FixtureCredentialVerifier::PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "fixture login failed");
    session_cookie(&res)
}
