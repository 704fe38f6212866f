//! Tests for vehicle entry and exit handlers.

use super::*;
use crate::inbound::http::operator::login;
use crate::inbound::http::test_utils::{memory_state, operator_cookie, test_session_middleware};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};
use std::time::Duration;

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(enter_vehicle)
                .service(list_active_vehicles)
                .service(quote_exit)
                .service(settle_exit),
        )
}

fn entry_body(plate: &str, class: &str, slot: &str) -> Value {
    json!({
        "ownerName": "Asha Rao",
        "ownerMobile": "9000000000",
        "plateNumber": plate,
        "vehicleClass": class,
        "slotId": slot,
    })
}

fn post_json(uri: &str, body: Value, cookie: &Cookie<'static>) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
        .to_request()
}

fn get_with_cookie(uri: &str, cookie: &Cookie<'static>) -> actix_http::Request {
    actix_test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request()
}

#[rstest]
#[actix_web::test]
async fn entry_requires_login() {
    let (state, _clock) = memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/vehicles")
            .set_json(entry_body("KA05CD5678", "4W", "4W-01"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn entry_quote_and_settle_round_trip() {
    let (state, clock) = memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let cookie = operator_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        post_json(
            "/api/v1/vehicles",
            entry_body("ka05cd5678", "4W", "4W-01"),
            &cookie,
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let opened: ParkingSessionPayload = actix_test::read_body_json(res).await;
    assert_eq!(opened.session_id, "KA05CD5678-20240301090000");
    assert_eq!(opened.plate_number, "KA05CD5678");
    assert_eq!(opened.fee, 0);

    let res = actix_test::call_service(&app, get_with_cookie("/api/v1/vehicles", &cookie)).await;
    let active: Vec<ParkingSessionPayload> = actix_test::read_body_json(res).await;
    assert_eq!(active.len(), 1);

    clock.advance(Duration::from_secs(90 * 60));

    let quote_uri = format!("/api/v1/vehicles/{}/quote", opened.session_id);
    let res = actix_test::call_service(&app, get_with_cookie(&quote_uri, &cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let quote: Value = actix_test::read_body_json(res).await;
    assert_eq!(quote, json!({ "fee": 120, "durationHours": 2 }));

    let settle_uri = format!("/api/v1/vehicles/{}/settle", opened.session_id);
    let res = actix_test::call_service(
        &app,
        post_json(&settle_uri, json!({ "paymentMethod": "cash" }), &cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let receipt: SettlementReceipt = actix_test::read_body_json(res).await;
    assert_eq!(receipt.fee, 120);
    assert_eq!(receipt.duration_hours, 2);
    assert_eq!(receipt.slot_id, "4W-01");
    assert_eq!(
        receipt.message,
        "Vehicle exited after 2 hour(s). Payment of ₹120 received via cash."
    );

    let res = actix_test::call_service(&app, get_with_cookie("/api/v1/vehicles", &cookie)).await;
    let active: Vec<ParkingSessionPayload> = actix_test::read_body_json(res).await;
    assert!(active.is_empty());
}

#[rstest]
#[case(entry_body("KA01", "2W", "2W-09"), StatusCode::NOT_FOUND, "not_found")]
#[case(entry_body("KA01", "2W", "slot-one"), StatusCode::NOT_FOUND, "not_found")]
#[case(entry_body("KA01", "2W", "4W-01"), StatusCode::CONFLICT, "conflict")]
#[case(entry_body("", "2W", "2W-01"), StatusCode::BAD_REQUEST, "invalid_request")]
#[actix_web::test]
async fn entry_failures_map_to_status(
    #[case] body: Value,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let (state, _clock) = memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let cookie = operator_cookie(&app).await;

    let res = actix_test::call_service(&app, post_json("/api/v1/vehicles", body, &cookie)).await;
    assert_eq!(res.status(), status);
    let payload: Value = actix_test::read_body_json(res).await;
    assert_eq!(payload["code"], code);
}

#[rstest]
#[actix_web::test]
async fn second_entry_for_a_parked_plate_conflicts() {
    let (state, _clock) = memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let cookie = operator_cookie(&app).await;

    let first = actix_test::call_service(
        &app,
        post_json("/api/v1/vehicles", entry_body("KA01", "2W", "2W-01"), &cookie),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = actix_test::call_service(
        &app,
        post_json("/api/v1/vehicles", entry_body("KA01", "2W", "2W-02"), &cookie),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let payload: Value = actix_test::read_body_json(second).await;
    assert_eq!(payload["details"]["slotId"], "2W-01");
}

#[rstest]
#[actix_web::test]
async fn settling_twice_reports_not_found() {
    let (state, clock) = memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let cookie = operator_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        post_json("/api/v1/vehicles", entry_body("KA01", "2W", "2W-01"), &cookie),
    )
    .await;
    let opened: ParkingSessionPayload = actix_test::read_body_json(res).await;
    clock.advance(Duration::from_secs(10 * 60));

    let uri = format!("/api/v1/vehicles/{}/settle", opened.session_id);
    let body = json!({ "paymentMethod": "qr_code", "paymentStatus": "completed" });
    let first = actix_test::call_service(&app, post_json(&uri, body.clone(), &cookie)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let second = actix_test::call_service(&app, post_json(&uri, body, &cookie)).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn quote_for_unknown_session_is_not_found() {
    let (state, _clock) = memory_state().await;
    let app = actix_test::init_service(test_app(state)).await;
    let cookie = operator_cookie(&app).await;

    let res = actix_test::call_service(
        &app,
        get_with_cookie("/api/v1/vehicles/NOPE-20240301090000/quote", &cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
