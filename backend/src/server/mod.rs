//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use lotkeeper::Trace;
#[cfg(debug_assertions)]
use lotkeeper::doc::ApiDoc;
use lotkeeper::domain::ports::CredentialVerifier;
use lotkeeper::inbound::http::health::{HealthState, live, ready};
use lotkeeper::inbound::http::history::list_history;
use lotkeeper::inbound::http::operator::{login, logout};
use lotkeeper::inbound::http::slots::{list_available_slots, list_slots, slot_summary};
use lotkeeper::inbound::http::state::HttpState;
use lotkeeper::inbound::http::vehicles::{
    enter_vehicle, list_active_vehicles, quote_exit, settle_exit,
};
use lotkeeper::startup::ParkingPorts;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Operator sessions expire after a shift-length idle window.
const SESSION_TTL_HOURS: i64 = 8;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

/// Combine the selected storage ports with the credential verifier.
pub fn build_http_state(
    ports: &ParkingPorts,
    credentials: Arc<dyn CredentialVerifier>,
) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        credentials,
        ports.command.clone(),
        ports.query.clone(),
    ))
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(list_available_slots)
        .service(slot_summary)
        .service(list_slots)
        .service(enter_vehicle)
        .service(list_active_vehicles)
        .service(quote_exit)
        .service(settle_exit)
        .service(list_history);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server and mark the health state ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use lotkeeper::domain::ports::FixtureCredentialVerifier;
    use lotkeeper::domain::{FeeSchedule, SlotCounts};
    use lotkeeper::startup::{StorageOptions, connect_storage};
    use mockable::DefaultClock;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn deps() -> AppDependencies {
        let options = StorageOptions {
            database_url: None,
            slot_counts: SlotCounts {
                two_wheeler: 1,
                four_wheeler: 1,
            },
            fees: FeeSchedule::default(),
        };
        let ports = connect_storage(&options, Arc::new(DefaultClock))
            .await
            .expect("memory storage");
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: build_http_state(&ports, Arc::new(FixtureCredentialVerifier)),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn login_then_summary_through_full_stack() {
        let app = test::init_service(build_app(deps().await)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": "operator", "password": "password" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("trace-id"));
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/slots/summary")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["classes"][0]["total"], 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn health_probes_are_outside_the_session_scope() {
        let deps = deps().await;
        deps.health_state.mark_ready();
        let app = test::init_service(build_app(deps)).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
