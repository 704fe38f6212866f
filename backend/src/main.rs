//! Lotkeeper entry-point: loads configuration, selects storage and serves
//! the operator API.

mod server;

use std::path::Path;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lotkeeper::inbound::http::health::HealthState;
use lotkeeper::outbound::credentials::ConfiguredCredentialVerifier;
use lotkeeper::startup::{AppSettings, connect_storage};
use server::{ServerConfig, build_http_state, create_server};

/// Minimum key material accepted by `Key::derive_from`.
const MIN_KEY_BYTES: usize = 64;

fn load_session_key(path: &Path, allow_ephemeral: bool) -> std::io::Result<Key> {
    let failure = match std::fs::read(path) {
        Ok(bytes) if bytes.len() >= MIN_KEY_BYTES => return Ok(Key::derive_from(&bytes)),
        Ok(bytes) => format!("key has {} bytes, need at least {MIN_KEY_BYTES}", bytes.len()),
        Err(e) => e.to_string(),
    };

    if cfg!(debug_assertions) || allow_ephemeral {
        warn!(path = %path.display(), error = %failure, "using temporary session key (dev only)");
        Ok(Key::generate())
    } else {
        Err(std::io::Error::other(format!(
            "failed to read session key at {}: {failure}",
            path.display()
        )))
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;

    let key = load_session_key(&settings.session_key_file(), settings.allow_ephemeral_key())?;

    let ports = connect_storage(&settings.storage_options(), Arc::new(DefaultClock))
        .await
        .map_err(|e| std::io::Error::other(format!("failed to initialise parking lot: {e}")))?;

    let (username, hash_file) = settings.operator();
    let credentials =
        ConfiguredCredentialVerifier::from_hash_file(username, hash_file).map_err(|e| {
            std::io::Error::other(format!("failed to read operator password hash: {e}"))
        })?;
    let http_state = build_http_state(&ports, Arc::new(credentials));

    let config = ServerConfig::new(
        key,
        settings.cookie_secure(),
        SameSite::Lax,
        settings.bind_addr(),
    );
    info!(
        bind_addr = %config.bind_addr(),
        backend = %ports.backend,
        "starting lotkeeper"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, config)?;
    server.await
}
