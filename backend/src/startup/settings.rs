//! Server configuration loaded via OrthoConfig.
//!
//! Every value may come from `LOTKEEPER_*` environment variables, a config
//! file or the command line. Unset values fall back to the reference lot.
//!
//! Boolean switches default to `false`, so the session cookie stays `Secure`
//! unless `cookie_insecure` is set.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{FeeSchedule, SlotCounts};

use super::storage::StorageOptions;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Configuration values for the parking server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOTKEEPER")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub two_wheeler_slots: Option<u32>,
    pub four_wheeler_slots: Option<u32>,
    /// Hourly rate for two-wheelers, in whole rupees.
    pub two_wheeler_rate: Option<u64>,
    /// Hourly rate for four-wheelers, in whole rupees.
    pub four_wheeler_rate: Option<u64>,
    pub operator_username: Option<String>,
    /// File holding the Argon2 PHC string for the operator password.
    pub operator_password_hash_file: Option<PathBuf>,
    /// File holding at least 64 bytes of session key material.
    pub session_key_file: Option<PathBuf>,
    /// Drop the `Secure` attribute from the session cookie (plain-HTTP dev only).
    #[ortho_config(default = false)]
    pub cookie_insecure: bool,
    /// Permit a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_key: bool,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND_ADDR))
    }

    /// Slot counts, defaulting each class independently.
    pub fn slot_counts(&self) -> SlotCounts {
        SlotCounts {
            two_wheeler: self
                .two_wheeler_slots
                .unwrap_or(SlotCounts::REFERENCE.two_wheeler),
            four_wheeler: self
                .four_wheeler_slots
                .unwrap_or(SlotCounts::REFERENCE.four_wheeler),
        }
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule {
            two_wheeler_rate: self
                .two_wheeler_rate
                .unwrap_or(FeeSchedule::REFERENCE.two_wheeler_rate),
            four_wheeler_rate: self
                .four_wheeler_rate
                .unwrap_or(FeeSchedule::REFERENCE.four_wheeler_rate),
        }
    }

    /// Configured operator username and password hash file.
    pub fn operator(&self) -> (Option<&str>, Option<&Path>) {
        (
            self.operator_username.as_deref(),
            self.operator_password_hash_file.as_deref(),
        )
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn cookie_secure(&self) -> bool {
        !self.cookie_insecure
    }

    pub fn allow_ephemeral_key(&self) -> bool {
        self.allow_ephemeral_key
    }

    /// Storage inputs derived from these settings.
    pub fn storage_options(&self) -> StorageOptions {
        StorageOptions {
            database_url: self
                .database_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned),
            slot_counts: self.slot_counts(),
            fees: self.fee_schedule(),
        }
    }
}
