//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the slot registry and session ledger ports,
//! backed by PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: implementations translate between Diesel rows and
//!   domain types. Parking rules live in the allocation service.
//! - **Storage-level guards**: occupancy and closure are conditional
//!   updates, and the `parking_sessions_active_plate_key` partial index
//!   admits one active session per plate.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```no_run
//! use lotkeeper::outbound::persistence::{
//!     DbPool, DieselSessionLedger, DieselSlotRegistry, PoolConfig, run_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://lot@localhost/lot";
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let _slots = DieselSlotRegistry::new(pool.clone());
//! let _ledger = DieselSessionLedger::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_session_ledger;
mod diesel_slot_registry;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_session_ledger::DieselSessionLedger;
pub use diesel_slot_registry::DieselSlotRegistry;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
