//! Storage selection at startup.
//!
//! PostgreSQL is used when a database URL is configured and the pool,
//! migrations and slot catalogue all come up. Any failure there is logged once
//! and the in-memory store takes over.

use std::fmt;
use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{ParkingCommand, ParkingQuery, SessionLedger, SlotRegistry};
use crate::domain::{AllocationService, FeeSchedule, ParkingError, SlotCounts};
use crate::outbound::memory::InMemoryParkingStore;
use crate::outbound::persistence::{
    DbPool, DieselSessionLedger, DieselSlotRegistry, PoolConfig, run_migrations,
};

/// Inputs for [`connect_storage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    pub database_url: Option<String>,
    pub slot_counts: SlotCounts,
    pub fees: FeeSchedule,
}

/// Which store backs the running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        })
    }
}

/// Driving ports wired to the selected store.
#[derive(Clone)]
pub struct ParkingPorts {
    pub command: Arc<dyn ParkingCommand>,
    pub query: Arc<dyn ParkingQuery>,
    pub backend: StorageBackend,
}

async fn wire<S, L>(
    slots: S,
    ledger: L,
    clock: Arc<dyn Clock>,
    options: &StorageOptions,
    backend: StorageBackend,
) -> Result<ParkingPorts, ParkingError>
where
    S: SlotRegistry + 'static,
    L: SessionLedger + 'static,
{
    let service = Arc::new(
        AllocationService::new(Arc::new(slots), Arc::new(ledger), clock)
            .with_fee_schedule(options.fees),
    );
    service
        .initialize_parking_lot(
            options.slot_counts.two_wheeler,
            options.slot_counts.four_wheeler,
        )
        .await?;
    Ok(ParkingPorts {
        command: service.clone(),
        query: service,
        backend,
    })
}

async fn connect_postgres(
    database_url: &str,
    clock: Arc<dyn Clock>,
    options: &StorageOptions,
) -> Result<ParkingPorts, String> {
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| err.to_string())?;
    run_migrations(database_url)
        .await
        .map_err(|err| err.to_string())?;
    wire(
        DieselSlotRegistry::new(pool.clone()),
        DieselSessionLedger::new(pool),
        clock,
        options,
        StorageBackend::Postgres,
    )
    .await
    .map_err(|err| err.to_string())
}

/// Build the allocation service over PostgreSQL or the in-memory store.
///
/// # Errors
///
/// Returns [`ParkingError`] only when the in-memory fallback itself cannot
/// be initialised.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use lotkeeper::domain::{FeeSchedule, SlotCounts};
/// use lotkeeper::startup::{StorageBackend, StorageOptions, connect_storage};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let options = StorageOptions {
///     database_url: None,
///     slot_counts: SlotCounts::REFERENCE,
///     fees: FeeSchedule::REFERENCE,
/// };
/// let ports = connect_storage(&options, Arc::new(mockable::DefaultClock)).await.unwrap();
/// assert_eq!(ports.backend, StorageBackend::Memory);
/// # });
/// ```
pub async fn connect_storage(
    options: &StorageOptions,
    clock: Arc<dyn Clock>,
) -> Result<ParkingPorts, ParkingError> {
    match options.database_url.as_deref() {
        Some(url) => match connect_postgres(url, clock.clone(), options).await {
            Ok(ports) => {
                info!(backend = %ports.backend, "parking storage ready");
                return Ok(ports);
            }
            Err(reason) => {
                warn!(%reason, "PostgreSQL unavailable; falling back to in-memory storage");
            }
        },
        None => info!("no database configured; using in-memory storage"),
    }

    let store = InMemoryParkingStore::new();
    wire(
        store.slot_registry(),
        store.session_ledger(),
        clock,
        options,
        StorageBackend::Memory,
    )
    .await
}
