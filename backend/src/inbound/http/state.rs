//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CredentialVerifier, ParkingCommand, ParkingQuery};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use lotkeeper::domain::AllocationService;
/// use lotkeeper::inbound::http::state::HttpState;
/// use lotkeeper::outbound::credentials::ConfiguredCredentialVerifier;
/// use lotkeeper::outbound::memory::InMemoryParkingStore;
///
/// let store = InMemoryParkingStore::new();
/// let service = Arc::new(AllocationService::new(
///     Arc::new(store.slot_registry()),
///     Arc::new(store.session_ledger()),
///     Arc::new(mockable::DefaultClock),
/// ));
/// let credentials = ConfiguredCredentialVerifier::new(None, None);
/// let state = HttpState::new(Arc::new(credentials), service.clone(), service);
/// let _parking = state.parking.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub credentials: Arc<dyn CredentialVerifier>,
    pub parking: Arc<dyn ParkingCommand>,
    pub parking_query: Arc<dyn ParkingQuery>,
}

impl HttpState {
    pub fn new(
        credentials: Arc<dyn CredentialVerifier>,
        parking: Arc<dyn ParkingCommand>,
        parking_query: Arc<dyn ParkingQuery>,
    ) -> Self {
        Self {
            credentials,
            parking,
            parking_query,
        }
    }
}
