//! Slot allocation and billing service.
//!
//! Implements the parking driving ports over a slot registry and a session
//! ledger. Mutations on one plate or slot are serialised through keyed locks;
//! the two stores are kept consistent by compensating the first write when
//! the second one fails.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::keyed_locks::{KeyedLocks, plate_key, slot_key};
use crate::domain::ports::{
    EnterVehicleRequest, HistoryPage, OccupancySummary, ParkingCommand, ParkingQuery,
    SessionLedger, SessionLedgerError, SettleExitRequest, SettlementReceipt, SlotRegistry,
    SlotRegistryError,
};
use crate::domain::{
    FeeError, FeeQuote, FeeSchedule, MobileNumber, OwnerName, ParkingError, ParkingSession,
    ParkingSessionDraft, PaymentMethod, PlateNumber, SessionClosure, SessionId, Slot, SlotCounts,
    SlotId, VehicleClass, compute_fee,
};

/// Upper bound on `-<n>` suffixes tried when deriving a session id.
const MAX_SESSION_ID_ATTEMPTS: u32 = 16;

fn map_slot_error(error: SlotRegistryError) -> ParkingError {
    match error {
        SlotRegistryError::Connection { message } => {
            ParkingError::storage(format!("slot registry unavailable: {message}"))
        }
        SlotRegistryError::Query { message } => {
            ParkingError::storage(format!("slot registry error: {message}"))
        }
        SlotRegistryError::SlotNotFound { slot_id } => {
            ParkingError::slot_not_found(slot_id.to_string())
        }
        SlotRegistryError::SlotAlreadyOccupied { slot_id, occupant } => {
            ParkingError::slot_occupied(slot_id, occupant)
        }
    }
}

fn map_ledger_error(error: SessionLedgerError) -> ParkingError {
    match error {
        SessionLedgerError::Connection { message } => {
            ParkingError::storage(format!("session ledger unavailable: {message}"))
        }
        SessionLedgerError::Query { message } => {
            ParkingError::storage(format!("session ledger error: {message}"))
        }
        SessionLedgerError::DuplicateActiveSession { plate } => {
            ParkingError::duplicate_active_session(plate)
        }
        SessionLedgerError::SessionNotFound { session_id } => {
            ParkingError::session_not_found(session_id.to_string())
        }
    }
}

fn map_fee_error(error: FeeError) -> ParkingError {
    match error {
        FeeError::NegativeDuration { entry, exit } | FeeError::Overflow { entry, exit } => {
            ParkingError::invalid_time_range(entry, exit)
        }
    }
}

fn invalid(error: impl std::fmt::Display) -> ParkingError {
    ParkingError::invalid_request(error.to_string())
}

fn log_failure(operation: &'static str, error: &ParkingError) {
    if error.is_storage() {
        error!(operation, %error, "parking operation failed");
    } else {
        warn!(operation, %error, "parking operation rejected");
    }
}

/// Receipt wording shown to the operator after a settle.
fn receipt_message(quote: FeeQuote, payment_method: PaymentMethod) -> String {
    format!(
        "Vehicle exited after {} hour(s). Payment of ₹{} received via {}.",
        quote.duration_hours,
        quote.fee,
        payment_method.receipt_label()
    )
}

/// Validated values of an entry request.
struct EntryValues {
    owner_name: OwnerName,
    owner_mobile: MobileNumber,
    plate: PlateNumber,
    vehicle_class: VehicleClass,
    slot_id: SlotId,
}

impl TryFrom<EnterVehicleRequest> for EntryValues {
    type Error = ParkingError;

    fn try_from(request: EnterVehicleRequest) -> Result<Self, Self::Error> {
        let slot_id = request.slot_id.trim();
        let slot_id = slot_id
            .parse::<SlotId>()
            .map_err(|_| ParkingError::slot_not_found(slot_id))?;
        Ok(Self {
            owner_name: OwnerName::new(&request.owner_name).map_err(invalid)?,
            owner_mobile: MobileNumber::new(&request.owner_mobile).map_err(invalid)?,
            plate: PlateNumber::new(&request.plate_number).map_err(invalid)?,
            vehicle_class: request.vehicle_class,
            slot_id,
        })
    }
}

/// Allocation service implementing [`ParkingCommand`] and [`ParkingQuery`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use lotkeeper::domain::AllocationService;
/// use lotkeeper::outbound::memory::InMemoryParkingStore;
///
/// let store = InMemoryParkingStore::default();
/// let service = AllocationService::new(
///     Arc::new(store.slot_registry()),
///     Arc::new(store.session_ledger()),
///     Arc::new(mockable::DefaultClock),
/// );
/// # let _ = service;
/// ```
#[derive(Clone)]
pub struct AllocationService<S, L> {
    slots: Arc<S>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
    fees: FeeSchedule,
    locks: KeyedLocks,
}

impl<S, L> AllocationService<S, L> {
    /// Create a service charging the reference rates.
    pub fn new(slots: Arc<S>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots,
            ledger,
            clock,
            fees: FeeSchedule::default(),
            locks: KeyedLocks::new(),
        }
    }

    /// Replace the hourly rates.
    pub fn with_fee_schedule(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    fn quote_at(
        &self,
        session: &ParkingSession,
        exit: DateTime<Utc>,
    ) -> Result<FeeQuote, ParkingError> {
        compute_fee(
            &self.fees,
            session.vehicle_class(),
            session.entry_time(),
            exit,
        )
        .map_err(map_fee_error)
    }
}

impl<S, L> AllocationService<S, L>
where
    S: SlotRegistry,
    L: SessionLedger,
{
    async fn find_active(&self, session_id: &SessionId) -> Result<ParkingSession, ParkingError> {
        self.ledger
            .find_active_by_id(session_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| ParkingError::session_not_found(session_id.to_string()))
    }

    /// Derive an unused session id. The caller must hold the plate lock.
    async fn next_session_id(
        &self,
        plate: &PlateNumber,
        entry_time: DateTime<Utc>,
    ) -> Result<SessionId, ParkingError> {
        for attempt in 0..MAX_SESSION_ID_ATTEMPTS {
            let candidate = SessionId::derive(plate, entry_time, attempt);
            let existing = self
                .ledger
                .find_by_id(&candidate)
                .await
                .map_err(map_ledger_error)?;
            if existing.is_none() {
                return Ok(candidate);
            }
        }
        Err(ParkingError::storage(format!(
            "no unused session id for plate {plate} at {entry_time}"
        )))
    }

    async fn enter(&self, request: EnterVehicleRequest) -> Result<ParkingSession, ParkingError> {
        let values = EntryValues::try_from(request)?;
        let _guard = self
            .locks
            .acquire([plate_key(&values.plate), slot_key(values.slot_id)])
            .await;

        let active = self
            .ledger
            .find_active_by_plate(&values.plate)
            .await
            .map_err(map_ledger_error)?;
        if let Some(active) = active {
            return Err(ParkingError::vehicle_already_parked(
                values.plate.to_string(),
                active.slot_id(),
            ));
        }

        let slot = self
            .slots
            .find(values.slot_id)
            .await
            .map_err(map_slot_error)?
            .ok_or_else(|| ParkingError::slot_not_found(values.slot_id.to_string()))?;
        if let Some(occupant) = slot.session_id() {
            return Err(ParkingError::slot_occupied(slot.id(), occupant.clone()));
        }
        if slot.vehicle_class() != values.vehicle_class {
            return Err(ParkingError::vehicle_class_mismatch(
                slot.id(),
                slot.vehicle_class(),
                values.vehicle_class,
            ));
        }

        let entry_time = self.clock.utc();
        let id = self.next_session_id(&values.plate, entry_time).await?;
        let session = ParkingSession::open(ParkingSessionDraft {
            id,
            owner_name: values.owner_name,
            owner_mobile: values.owner_mobile,
            plate: values.plate,
            vehicle_class: values.vehicle_class,
            slot_id: values.slot_id,
            entry_time,
        })
        .map_err(invalid)?;

        self.slots
            .occupy(session.slot_id(), session.id())
            .await
            .map_err(map_slot_error)?;
        if let Err(create_error) = self.ledger.create(&session).await {
            if let Err(release_error) = self.slots.release(session.slot_id()).await {
                error!(
                    slot_id = %session.slot_id(),
                    session_id = %session.id(),
                    error = %release_error,
                    "failed to release slot after session create failed"
                );
            }
            return Err(map_ledger_error(create_error));
        }

        info!(
            session_id = %session.id(),
            slot_id = %session.slot_id(),
            plate = %session.plate(),
            "vehicle entered"
        );
        Ok(session)
    }

    async fn settle(&self, request: SettleExitRequest) -> Result<SettlementReceipt, ParkingError> {
        let session_id = SessionId::parse(&request.session_id)
            .map_err(|_| ParkingError::session_not_found(request.session_id.trim()))?;

        // Plate and slot never change for a session, so an unlocked read is
        // enough to choose the lock keys.
        let located = self.find_active(&session_id).await?;
        let _guard = self
            .locks
            .acquire([plate_key(located.plate()), slot_key(located.slot_id())])
            .await;
        let session = self.find_active(&session_id).await?;

        let exit_time = self.clock.utc();
        let quote = self.quote_at(&session, exit_time)?;
        let closure = SessionClosure {
            exit_time,
            fee: quote.fee,
            duration_hours: quote.duration_hours,
            payment_method: request.payment_method,
            payment_status: request.payment_status,
        };
        self.ledger
            .close_session(&session_id, &closure)
            .await
            .map_err(map_ledger_error)?;

        if let Err(release_error) = self.slots.release(session.slot_id()).await {
            if let Err(reopen_error) = self.ledger.reopen_session(&session_id).await {
                error!(
                    session_id = %session_id,
                    error = %reopen_error,
                    "failed to reopen session after slot release failed"
                );
            }
            return Err(map_slot_error(release_error));
        }

        info!(
            session_id = %session_id,
            slot_id = %session.slot_id(),
            fee = quote.fee,
            duration_hours = quote.duration_hours,
            "vehicle exited"
        );
        Ok(SettlementReceipt {
            session_id: session_id.to_string(),
            slot_id: session.slot_id().to_string(),
            exit_time,
            fee: quote.fee,
            duration_hours: quote.duration_hours,
            message: receipt_message(quote, request.payment_method),
        })
    }

    async fn quote(&self, session_id: &str) -> Result<FeeQuote, ParkingError> {
        let session_id = SessionId::parse(session_id)
            .map_err(|_| ParkingError::session_not_found(session_id.trim()))?;
        let session = self.find_active(&session_id).await?;
        self.quote_at(&session, self.clock.utc())
    }
}

#[async_trait]
impl<S, L> ParkingCommand for AllocationService<S, L>
where
    S: SlotRegistry,
    L: SessionLedger,
{
    async fn initialize_parking_lot(
        &self,
        two_wheeler_count: u32,
        four_wheeler_count: u32,
    ) -> Result<bool, ParkingError> {
        let counts = SlotCounts {
            two_wheeler: two_wheeler_count,
            four_wheeler: four_wheeler_count,
        };
        let created = self
            .slots
            .initialize(&counts)
            .await
            .map_err(map_slot_error)
            .inspect_err(|err| log_failure("initialize_parking_lot", err))?;
        if created {
            info!(two_wheeler_count, four_wheeler_count, "created slot catalogue");
        }
        Ok(created)
    }

    async fn enter_vehicle(
        &self,
        request: EnterVehicleRequest,
    ) -> Result<ParkingSession, ParkingError> {
        self.enter(request)
            .await
            .inspect_err(|err| log_failure("enter_vehicle", err))
    }

    async fn settle_exit(
        &self,
        request: SettleExitRequest,
    ) -> Result<SettlementReceipt, ParkingError> {
        self.settle(request)
            .await
            .inspect_err(|err| log_failure("settle_exit", err))
    }
}

#[async_trait]
impl<S, L> ParkingQuery for AllocationService<S, L>
where
    S: SlotRegistry,
    L: SessionLedger,
{
    async fn list_available_slots(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<SlotId>, ParkingError> {
        self.slots
            .list_available(vehicle_class)
            .await
            .map_err(map_slot_error)
            .inspect_err(|err| log_failure("list_available_slots", err))
    }

    async fn list_all_slots(&self) -> Result<Vec<Slot>, ParkingError> {
        self.slots
            .list_all()
            .await
            .map_err(map_slot_error)
            .inspect_err(|err| log_failure("list_all_slots", err))
    }

    async fn list_active_vehicles(&self) -> Result<Vec<ParkingSession>, ParkingError> {
        self.ledger
            .list_active()
            .await
            .map_err(map_ledger_error)
            .inspect_err(|err| log_failure("list_active_vehicles", err))
    }

    async fn quote_exit(&self, session_id: &str) -> Result<FeeQuote, ParkingError> {
        self.quote(session_id)
            .await
            .inspect_err(|err| log_failure("quote_exit", err))
    }

    async fn list_history(&self, page: HistoryPage) -> Result<Vec<ParkingSession>, ParkingError> {
        self.ledger
            .list_history(page.limit, page.offset)
            .await
            .map_err(map_ledger_error)
            .inspect_err(|err| log_failure("list_history", err))
    }

    async fn occupancy_summary(&self) -> Result<OccupancySummary, ParkingError> {
        let slots = self.list_all_slots().await?;
        Ok(OccupancySummary::from_slots(&slots))
    }
}

#[cfg(test)]
#[path = "allocation_service_tests.rs"]
mod tests;
