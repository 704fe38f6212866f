//! In-memory session ledger adapter.

use std::cmp::Reverse;

use async_trait::async_trait;

use crate::domain::ports::{SessionLedger, SessionLedgerError};
use crate::domain::{ParkingSession, PlateNumber, SessionClosure, SessionCloseError, SessionId};

use super::{InMemoryParkingStore, Poisoned};

fn map_poisoned(error: Poisoned) -> SessionLedgerError {
    SessionLedgerError::connection(error.to_string())
}

/// [`SessionLedger`] over an [`InMemoryParkingStore`].
#[derive(Debug, Clone)]
pub struct InMemorySessionLedger {
    store: InMemoryParkingStore,
}

impl InMemorySessionLedger {
    pub fn new(store: InMemoryParkingStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionLedger for InMemorySessionLedger {
    async fn find_active_by_plate(
        &self,
        plate: &PlateNumber,
    ) -> Result<Option<ParkingSession>, SessionLedgerError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        Ok(tables
            .active_by_plate
            .get(plate)
            .and_then(|id| tables.sessions.get(id))
            .cloned())
    }

    async fn find_active_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ParkingSession>, SessionLedgerError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        Ok(tables
            .sessions
            .get(session_id)
            .filter(|session| session.is_active())
            .cloned())
    }

    async fn find_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ParkingSession>, SessionLedgerError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        Ok(tables.sessions.get(session_id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<ParkingSession>, SessionLedgerError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        let mut active: Vec<ParkingSession> = tables
            .active_by_plate
            .values()
            .filter_map(|id| tables.sessions.get(id))
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.entry_time()
                .cmp(&b.entry_time())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(active)
    }

    async fn create(&self, session: &ParkingSession) -> Result<(), SessionLedgerError> {
        let mut tables = self.store.write().map_err(map_poisoned)?;
        if tables.active_by_plate.contains_key(session.plate()) {
            return Err(SessionLedgerError::duplicate_active_session(
                session.plate().to_string(),
            ));
        }
        if tables.sessions.contains_key(session.id()) {
            return Err(SessionLedgerError::query(format!(
                "session {} already exists",
                session.id()
            )));
        }
        tables
            .active_by_plate
            .insert(session.plate().clone(), session.id().clone());
        tables
            .sessions
            .insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn close_session(
        &self,
        session_id: &SessionId,
        closure: &SessionClosure,
    ) -> Result<ParkingSession, SessionLedgerError> {
        let mut tables = self.store.write().map_err(map_poisoned)?;
        let session = tables
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionLedgerError::session_not_found(session_id.clone()))?;
        session.close(closure.clone()).map_err(|err| match err {
            SessionCloseError::AlreadyClosed => {
                SessionLedgerError::session_not_found(session_id.clone())
            }
            SessionCloseError::Invalid(invalid) => SessionLedgerError::query(invalid.to_string()),
        })?;
        let closed = session.clone();
        tables.active_by_plate.remove(closed.plate());
        Ok(closed)
    }

    async fn reopen_session(&self, session_id: &SessionId) -> Result<(), SessionLedgerError> {
        let mut tables = self.store.write().map_err(map_poisoned)?;
        let plate = tables
            .sessions
            .get(session_id)
            .map(|session| session.plate().clone())
            .ok_or_else(|| SessionLedgerError::session_not_found(session_id.clone()))?;
        match tables.active_by_plate.get(&plate) {
            Some(active) if active == session_id => return Ok(()),
            Some(_) => {
                return Err(SessionLedgerError::duplicate_active_session(
                    plate.to_string(),
                ));
            }
            None => {}
        }
        if let Some(session) = tables.sessions.get_mut(session_id) {
            session.reopen();
        }
        tables.active_by_plate.insert(plate, session_id.clone());
        Ok(())
    }

    async fn list_history(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ParkingSession>, SessionLedgerError> {
        let tables = self.store.read().map_err(map_poisoned)?;
        let mut closed: Vec<&ParkingSession> = tables
            .sessions
            .values()
            .filter(|session| !session.is_active())
            .collect();
        closed.sort_by_key(|session| (Reverse(session.exit_time()), session.id().clone()));
        Ok(closed
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
