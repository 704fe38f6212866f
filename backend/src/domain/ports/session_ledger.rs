//! Port for active and historical parking sessions.

use async_trait::async_trait;

use crate::domain::{ParkingSession, PlateNumber, SessionClosure, SessionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session ledger adapters.
    pub enum SessionLedgerError {
        /// Ledger connection could not be established.
        Connection { message: String } =>
            "session ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "session ledger query failed: {message}",
        /// The plate already has an active session.
        DuplicateActiveSession { plate: String } =>
            "plate {plate} already has an active session",
        /// No active session carries the id.
        SessionNotFound { session_id: SessionId } =>
            "no active session {session_id}",
    }
}

/// Port for writing and reading parking sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionLedger: Send + Sync {
    async fn find_active_by_plate(
        &self,
        plate: &PlateNumber,
    ) -> Result<Option<ParkingSession>, SessionLedgerError>;

    async fn find_active_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ParkingSession>, SessionLedgerError>;

    /// Find a session by id whether or not it is still active.
    async fn find_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ParkingSession>, SessionLedgerError>;

    /// Active sessions ordered by entry time, oldest first.
    async fn list_active(&self) -> Result<Vec<ParkingSession>, SessionLedgerError>;

    /// Persist a new active session.
    ///
    /// Fails with [`SessionLedgerError::DuplicateActiveSession`] when the
    /// plate already has one.
    async fn create(&self, session: &ParkingSession) -> Result<(), SessionLedgerError>;

    /// Record the exit of an active session.
    ///
    /// Only an active session may be closed; a second close fails with
    /// [`SessionLedgerError::SessionNotFound`].
    async fn close_session(
        &self,
        session_id: &SessionId,
        closure: &SessionClosure,
    ) -> Result<ParkingSession, SessionLedgerError>;

    /// Undo a closure recorded by [`SessionLedger::close_session`].
    async fn reopen_session(&self, session_id: &SessionId) -> Result<(), SessionLedgerError>;

    /// Closed sessions, most recent exit first.
    async fn list_history(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ParkingSession>, SessionLedgerError>;
}
