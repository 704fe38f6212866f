//! PostgreSQL-backed `SessionLedger` implementation using Diesel ORM.
//!
//! Active and closed sessions share `parking_sessions`; a session is active
//! while `exit_time` is null. Closing and reopening are conditional on that
//! column, and the partial unique index on active plates backs
//! `DuplicateActiveSession`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SessionLedger, SessionLedgerError};
use crate::domain::{
    MobileNumber, OwnerName, ParkingSession, ParkingSessionDraft, PlateNumber, SessionClosure,
    SessionId,
};

use super::diesel_basic_error_mapping::{
    ACTIVE_PLATE_INDEX, is_unique_violation_on, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewSessionRow, SessionClosureUpdate, SessionRow};
use super::pool::{DbPool, PoolError};
use super::schema::parking_sessions;

/// Diesel-backed implementation of the session ledger port.
#[derive(Clone)]
pub struct DieselSessionLedger {
    pool: DbPool,
}

impl DieselSessionLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SessionLedgerError {
    map_basic_pool_error(error, SessionLedgerError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SessionLedgerError {
    map_basic_diesel_error(
        error,
        SessionLedgerError::query,
        SessionLedgerError::connection,
    )
}

/// Map writes that may trip the one-active-session-per-plate index.
fn map_write_error(error: diesel::result::Error, plate: &PlateNumber) -> SessionLedgerError {
    if is_unique_violation_on(&error, ACTIVE_PLATE_INDEX) {
        return SessionLedgerError::duplicate_active_session(plate.to_string());
    }
    map_diesel_error(error)
}

fn corrupt(field: &str, detail: impl std::fmt::Display) -> SessionLedgerError {
    SessionLedgerError::query(format!("stored session {field}: {detail}"))
}

fn row_to_session(row: SessionRow) -> Result<ParkingSession, SessionLedgerError> {
    let draft = ParkingSessionDraft {
        id: SessionId::parse(&row.session_id).map_err(|err| corrupt("id", err))?,
        owner_name: OwnerName::new(&row.owner_name).map_err(|err| corrupt("owner", err))?,
        owner_mobile: MobileNumber::new(&row.owner_mobile)
            .map_err(|err| corrupt("mobile", err))?,
        plate: PlateNumber::new(&row.plate_number).map_err(|err| corrupt("plate", err))?,
        vehicle_class: row
            .vehicle_class
            .parse()
            .map_err(|err| corrupt("class", err))?,
        slot_id: row.slot_id.parse().map_err(|err| corrupt("slot", err))?,
        entry_time: row.entry_time,
    };
    let closure = row_to_closure(&row)?;
    ParkingSession::restore(draft, closure).map_err(|err| corrupt("state", err))
}

fn row_to_closure(row: &SessionRow) -> Result<Option<SessionClosure>, SessionLedgerError> {
    let Some(exit_time) = row.exit_time else {
        return Ok(None);
    };
    let missing = |field| corrupt(field, "missing on a closed session");
    let duration_hours = row.duration_hours.ok_or_else(|| missing("duration"))?;
    let payment_method = row
        .payment_method
        .as_deref()
        .ok_or_else(|| missing("payment method"))?;
    let payment_status = row
        .payment_status
        .as_deref()
        .ok_or_else(|| missing("payment status"))?;
    Ok(Some(SessionClosure {
        exit_time,
        fee: u64::try_from(row.fee).map_err(|err| corrupt("fee", err))?,
        duration_hours: u32::try_from(duration_hours).map_err(|err| corrupt("duration", err))?,
        payment_method: payment_method
            .parse()
            .map_err(|err| corrupt("payment method", err))?,
        payment_status: payment_status
            .parse()
            .map_err(|err| corrupt("payment status", err))?,
    }))
}

fn closure_update(closure: &SessionClosure) -> Result<SessionClosureUpdate, SessionLedgerError> {
    Ok(SessionClosureUpdate {
        exit_time: Some(closure.exit_time),
        fee: i64::try_from(closure.fee)
            .map_err(|_| SessionLedgerError::query("fee exceeds storage range"))?,
        duration_hours: Some(
            i32::try_from(closure.duration_hours)
                .map_err(|_| SessionLedgerError::query("duration exceeds storage range"))?,
        ),
        payment_method: Some(closure.payment_method.code()),
        payment_status: Some(closure.payment_status.code()),
    })
}

fn cleared_closure() -> SessionClosureUpdate {
    SessionClosureUpdate {
        exit_time: None,
        fee: 0,
        duration_hours: None,
        payment_method: None,
        payment_status: None,
    }
}

fn to_i64(value: usize, what: &str) -> Result<i64, SessionLedgerError> {
    i64::try_from(value).map_err(|_| SessionLedgerError::query(format!("{what} out of range")))
}

#[async_trait]
impl SessionLedger for DieselSessionLedger {
    async fn find_active_by_plate(
        &self,
        plate: &PlateNumber,
    ) -> Result<Option<ParkingSession>, SessionLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = parking_sessions::table
            .filter(
                parking_sessions::plate_number
                    .eq(plate.as_ref())
                    .and(parking_sessions::exit_time.is_null()),
            )
            .select(SessionRow::as_select())
            .first::<SessionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_session).transpose()
    }

    async fn find_active_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ParkingSession>, SessionLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = parking_sessions::table
            .filter(
                parking_sessions::session_id
                    .eq(session_id.as_ref())
                    .and(parking_sessions::exit_time.is_null()),
            )
            .select(SessionRow::as_select())
            .first::<SessionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_session).transpose()
    }

    async fn find_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ParkingSession>, SessionLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = parking_sessions::table
            .filter(parking_sessions::session_id.eq(session_id.as_ref()))
            .select(SessionRow::as_select())
            .first::<SessionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_session).transpose()
    }

    async fn list_active(&self) -> Result<Vec<ParkingSession>, SessionLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SessionRow> = parking_sessions::table
            .filter(parking_sessions::exit_time.is_null())
            .order((
                parking_sessions::entry_time.asc(),
                parking_sessions::session_id.asc(),
            ))
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn create(&self, session: &ParkingSession) -> Result<(), SessionLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewSessionRow {
            session_id: session.id().as_ref(),
            owner_name: session.owner_name().as_ref(),
            owner_mobile: session.owner_mobile().as_ref(),
            plate_number: session.plate().as_ref(),
            vehicle_class: session.vehicle_class().code(),
            slot_id: session.slot_id().to_string(),
            entry_time: session.entry_time(),
            fee: 0,
        };

        diesel::insert_into(parking_sessions::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, session.plate()))
    }

    async fn close_session(
        &self,
        session_id: &SessionId,
        closure: &SessionClosure,
    ) -> Result<ParkingSession, SessionLedgerError> {
        let changes = closure_update(closure)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(
            parking_sessions::table.filter(
                parking_sessions::session_id
                    .eq(session_id.as_ref())
                    .and(parking_sessions::exit_time.is_null()),
            ),
        )
        .set(&changes)
        .returning(SessionRow::as_returning())
        .get_result::<SessionRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| SessionLedgerError::session_not_found(session_id.clone()))?;

        row_to_session(row)
    }

    async fn reopen_session(&self, session_id: &SessionId) -> Result<(), SessionLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let reopened = diesel::update(
            parking_sessions::table.filter(
                parking_sessions::session_id
                    .eq(session_id.as_ref())
                    .and(parking_sessions::exit_time.is_not_null()),
            ),
        )
        .set(&cleared_closure())
        .returning(SessionRow::as_returning())
        .get_result::<SessionRow>(&mut conn)
        .await
        .optional();

        match reopened {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                let exists = parking_sessions::table
                    .filter(parking_sessions::session_id.eq(session_id.as_ref()))
                    .count()
                    .get_result::<i64>(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                if exists > 0 {
                    Ok(())
                } else {
                    Err(SessionLedgerError::session_not_found(session_id.clone()))
                }
            }
            Err(err) if is_unique_violation_on(&err, ACTIVE_PLATE_INDEX) => {
                Err(SessionLedgerError::duplicate_active_session(
                    session_id.to_string(),
                ))
            }
            Err(err) => Err(map_diesel_error(err)),
        }
    }

    async fn list_history(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ParkingSession>, SessionLedgerError> {
        let limit = to_i64(limit, "history limit")?;
        let offset = to_i64(offset, "history offset")?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SessionRow> = parking_sessions::table
            .filter(parking_sessions::exit_time.is_not_null())
            .order((
                parking_sessions::exit_time.desc(),
                parking_sessions::session_id.asc(),
            ))
            .limit(limit)
            .offset(offset)
            .select(SessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_session).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use crate::domain::{PaymentMethod, PaymentStatus};

    fn entry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn active_row() -> SessionRow {
        SessionRow {
            session_id: "AB1-20240301090000".to_owned(),
            owner_name: "Asha".to_owned(),
            owner_mobile: "9000000000".to_owned(),
            plate_number: "AB1".to_owned(),
            vehicle_class: "2W".to_owned(),
            slot_id: "2W-01".to_owned(),
            entry_time: entry(),
            exit_time: None,
            fee: 0,
            duration_hours: None,
            payment_method: None,
            payment_status: None,
        }
    }

    #[rstest]
    fn converts_active_row(active_row: SessionRow) {
        let session = row_to_session(active_row).expect("valid row");
        assert!(session.is_active());
        assert_eq!(session.slot_id().to_string(), "2W-01");
    }

    #[rstest]
    fn converts_closed_row(mut active_row: SessionRow) {
        active_row.exit_time = Some(entry() + Duration::minutes(90));
        active_row.fee = 60;
        active_row.duration_hours = Some(2);
        active_row.payment_method = Some("qr_code".to_owned());
        active_row.payment_status = Some("completed".to_owned());

        let session = row_to_session(active_row).expect("valid row");
        let closure = session.closure().expect("closed");
        assert_eq!(closure.payment_method, PaymentMethod::QrCode);
        assert_eq!(closure.payment_status, PaymentStatus::Completed);
        assert_eq!(session.fee(), 60);
    }

    #[rstest]
    fn rejects_closed_row_without_payment(mut active_row: SessionRow) {
        active_row.exit_time = Some(entry() + Duration::minutes(90));
        active_row.duration_hours = Some(2);
        assert!(matches!(
            row_to_session(active_row),
            Err(SessionLedgerError::Query { .. })
        ));
    }

    #[rstest]
    fn rejects_exit_before_entry(mut active_row: SessionRow) {
        active_row.exit_time = Some(entry() - Duration::minutes(1));
        active_row.duration_hours = Some(1);
        active_row.payment_method = Some("cash".to_owned());
        active_row.payment_status = Some("completed".to_owned());
        assert!(row_to_session(active_row).is_err());
    }

    #[rstest]
    fn closure_update_round_trips_codes() {
        let update = closure_update(&SessionClosure {
            exit_time: entry(),
            fee: 30,
            duration_hours: 1,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Pending,
        })
        .expect("update");
        assert_eq!(update.payment_method, Some("cash"));
        assert_eq!(update.payment_status, Some("pending"));
        assert_eq!(update.fee, 30);
    }
}
