//! PostgreSQL-backed `SlotRegistry` implementation using Diesel ORM.
//!
//! Occupancy changes are single conditional `UPDATE`s, so two processes
//! sharing the database cannot both occupy one slot.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{SlotRegistry, SlotRegistryError};
use crate::domain::{SessionId, Slot, SlotCounts, SlotId, VehicleClass};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSlotRow, SlotRow};
use super::pool::{DbPool, PoolError};
use super::schema::parking_slots;

/// Diesel-backed implementation of the slot registry port.
#[derive(Clone)]
pub struct DieselSlotRegistry {
    pool: DbPool,
}

impl DieselSlotRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SlotRegistryError {
    map_basic_pool_error(error, SlotRegistryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SlotRegistryError {
    map_basic_diesel_error(
        error,
        SlotRegistryError::query,
        SlotRegistryError::connection,
    )
}

fn row_to_slot(row: SlotRow) -> Result<Slot, SlotRegistryError> {
    let id: SlotId = row
        .slot_id
        .parse()
        .map_err(|err| SlotRegistryError::query(format!("stored slot id: {err}")))?;
    let class: VehicleClass = row
        .vehicle_class
        .parse()
        .map_err(|err| SlotRegistryError::query(format!("stored slot class: {err}")))?;
    if class != id.vehicle_class() || i64::from(row.slot_number) != i64::from(id.number()) {
        return Err(SlotRegistryError::query(format!(
            "slot row {} disagrees with its class or number",
            row.slot_id
        )));
    }
    let occupant = row
        .session_id
        .as_deref()
        .map(SessionId::parse)
        .transpose()
        .map_err(|err| SlotRegistryError::query(format!("stored occupant id: {err}")))?;
    Ok(Slot::from_parts(id, occupant))
}

fn catalogue_rows(counts: &SlotCounts) -> Result<Vec<NewSlotRow>, SlotRegistryError> {
    counts
        .catalogue()
        .into_iter()
        .map(|slot| {
            let slot_number = i32::try_from(slot.id().number()).map_err(|_| {
                SlotRegistryError::query(format!("slot number too large: {}", slot.id()))
            })?;
            Ok(NewSlotRow {
                slot_id: slot.id().to_string(),
                vehicle_class: slot.vehicle_class().code(),
                slot_number,
            })
        })
        .collect()
}

#[async_trait]
impl SlotRegistry for DieselSlotRegistry {
    async fn initialize(&self, counts: &SlotCounts) -> Result<bool, SlotRegistryError> {
        let rows = catalogue_rows(counts)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let existing: i64 = parking_slots::table.count().get_result(conn).await?;
                if existing > 0 {
                    return Ok(false);
                }
                let inserted = diesel::insert_into(parking_slots::table)
                    .values(&rows)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                Ok(inserted > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_available(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<SlotId>, SlotRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SlotRow> = parking_slots::table
            .filter(
                parking_slots::vehicle_class
                    .eq(vehicle_class.code())
                    .and(parking_slots::session_id.is_null()),
            )
            .order(parking_slots::slot_number.asc())
            .select(SlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| row_to_slot(row).map(|slot| slot.id()))
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Slot>, SlotRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<SlotRow> = parking_slots::table
            .order((
                parking_slots::vehicle_class.asc(),
                parking_slots::slot_number.asc(),
            ))
            .select(SlotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_slot).collect()
    }

    async fn find(&self, slot_id: SlotId) -> Result<Option<Slot>, SlotRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = parking_slots::table
            .filter(parking_slots::slot_id.eq(slot_id.to_string()))
            .select(SlotRow::as_select())
            .first::<SlotRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_slot).transpose()
    }

    async fn occupy(
        &self,
        slot_id: SlotId,
        session_id: &SessionId,
    ) -> Result<(), SlotRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let key = slot_id.to_string();

        let updated = diesel::update(
            parking_slots::table.filter(
                parking_slots::slot_id
                    .eq(&key)
                    .and(parking_slots::session_id.is_null()),
            ),
        )
        .set(parking_slots::session_id.eq(Some(session_id.as_ref())))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 1 {
            return Ok(());
        }

        // Nothing matched: report why.
        let current = parking_slots::table
            .filter(parking_slots::slot_id.eq(&key))
            .select(SlotRow::as_select())
            .first::<SlotRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_slot)
            .transpose()?;
        match current {
            None => Err(SlotRegistryError::slot_not_found(slot_id)),
            Some(slot) => match slot.session_id() {
                Some(occupant) => Err(SlotRegistryError::slot_already_occupied(
                    slot_id,
                    occupant.clone(),
                )),
                None => Err(SlotRegistryError::query(format!(
                    "slot {slot_id} was released while being occupied"
                ))),
            },
        }
    }

    async fn release(&self, slot_id: SlotId) -> Result<(), SlotRegistryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            parking_slots::table.filter(parking_slots::slot_id.eq(slot_id.to_string())),
        )
        .set(parking_slots::session_id.eq(None::<String>))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(SlotRegistryError::slot_not_found(slot_id));
        }
        Ok(())
    }
}
