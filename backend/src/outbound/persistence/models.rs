//! Diesel row structs for the parking tables.
//!
//! These types are internal to the persistence layer; adapters convert them
//! to domain types through validated constructors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{parking_sessions, parking_slots};

/// Row struct for reading from the parking_slots table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parking_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SlotRow {
    pub slot_id: String,
    pub vehicle_class: String,
    pub slot_number: i32,
    pub session_id: Option<String>,
}

/// Insertable struct for seeding the slot catalogue.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parking_slots)]
pub(crate) struct NewSlotRow {
    pub slot_id: String,
    pub vehicle_class: &'static str,
    pub slot_number: i32,
}

/// Row struct for reading from the parking_sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parking_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub session_id: String,
    pub owner_name: String,
    pub owner_mobile: String,
    pub plate_number: String,
    pub vehicle_class: String,
    pub slot_id: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub fee: i64,
    pub duration_hours: Option<i32>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

/// Insertable struct for opening a session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parking_sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub session_id: &'a str,
    pub owner_name: &'a str,
    pub owner_mobile: &'a str,
    pub plate_number: &'a str,
    pub vehicle_class: &'static str,
    pub slot_id: String,
    pub entry_time: DateTime<Utc>,
    pub fee: i64,
}

/// Changeset recording or clearing a session's closure.
///
/// `treat_none_as_null` lets reopening write nulls back.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = parking_sessions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SessionClosureUpdate {
    pub exit_time: Option<DateTime<Utc>>,
    pub fee: i64,
    pub duration_hours: Option<i32>,
    pub payment_method: Option<&'static str>,
    pub payment_status: Option<&'static str>,
}
