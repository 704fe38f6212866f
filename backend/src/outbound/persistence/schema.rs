//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Fixed slot catalogue and current occupancy.
    parking_slots (slot_id) {
        /// Canonical id such as `2W-07`.
        slot_id -> Varchar,
        /// `2W` or `4W`.
        vehicle_class -> Varchar,
        slot_number -> Int4,
        /// Occupying session; null when free.
        session_id -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Active and closed parking sessions.
    ///
    /// A partial unique index on `plate_number` where `exit_time IS NULL`
    /// allows one active session per plate.
    parking_sessions (session_id) {
        session_id -> Varchar,
        owner_name -> Varchar,
        owner_mobile -> Varchar,
        plate_number -> Varchar,
        vehicle_class -> Varchar,
        slot_id -> Varchar,
        entry_time -> Timestamptz,
        /// Null while the vehicle is parked.
        exit_time -> Nullable<Timestamptz>,
        fee -> Int8,
        duration_hours -> Nullable<Int4>,
        payment_method -> Nullable<Varchar>,
        payment_status -> Nullable<Varchar>,
    }
}

diesel::joinable!(parking_sessions -> parking_slots (slot_id));
diesel::allow_tables_to_appear_in_same_query!(parking_slots, parking_sessions);
