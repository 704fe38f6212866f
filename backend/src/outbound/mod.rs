//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local slot registry and session ledger
//! - **persistence**: PostgreSQL-backed adapters using Diesel ORM
//! - **credentials**: configuration-backed operator credential check
//!
//! Adapters translate between domain types and storage representations.
//! Parking rules stay in the allocation service.

pub mod credentials;
pub mod memory;
pub mod persistence;
