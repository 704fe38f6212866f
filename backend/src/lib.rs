//! Parking-slot allocation and billing engine.
//!
//! The [`domain`] holds slots, sessions, fees and the allocation service.
//! [`inbound`] exposes it over HTTP and [`outbound`] provides the in-memory
//! and PostgreSQL stores. [`startup`] wires configuration to storage.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod startup;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
