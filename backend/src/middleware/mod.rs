//! Request middleware.
//!
//! [`Trace`] tags every request with a trace id and a tracing span.

pub mod trace;

pub use trace::Trace;
