//! HTTP inbound adapter exposing the parking REST endpoints.

pub mod error;
pub mod health;
pub mod history;
pub mod operator;
pub mod session;
pub mod slots;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod vehicles;

pub use error::ApiResult;
