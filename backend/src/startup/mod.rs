//! Process startup: configuration loading and storage selection.

pub mod settings;
pub mod storage;

pub use settings::AppSettings;
pub use storage::{ParkingPorts, StorageBackend, StorageOptions, connect_storage};
