//! nimbus-core: inventory service and background scanner
//!
//! Wires the provider registry to the snapshot store. The `InventoryService`
//! answers live and historical queries; the `Scanner` captures a snapshot on
//! a fixed period until shut down.

pub mod config;
pub mod error;
pub mod scanner;
pub mod service;
pub mod state;

pub use config::ScannerConfig;
pub use error::ServiceError;
pub use scanner::{Scanner, ScannerHandle};
pub use service::InventoryService;
pub use state::ScannerState;
