//! Application state shared across HTTP handlers

use nimbus_core::{InventoryService, ScannerState};
use tokio::sync::watch;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Inventory queries and snapshot capture
    pub service: InventoryService,
    /// Latest scanner state
    pub scanner: watch::Receiver<ScannerState>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: InventoryService, scanner: watch::Receiver<ScannerState>) -> Self {
        Self { service, scanner }
    }

    /// Current scanner state
    pub fn scanner_state(&self) -> ScannerState {
        *self.scanner.borrow()
    }
}
