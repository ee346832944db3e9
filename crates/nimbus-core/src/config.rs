//! Scanner configuration

use std::time::Duration;

/// Settings for the periodic snapshot scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Time between scans; the first scan happens one period after start
    pub interval: Duration,
}

impl ScannerConfig {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Interval from a whole number of seconds
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::from_secs(300)
    }
}
