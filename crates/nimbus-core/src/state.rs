//! Scanner state machine types

use std::fmt;

/// States of the background scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    /// Waiting for the next tick
    Idle,
    /// Aggregating and storing a snapshot
    Scanning,
    /// Shut down; terminal
    Stopped,
}

impl ScannerState {
    /// Whether moving from `self` to `next` is allowed
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Scanning)
                | (Self::Scanning, Self::Idle)
                | (Self::Idle | Self::Scanning, Self::Stopped)
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
