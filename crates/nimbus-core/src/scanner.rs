//! Periodic snapshot scanner
//!
//! A single tokio task owns the interval. Each tick captures a snapshot
//! through the `InventoryService`; a failed capture is logged and the next
//! tick is the only retry. Shutdown is observed between ticks, so a scan in
//! flight always completes.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

use crate::config::ScannerConfig;
use crate::error::ServiceError;
use crate::service::InventoryService;
use crate::state::ScannerState;

/// Background scanner, not yet started
pub struct Scanner {
    service: InventoryService,
    config: ScannerConfig,
    shutdown: watch::Receiver<bool>,
}

/// Handle to a running scanner
pub struct ScannerHandle {
    state: watch::Receiver<ScannerState>,
    task: JoinHandle<Result<(), ServiceError>>,
}

impl Scanner {
    /// Create a scanner that stops once `shutdown` becomes `true` or its
    /// sender is dropped
    #[must_use]
    pub fn new(
        service: InventoryService,
        config: ScannerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service,
            config,
            shutdown,
        }
    }

    /// Start the scan loop on the current runtime
    #[must_use]
    pub fn spawn(self) -> ScannerHandle {
        let (state_tx, state_rx) = watch::channel(ScannerState::Idle);
        let task = tokio::spawn(self.run(state_tx));

        ScannerHandle {
            state: state_rx,
            task,
        }
    }

    async fn run(mut self, state: watch::Sender<ScannerState>) -> Result<(), ServiceError> {
        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = period.as_secs(), "scanner started");

        loop {
            if *self.shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped");
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            transition(&state, ScannerState::Scanning)?;
            self.scan_once().await;
            transition(&state, ScannerState::Idle)?;
        }

        transition(&state, ScannerState::Stopped)?;
        info!("scanner stopped");
        Ok(())
    }

    async fn scan_once(&self) {
        match self.service.capture_snapshot_now().await {
            Ok(snapshot) => debug!(timestamp = snapshot.timestamp, "scheduled scan stored"),
            Err(e) => error!(error = %e, "scheduled scan failed"),
        }
    }
}

fn transition(
    state: &watch::Sender<ScannerState>,
    next: ScannerState,
) -> Result<(), ServiceError> {
    let current = *state.borrow();
    if !current.can_transition_to(next) {
        return Err(ServiceError::InvalidTransition {
            from: current,
            to: next,
        });
    }

    state.send_replace(next);
    debug!(from = %current, to = %next, "scanner state transition");
    Ok(())
}

impl ScannerHandle {
    /// Current scanner state
    #[must_use]
    pub fn state(&self) -> ScannerState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScannerState> {
        self.state.clone()
    }

    /// Wait for the scan loop to finish
    ///
    /// # Errors
    /// Returns an error if the loop hit an invalid transition or the task
    /// panicked.
    pub async fn join(self) -> Result<(), ServiceError> {
        self.task.await?
    }
}
