//! Expiry sweeper
//!
//! Background worker that scans for pending transfers past their
//! deadline and expires them, releasing the holds. A race with a live
//! confirmation is settled by the record lock: whichever side wins, the
//! other finds a terminal status and stands down.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::clock::Clock;

use super::store::TransferStore;
use super::workflow::TransferWorkflow;

/// Configuration for the expiry sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to scan for overdue transfers
    pub sweep_interval: Duration,
    /// Maximum transfers to expire per scan
    pub batch_size: usize,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            batch_size: 100,
        }
    }
}

/// Expiry Sweeper
///
/// Periodically scans the transfer store for pending records whose
/// deadline has passed and drives each through expiry. Overdue funds
/// come back to their senders without anyone asking.
pub struct ExpirySweeper {
    workflow: Arc<TransferWorkflow>,
    transfers: Arc<TransferStore>,
    clock: Clock,
    config: SweeperConfig,
}

impl ExpirySweeper {
    pub fn new(
        workflow: Arc<TransferWorkflow>,
        transfers: Arc<TransferStore>,
        clock: Clock,
        config: SweeperConfig,
    ) -> Self {
        Self {
            workflow,
            transfers,
            clock,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(
        workflow: Arc<TransferWorkflow>,
        transfers: Arc<TransferStore>,
        clock: Clock,
    ) -> Self {
        Self::new(workflow, transfers, clock, SweeperConfig::default())
    }

    /// Run the sweeper loop
    ///
    /// This method runs forever; spawn it on the runtime and abort the
    /// handle to stop it.
    pub async fn run(&self) -> ! {
        info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            batch_size = self.config.batch_size,
            "Starting expiry sweeper"
        );

        loop {
            let expired = self.sweep_once();
            if expired > 0 {
                info!(expired, "Sweep cycle expired overdue transfers");
            }

            tokio::time::sleep(self.config.sweep_interval).await;
        }
    }

    /// Run a single sweep cycle, returning how many transfers expired.
    ///
    /// Candidates that reach a terminal state between the scan and the
    /// record lock are skipped; that is the normal outcome of losing a
    /// race, not a failure.
    pub fn sweep_once(&self) -> usize {
        let now = self.clock.now();
        let candidates = self
            .transfers
            .expired_pending_ids(now, self.config.batch_size);

        if candidates.is_empty() {
            debug!("No overdue transfers found");
            return 0;
        }

        debug!(count = candidates.len(), "Found overdue transfers");

        let mut expired = 0;
        for id in candidates {
            match self.workflow.expire_overdue(id) {
                Ok(true) => expired += 1,
                Ok(false) => {
                    debug!(transfer = %id, "Transfer reached a terminal state first");
                }
                Err(e) => {
                    error!(transfer = %id, error = %e, "Failed to expire transfer");
                }
            }
        }
        expired
    }
}
