//! Background decay/eviction task.
//!
//! Waits one full period, then calls [`ClientRegistry::sweep`] every period
//! until told to stop. Missed ticks are skipped rather than replayed, so a
//! stalled runtime never produces a burst of back-to-back decays.

use crate::registry::ClientRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Shortest period the sweeper will run at.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Spawns the periodic sweep task.
pub struct Sweeper;

impl Sweeper {
    /// Start sweeping `registry` every `period` on the current tokio runtime.
    pub fn spawn(registry: Arc<ClientRegistry>, period: Duration) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(registry, period.max(MIN_PERIOD), shutdown_rx));
        SweeperHandle { shutdown_tx, task }
    }
}

/// Handle to a running sweeper.
///
/// Dropping the handle also stops the task.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Sweeper task ended abnormally");
        }
    }
}

async fn run(registry: Arc<ClientRegistry>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(period_ms = period.as_millis() as u64, "Sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = registry.sweep();
                debug!(decayed = report.decayed, evicted = report.evicted, "Sweeper tick");
            }
            // Err means every sender is gone, which is a shutdown as well.
            _ = shutdown_rx.changed() => {
                info!("Sweeper shutdown signal received");
                break;
            }
        }
    }
}
