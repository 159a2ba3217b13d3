//! Interval scheduler for the ingestion cycle
//!
//! A single periodic trigger starts one ingestion cycle per tick.
//! Cycles are explicitly non-reentrant: an in-flight flag skips a tick
//! that fires while the previous cycle is still running. Stopping the
//! poller prevents future cycles but never interrupts one in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use pulse_core::PulseError;

use crate::ingest::IngestService;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between cycle triggers
    pub interval: Duration,
    /// When false, ticks no-op and no cycle starts
    pub enabled: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(45_000),
            enabled: true,
        }
    }
}

/// Handle to a running poller task
pub struct PollerHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the poller: no further cycles start; a cycle already in
    /// flight runs to completion on its own task.
    pub async fn stop(self) -> Result<(), PulseError> {
        let _ = self.cancel_tx.send(());
        self.join
            .await
            .map_err(|e| PulseError::internal(format!("poller task failed: {}", e)))
    }
}

/// The ingestion scheduler
pub struct NewsPoller;

impl NewsPoller {
    /// Spawn the polling loop.
    pub fn spawn(ingest: Arc<IngestService>, config: PollerConfig) -> PollerHandle {
        info!(
            "starting news poller: interval {:?}, enabled={}",
            config.interval, config.enabled
        );

        let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
        let in_flight = Arc::new(AtomicBool::new(false));

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // consume the immediate first tick so the first cycle runs a
            // full interval after startup
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel_rx.recv() => {
                        info!("poller shutdown requested");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !config.enabled {
                            debug!("polling disabled via configuration");
                            continue;
                        }
                        if in_flight.swap(true, Ordering::SeqCst) {
                            warn!("previous ingestion cycle still running; skipping this tick");
                            continue;
                        }

                        let ingest = Arc::clone(&ingest);
                        let in_flight = Arc::clone(&in_flight);
                        tokio::spawn(async move {
                            ingest.run_cycle().await;
                            in_flight.store(false, Ordering::SeqCst);
                        });
                    }
                }
            }
        });

        PollerHandle { cancel_tx, join }
    }
}
