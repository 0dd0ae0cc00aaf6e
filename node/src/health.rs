//! Background substrate health polling.
//!
//! Runs off the request path entirely: a spawned task probes the substrate
//! on a fixed cadence and publishes the latest status into a shared
//! snapshot. Transitions are logged once, not on every probe.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracelink_substrate::{CommitClient, HealthStatus};
use tracing::{debug, info, warn};

/// Handle to the background health poller
pub struct HealthMonitor {
    status: Arc<RwLock<HealthStatus>>,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    /// Spawns the poller; the first probe fires immediately
    pub fn spawn(substrate: Arc<dyn CommitClient>, interval: Duration) -> Self {
        let status = Arc::new(RwLock::new(HealthStatus::unhealthy("not yet probed")));
        let shared = Arc::clone(&status);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let probe = substrate.health().await;
                let transitioned = {
                    let mut current = shared.write();
                    let transitioned = current.healthy != probe.healthy;
                    *current = probe.clone();
                    transitioned
                };
                if transitioned {
                    if probe.healthy {
                        info!(detail = %probe.detail, "substrate healthy");
                    } else {
                        warn!(detail = %probe.detail, "substrate unhealthy");
                    }
                } else {
                    debug!(healthy = probe.healthy, "substrate health probed");
                }
            }
        });

        Self { status, handle }
    }

    /// The most recently observed health status
    pub fn snapshot(&self) -> HealthStatus {
        self.status.read().clone()
    }

    /// Stops the poller
    pub fn stop(&self) {
        self.handle.abort();
    }
}
