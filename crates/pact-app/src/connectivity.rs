use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use pact_engine::SyncCoordinator;
use pact_store::RecordStore;

/// What one probe result means given the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Reconnected,
    WentOffline,
    Unchanged,
}

fn classify(was_online: bool, reachable: bool) -> Transition {
    match (was_online, reachable) {
        (false, true) => Transition::Reconnected,
        (true, false) => Transition::WentOffline,
        _ => Transition::Unchanged,
    }
}

/// Periodic remote-connectivity probe.
///
/// Independent of the reminder poll; each tick is one bounded `ping`. On an
/// offline→online transition it triggers a full refresh, which is also the
/// implicit retry for any mutation that only landed locally.
///
/// The starting state comes from a real probe, not an assumption: the boot
/// refresh may have fallen back to the mirror, so a reachable remote at
/// startup gets one refresh immediately rather than waiting for a full
/// outage/recovery cycle.
pub async fn run_connectivity_loop(
    store: Arc<RecordStore>,
    coordinator: Arc<SyncCoordinator>,
    interval_secs: u64,
) {
    let Some(remote) = store.remote() else {
        info!("No remote configured; connectivity watcher idle");
        return;
    };

    let mut online = remote.ping().await;
    if online {
        if let Err(e) = coordinator.refresh().await {
            warn!("Startup refresh failed: {}", e);
        }
    } else {
        warn!("Remote unreachable at startup; operating from the local mirror");
    }

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;

        let reachable = remote.ping().await;
        match classify(online, reachable) {
            Transition::Reconnected => {
                info!("Remote reachable again; refreshing from it");
                if let Err(e) = coordinator.refresh().await {
                    warn!("Refresh after reconnect failed: {}", e);
                }
            }
            Transition::WentOffline => {
                warn!("Remote unreachable; operating from the local mirror");
            }
            Transition::Unchanged => {}
        }
        online = reachable;
    }
}
