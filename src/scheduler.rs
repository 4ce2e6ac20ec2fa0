// src/scheduler.rs
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cycle::Relay;

/// Drive the relay forever on a fixed interval. The cycle is awaited inside
/// the loop body, so two cycles can never run at once; an overrunning cycle
/// delays the next tick instead of bursting. The first tick fires immediately,
/// giving one cycle right at startup.
pub async fn run(relay: Relay, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        tracing::info!(
            now = %chrono::Utc::now().format("%d. %B %Y %H:%M:%S"),
            "running relay cycle"
        );

        let report = relay.run_cycle().await;
        tracing::info!(
            fetched = report.fetched,
            seen = report.seen,
            dispatched = report.dispatched,
            watermark = report.watermark,
            "cycle finished"
        );
    }
}

/// Background-task variant for embedding in a larger runtime.
pub fn spawn(relay: Relay, every: Duration) -> JoinHandle<()> {
    tokio::spawn(run(relay, every))
}
