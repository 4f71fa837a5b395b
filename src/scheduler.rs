use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{error, info};

use crate::pipeline::TrendingBuilder;

/// Spawns the optional in-process recompute loop.
///
/// External cron hitting the HTTP trigger stays the primary invocation path;
/// this daemon exists for deployments without an external scheduler. Failures
/// are logged and the loop keeps ticking — the next run is a full, independent
/// recomputation anyway.
pub fn spawn_interval_daemon(builder: Arc<TrendingBuilder>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately; skip it so startup does not race
        // the rest of process initialization
        ticker.tick().await;

        loop {
            ticker.tick().await;
            info!(every_secs = every.as_secs(), "starting scheduled trending run");
            match builder.run().await {
                Ok(report) => {
                    info!(updated = report.updated, "scheduled trending run completed");
                }
                Err(err) => {
                    error!(error = ?err, "scheduled trending run failed");
                }
            }
        }
    })
}
