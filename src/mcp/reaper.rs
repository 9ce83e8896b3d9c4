//! Background eviction of idle HTTP sessions.
//!
//! HTTP clients rarely send `DELETE /mcp`, so sessions (and the carts keyed
//! by them) that see no traffic for the configured TTL are ended here.

use super::handlers::SharedDispatcher;
use std::time::Duration;

/// Shortest pause between sweeps
const MIN_SWEEP_EVERY: Duration = Duration::from_secs(1);

/// How often to sweep for a given TTL: a quarter of it, at least one second.
pub fn sweep_interval(ttl: Duration) -> Duration {
    (ttl / 4).max(MIN_SWEEP_EVERY)
}

/// Spawns the sweep loop. It runs until the runtime shuts down.
pub fn spawn(dispatcher: SharedDispatcher, ttl: Duration) -> tokio::task::JoinHandle<()> {
    let every = sweep_interval(ttl);
    let max_idle = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);

    tokio::spawn(async move {
        tracing::info!(
            ttl_secs = ttl.as_secs(),
            every_secs = every.as_secs(),
            "Session reaper started"
        );
        let mut ticker = tokio::time::interval(every);

        loop {
            ticker.tick().await;
            let evicted = dispatcher.evict_idle_sessions(max_idle);
            if evicted > 0 {
                tracing::debug!(evicted, remaining = dispatcher.sessions().len(), "Session sweep");
            }
        }
    })
}
