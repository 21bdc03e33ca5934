//! Synchronization of the event cache with the upstream feed.
//!
//! [`start`] is the process lifecycle hook: called once at startup, it
//! spawns the [`SyncScheduler`] without waiting for the first fetch.

pub mod scheduler;
pub mod upstream;

pub use scheduler::{SchedulerHandle, SyncScheduler};
pub use upstream::{EventSource, UpstreamClient};

use crate::cache::EventCache;
use crate::config::GatewayConfig;
use crate::error::SyncError;

/// Spawns the background refresh loop for `cache` as configured.
///
/// The returned handle is the only way to stop the loop; keep it alive for
/// the lifetime of the process.
///
/// # Errors
///
/// Returns a [`SyncError`] if the upstream HTTP client cannot be built.
pub fn start(config: &GatewayConfig, cache: EventCache) -> Result<SchedulerHandle, SyncError> {
    let client = UpstreamClient::from_config(config)?;
    tracing::info!(
        upstream = %config.upstream_url,
        start_date = %config.fetch_start_date,
        min_magnitude = config.fetch_min_magnitude,
        "starting event sync"
    );
    Ok(SyncScheduler::new(client, cache, config.sync_interval()).spawn())
}
