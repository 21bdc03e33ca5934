//! Background refresh loop for the event cache.
//!
//! [`SyncScheduler`] fetches immediately on start, then sleeps a fixed
//! interval between attempts. Iterations are strictly sequential, so no two
//! fetches ever overlap. Every failure is contained inside the iteration:
//! it is logged, the cache keeps its previous snapshot, and the loop moves
//! on to the next sleep.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

use super::upstream::EventSource;
use crate::cache::EventCache;
use crate::domain::FeatureCollection;
use crate::error::SyncError;

/// Periodic synchronizer from an [`EventSource`] into an [`EventCache`].
#[derive(Debug)]
pub struct SyncScheduler<S> {
    source: S,
    cache: EventCache,
    interval: Duration,
}

impl<S: EventSource> SyncScheduler<S> {
    /// Creates a scheduler that refreshes `cache` from `source` every
    /// `interval`.
    #[must_use]
    pub const fn new(source: S, cache: EventCache, interval: Duration) -> Self {
        Self {
            source,
            cache,
            interval,
        }
    }

    /// Performs one fetch-and-replace iteration.
    ///
    /// The upstream window ends today (UTC), so it grows by one day per
    /// day. The body is only written if it parses as a feature collection.
    /// Returns the number of features in the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] describing why the cache was left unchanged.
    pub async fn run_once(&self) -> Result<usize, SyncError> {
        let (body, features) = self.fetch_snapshot().await?;
        self.cache.write(&body).await?;
        Ok(features)
    }

    async fn fetch_snapshot(&self) -> Result<(Vec<u8>, usize), SyncError> {
        let end_date = Utc::now().date_naive();
        let body = self.source.fetch(end_date).await?;
        let collection = FeatureCollection::from_slice(&body)?;
        Ok((body, collection.len()))
    }

    async fn store(&self, fetched: Result<(Vec<u8>, usize), SyncError>) {
        let outcome = match fetched {
            Ok((body, features)) => self
                .cache
                .write(&body)
                .await
                .map(|()| features)
                .map_err(SyncError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(features) => {
                tracing::info!(features, "event cache updated");
            }
            Err(SyncError::CacheWrite(e)) => {
                tracing::error!(error = %e, "event cache write failed; keeping previous snapshot");
            }
            Err(e) => {
                tracing::warn!(error = %e, "event fetch failed; keeping previous snapshot");
            }
        }
    }

    /// Runs the refresh loop until `shutdown` fires or its sender is
    /// dropped. Never returns early on fetch or write failures.
    ///
    /// Shutdown abandons a pending fetch or sleep. A cache write that has
    /// started always runs to completion, so no temp file is left behind.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "sync scheduler started");

        loop {
            tracing::info!(path = %self.cache.path().display(), "refreshing event cache");
            let fetched = tokio::select! {
                _ = shutdown.recv() => break,
                fetched = self.fetch_snapshot() => fetched,
            };
            self.store(fetched).await;

            tokio::select! {
                _ = shutdown.recv() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("sync scheduler stopped");
    }

    /// Spawns [`run`](Self::run) as a background task and returns the
    /// handle that controls it. Does not wait for the first fetch.
    ///
    /// Dropping the returned handle also stops the loop at its next
    /// suspension point.
    #[must_use]
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle { shutdown_tx, task }
    }
}

/// Owner of a running [`SyncScheduler`] task.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals the loop to stop and waits for it to exit. An in-flight
    /// fetch is abandoned; an in-flight cache write finishes first.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the task panicked.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let _ = self.shutdown_tx.send(());
        self.task.await
    }

    /// Returns `true` once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
