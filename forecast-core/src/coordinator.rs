//! Polling coordinator: owns the update timer and the latest snapshot.
//!
//! One coordinator runs per configuration. The snapshot lives in a
//! `tokio::sync::watch` channel, so replacement on a successful poll is a
//! single atomic publish and any number of sensors can read the latest value
//! without locking each other out.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    config::EntryConfig,
    error::UpdateFailed,
    model::Snapshot,
    provider::ForecastProvider,
};

/// Both providers poll once an hour.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Shortest period `start` will accept; `tokio::time::interval_at` panics on
/// a zero period, and a panic inside the detached timer task would go unseen.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1);

/// Shared handle to the latest snapshot. `None` until the first successful poll.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<Snapshot>>>;

struct Inner {
    provider: Box<dyn ForecastProvider>,
    entry: EntryConfig,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    // Serializes refreshes so a forced refresh cannot overlap a timer tick.
    refresh_gate: Mutex<()>,
}

impl Inner {
    async fn refresh(&self) -> Result<(), UpdateFailed> {
        let _gate = self.refresh_gate.lock().await;

        // On failure the previous snapshot stays in the channel untouched.
        let snapshot = self.provider.fetch_daily(&self.entry).await?;

        debug!(
            provider = %self.provider.id(),
            location = %self.entry.location,
            days = snapshot.day_count(),
            "forecast snapshot replaced"
        );
        self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
        Ok(())
    }
}

/// Scheduled fetch loop for one configuration.
///
/// `start` spawns the timer task; `stop` (or drop) aborts it, abandoning any
/// in-flight fetch without surfacing an error.
pub struct Coordinator {
    inner: Arc<Inner>,
    timer: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("entry", &self.inner.entry)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Coordinator {
    pub fn new(provider: Box<dyn ForecastProvider>, entry: EntryConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                provider,
                entry,
                snapshot_tx,
                refresh_gate: Mutex::new(()),
            }),
            timer: None,
        }
    }

    pub fn entry(&self) -> &EntryConfig {
        &self.inner.entry
    }

    /// Latest snapshot, if any poll has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot replacements. The receiver also serves reads of
    /// the current value, which is how sensors are wired up.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.inner.snapshot_tx.subscribe()
    }

    /// Forced refresh, outside the timer cadence.
    pub async fn refresh(&self) -> Result<(), UpdateFailed> {
        self.inner.refresh().await
    }

    /// Start the periodic poll loop. The first tick fires one `period` from
    /// now; the caller is expected to have done an initial refresh already.
    /// Periods below [`MIN_UPDATE_INTERVAL`] are clamped up to it. Calling
    /// `start` on a running coordinator is a no-op.
    pub fn start(&mut self, period: Duration) {
        if self.timer.is_some() {
            return;
        }

        let period = if period < MIN_UPDATE_INTERVAL {
            warn!(
                requested_ms = period.as_millis() as u64,
                "poll period too short; clamping to the minimum"
            );
            MIN_UPDATE_INTERVAL
        } else {
            period
        };

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if let Err(err) = inner.refresh().await {
                    warn!(
                        provider = %inner.provider.id(),
                        location = %inner.entry.location,
                        %err,
                        "scheduled forecast update failed; keeping previous snapshot"
                    );
                }
            }
        });
        self.timer = Some(handle);
    }

    /// Stop the timer and abandon any in-flight fetch.
    pub fn stop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
