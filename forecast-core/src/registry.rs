//! Host-boundary entry registry.
//!
//! The surrounding host hands validated configurations to `setup_entry` and
//! releases them through `unload_entry`; in between it reads sensor values.
//! The registry is an explicit owned map, injected wherever it is needed,
//! rather than ambient per-process state.

use std::{collections::HashMap, time::Duration};

use tracing::{info, warn};

use crate::{
    config::EntryConfig,
    coordinator::{Coordinator, DEFAULT_UPDATE_INTERVAL},
    error::SetupError,
    provider::{ForecastProvider, provider_for},
    sensor::{Sensor, sensors_for},
};

/// Everything the host holds for one loaded configuration.
#[derive(Debug)]
pub struct EntryHandle {
    unique_id: String,
    coordinator: Coordinator,
    sensors: Vec<Sensor>,
}

impl EntryHandle {
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}

/// Map of loaded configurations, keyed by unique id.
#[derive(Debug)]
pub struct EntryRegistry {
    entries: HashMap<String, EntryHandle>,
    update_interval: Duration,
}

impl Default for EntryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::with_update_interval(DEFAULT_UPDATE_INTERVAL)
    }

    pub fn with_update_interval(update_interval: Duration) -> Self {
        Self { entries: HashMap::new(), update_interval }
    }

    /// Load a configuration: reject duplicates, do the initial refresh, build
    /// the sensor list, and start the poll timer.
    ///
    /// A failed initial refresh does not abort the load; sensors report
    /// `None` until the timer produces the first good snapshot.
    pub async fn setup_entry(&mut self, entry: EntryConfig) -> Result<&EntryHandle, SetupError> {
        let provider = provider_for(entry.provider);
        self.setup_entry_with(provider, entry).await
    }

    /// Same as [`setup_entry`](Self::setup_entry) with an explicit provider,
    /// so hosts and tests can inject non-default endpoints.
    pub async fn setup_entry_with(
        &mut self,
        provider: Box<dyn ForecastProvider>,
        entry: EntryConfig,
    ) -> Result<&EntryHandle, SetupError> {
        let unique_id = entry.unique_id();
        if self.entries.contains_key(&unique_id) {
            return Err(SetupError::AlreadyConfigured(unique_id));
        }

        let mut coordinator = Coordinator::new(provider, entry);

        // Mirror of the initial refresh the platform performs at setup, so
        // sensors have data as soon as they exist.
        if let Err(err) = coordinator.refresh().await {
            warn!(%unique_id, %err, "initial forecast refresh failed; sensors stay empty until the next poll");
        }

        let sensors = sensors_for(&coordinator);
        coordinator.start(self.update_interval);
        info!(%unique_id, sensors = sensors.len(), "forecast entry loaded");

        let handle = EntryHandle { unique_id: unique_id.clone(), coordinator, sensors };
        Ok(self.entries.entry(unique_id).or_insert(handle))
    }

    /// Unload a configuration: stop its timer (abandoning any in-flight
    /// fetch) and drop its sensors. Returns whether the entry existed.
    pub fn unload_entry(&mut self, unique_id: &str) -> bool {
        match self.entries.remove(unique_id) {
            Some(mut handle) => {
                handle.coordinator.stop();
                info!(%unique_id, "forecast entry unloaded");
                true
            }
            None => false,
        }
    }

    pub fn get(&self, unique_id: &str) -> Option<&EntryHandle> {
        self.entries.get(unique_id)
    }

    pub fn handles(&self) -> impl Iterator<Item = &EntryHandle> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
