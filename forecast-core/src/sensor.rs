//! Read-only sensor views over a coordinator's snapshot.
//!
//! A sensor never fetches; it holds a watch receiver onto the coordinator's
//! snapshot channel and derives its value on every read. Missing data at any
//! level (no snapshot yet, day index past the payload, field absent) is
//! reported as `None`, never as an error.

use crate::{
    config::EntryConfig,
    coordinator::{Coordinator, SnapshotReceiver},
    model::{SensorField, SensorValue},
};

/// One (configuration, day index, field) sensor with its static metadata.
#[derive(Debug, Clone)]
pub struct Sensor {
    name: String,
    unique_id: String,
    day_index: usize,
    field: SensorField,
    attribution: &'static str,
    snapshot_rx: SnapshotReceiver,
}

impl Sensor {
    fn new(entry: &EntryConfig, day_index: usize, field: SensorField, rx: SnapshotReceiver) -> Self {
        Self {
            name: format!(
                "{} {} Day {}",
                entry.provider.display_name(),
                field.label(),
                day_index
            ),
            unique_id: format!("{}_{}_{}", entry.unique_id(), field.key(), day_index),
            day_index,
            field,
            attribution: entry.provider.attribution(),
            snapshot_rx: rx,
        }
    }

    /// Display name, e.g. "AccuWeather Day Long Phrase Day 0".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable id derived from location, field and day index.
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn day_index(&self) -> usize {
        self.day_index
    }

    pub fn field(&self) -> SensorField {
        self.field
    }

    /// Unit of measurement ("°C" for the temperature sensors).
    pub fn unit(&self) -> Option<&'static str> {
        self.field.unit()
    }

    /// Whether the host should treat the value as a numeric measurement.
    pub fn is_measurement(&self) -> bool {
        self.field.is_measurement()
    }

    pub fn attribution(&self) -> &'static str {
        self.attribution
    }

    /// Current value, derived live from the latest snapshot.
    pub fn value(&self) -> Option<SensorValue> {
        let guard = self.snapshot_rx.borrow();
        guard.as_ref().and_then(|snapshot| snapshot.field(self.day_index, self.field))
    }
}

/// Build the full sensor list for a configuration: one sensor per
/// (day, field) pair the provider exposes, all reading from the same channel.
pub fn sensors_for(coordinator: &Coordinator) -> Vec<Sensor> {
    let entry = coordinator.entry();
    let provider = entry.provider;

    let mut sensors =
        Vec::with_capacity(provider.forecast_days() * provider.sensor_fields().len());
    for day_index in 0..provider.forecast_days() {
        for &field in provider.sensor_fields() {
            sensors.push(Sensor::new(entry, day_index, field, coordinator.subscribe()));
        }
    }
    sensors
}
