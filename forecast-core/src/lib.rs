//! Core library for the daily-forecast integrations.
//!
//! This crate defines:
//! - Configuration & setup-probe handling, with duplicate rejection
//! - Abstraction over forecast providers (AccuWeather, Pirate Weather)
//! - The hourly polling coordinator and its snapshot channel
//! - Read-only per-day sensors and the host-facing entry registry
//!
//! It is used by `forecast-cli`, but can also be embedded in other hosts.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod provider;
pub mod registry;
pub mod sensor;

pub use config::{ConfigStore, EntryConfig, Location, validate_entry};
pub use coordinator::{Coordinator, DEFAULT_UPDATE_INTERVAL, MIN_UPDATE_INTERVAL, SnapshotReceiver};
pub use error::{SetupError, UpdateFailed};
pub use model::{SensorField, SensorValue, Snapshot};
pub use provider::{ForecastProvider, ProviderId, provider_for};
pub use registry::{EntryHandle, EntryRegistry};
pub use sensor::{Sensor, sensors_for};
