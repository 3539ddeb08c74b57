use crate::{
    config::EntryConfig,
    error::{SetupError, UpdateFailed},
    model::{SensorField, Snapshot},
    provider::{accuweather::AccuWeatherProvider, pirateweather::PirateWeatherProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod accuweather;
pub mod pirateweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    AccuWeather,
    PirateWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::AccuWeather => "accuweather",
            ProviderId::PirateWeather => "pirateweather",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::AccuWeather => "AccuWeather",
            ProviderId::PirateWeather => "Pirate Weather",
        }
    }

    /// Attribution string exposed on every sensor of this provider.
    pub fn attribution(&self) -> &'static str {
        match self {
            ProviderId::AccuWeather => "Data provided by AccuWeather",
            ProviderId::PirateWeather => "Powered by Pirate Weather",
        }
    }

    /// Number of per-day records the provider returns.
    pub fn forecast_days(&self) -> usize {
        match self {
            ProviderId::AccuWeather => 5,
            ProviderId::PirateWeather => 8,
        }
    }

    /// Fields exposed as sensors for this provider.
    pub fn sensor_fields(&self) -> &'static [SensorField] {
        match self {
            ProviderId::AccuWeather => &[
                SensorField::DayLongPhrase,
                SensorField::NightLongPhrase,
                SensorField::RealFeelMax,
            ],
            ProviderId::PirateWeather => {
                &[SensorField::Summary, SensorField::ApparentTemperatureHigh]
            }
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::AccuWeather, ProviderId::PirateWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "accuweather" => Ok(ProviderId::AccuWeather),
            "pirateweather" => Ok(ProviderId::PirateWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: accuweather, pirateweather."
            )),
        }
    }
}

/// One daily-forecast provider: a setup-time probe plus the steady-state fetch.
///
/// Both calls issue a single bounded-timeout GET; classification of the
/// outcome differs (form-validation errors vs. `UpdateFailed`).
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// One-shot reachability/authorization check used before a configuration
    /// is accepted. Never retried here.
    async fn probe(&self, entry: &EntryConfig) -> Result<(), SetupError>;

    /// Fetch and validate one forecast payload. On any failure the caller
    /// keeps its previous snapshot.
    async fn fetch_daily(&self, entry: &EntryConfig) -> Result<Snapshot, UpdateFailed>;
}

/// Construct the provider implementation for an id, with default endpoints.
pub fn provider_for(id: ProviderId) -> Box<dyn ForecastProvider> {
    match id {
        ProviderId::AccuWeather => Box::new(AccuWeatherProvider::new()),
        ProviderId::PirateWeather => Box::new(PirateWeatherProvider::new()),
    }
}
