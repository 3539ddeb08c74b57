use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::{EntryConfig, Location},
    error::{SetupError, UpdateFailed},
    model::Snapshot,
};

use super::{ForecastProvider, ProviderId};

const DEFAULT_ENDPOINT: &str = "https://api.pirateweather.net/forecast";

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Daily forecast client for the Pirate Weather API.
///
/// `GET {endpoint}/{api_key}/{latitude},{longitude}?units=si`
#[derive(Debug, Clone)]
pub struct PirateWeatherProvider {
    endpoint: String,
    timeout: Duration,
    http: Client,
}

impl Default for PirateWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PirateWeatherProvider {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Point the provider at a different base URL (used by tests).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), timeout: FETCH_TIMEOUT, http: Client::new() }
    }

    /// Override the per-request timeout (used by tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn coordinates<E>(entry: &EntryConfig, err: E) -> Result<(f64, f64), E> {
        match entry.location {
            Location::Coordinates { latitude, longitude } => Ok((latitude, longitude)),
            Location::Key(_) => Err(err),
        }
    }

    async fn request(
        &self,
        api_key: &str,
        latitude: f64,
        longitude: f64,
    ) -> reqwest::Result<reqwest::Response> {
        // The API key is a path segment here, not a query parameter.
        let url = format!("{}/{}/{},{}", self.endpoint, api_key, latitude, longitude);
        debug!(lat = latitude, lon = longitude, "requesting Pirate Weather forecast");

        self.http
            .get(&url)
            .query(&[("units", "si")])
            .timeout(self.timeout)
            .send()
            .await
    }
}

#[async_trait]
impl ForecastProvider for PirateWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::PirateWeather
    }

    async fn probe(&self, entry: &EntryConfig) -> Result<(), SetupError> {
        let (latitude, longitude) = Self::coordinates(
            entry,
            SetupError::CannotConnect("Pirate Weather requires coordinates".into()),
        )?;

        let response = self
            .request(&entry.api_key, latitude, longitude)
            .await
            .map_err(|err| SetupError::CannotConnect(err.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SetupError::InvalidAuth),
            // Unlike AccuWeather there is no location lookup to miss; any
            // other status is a connectivity problem.
            status => Err(SetupError::CannotConnect(format!("unexpected status {status}"))),
        }
    }

    async fn fetch_daily(&self, entry: &EntryConfig) -> Result<Snapshot, UpdateFailed> {
        let (latitude, longitude) = Self::coordinates(
            entry,
            UpdateFailed::new("Pirate Weather requires coordinates"),
        )?;

        let response = self
            .request(&entry.api_key, latitude, longitude)
            .await
            .map_err(|err| UpdateFailed::new(format!("request failed: {err}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpdateFailed::new(format!("unexpected status {status}")));
        }

        let parsed: PirateForecastResponse = response
            .json()
            .await
            .map_err(|err| UpdateFailed::new(format!("invalid payload: {err}")))?;

        if parsed.daily.data.is_empty() {
            return Err(UpdateFailed::new("payload contained no daily data"));
        }

        Ok(Snapshot::PirateWeather(parsed))
    }
}

// Response schema, limited to the daily block the sensors read.

#[derive(Debug, Clone, Deserialize)]
pub struct PirateForecastResponse {
    #[serde(default)]
    pub daily: PirateDaily,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PirateDaily {
    #[serde(default)]
    pub data: Vec<PirateDayForecast>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PirateDayForecast {
    pub summary: Option<String>,
    #[serde(rename = "apparentTemperatureHigh")]
    pub apparent_temperature_high: Option<f64>,
}
