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

const DEFAULT_ENDPOINT: &str = "http://dataservice.accuweather.com/forecasts/v1/daily/5day";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// 5-day daily forecast client for the AccuWeather data service.
///
/// `GET {endpoint}/{location_key}?apikey=..&details=true&metric=true`
#[derive(Debug, Clone)]
pub struct AccuWeatherProvider {
    endpoint: String,
    timeout: Duration,
    http: Client,
}

impl Default for AccuWeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AccuWeatherProvider {
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

    fn location_key<'a, E>(entry: &'a EntryConfig, err: E) -> Result<&'a str, E> {
        match &entry.location {
            Location::Key(key) => Ok(key),
            Location::Coordinates { .. } => Err(err),
        }
    }

    async fn request(&self, api_key: &str, location_key: &str) -> reqwest::Result<reqwest::Response> {
        let url = format!("{}/{}", self.endpoint, location_key);
        debug!(%url, "requesting AccuWeather daily forecast");

        self.http
            .get(&url)
            .query(&[("apikey", api_key), ("details", "true"), ("metric", "true")])
            .timeout(self.timeout)
            .send()
            .await
    }
}

#[async_trait]
impl ForecastProvider for AccuWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::AccuWeather
    }

    async fn probe(&self, entry: &EntryConfig) -> Result<(), SetupError> {
        let location_key = Self::location_key(
            entry,
            SetupError::CannotConnect("AccuWeather requires a location key".into()),
        )?;

        let response = self
            .request(&entry.api_key, location_key)
            .await
            .map_err(|err| SetupError::CannotConnect(err.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SetupError::InvalidAuth),
            StatusCode::NOT_FOUND => Err(SetupError::InvalidLocation),
            status => Err(SetupError::CannotConnect(format!("unexpected status {status}"))),
        }
    }

    async fn fetch_daily(&self, entry: &EntryConfig) -> Result<Snapshot, UpdateFailed> {
        let location_key = Self::location_key(
            entry,
            UpdateFailed::new("AccuWeather requires a location key"),
        )?;

        let response = self
            .request(&entry.api_key, location_key)
            .await
            .map_err(|err| UpdateFailed::new(format!("request failed: {err}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpdateFailed::new(format!("unexpected status {status}")));
        }

        let parsed: AccuDailyResponse = response
            .json()
            .await
            .map_err(|err| UpdateFailed::new(format!("invalid payload: {err}")))?;

        if parsed.daily_forecasts.is_empty() {
            return Err(UpdateFailed::new("payload contained no daily forecasts"));
        }

        Ok(Snapshot::AccuWeather(parsed))
    }
}

// Response schema, limited to the fields the sensors expose. Everything below
// the top-level array is optional so partial payloads degrade to `None`
// instead of failing the whole poll.

#[derive(Debug, Clone, Deserialize)]
pub struct AccuDailyResponse {
    #[serde(rename = "DailyForecasts", default)]
    pub daily_forecasts: Vec<AccuDayForecast>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccuDayForecast {
    #[serde(rename = "Day")]
    pub day: Option<AccuDayPart>,
    #[serde(rename = "Night")]
    pub night: Option<AccuDayPart>,
    #[serde(rename = "RealFeelTemperature")]
    pub real_feel_temperature: Option<AccuRealFeel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccuDayPart {
    #[serde(rename = "LongPhrase")]
    pub long_phrase: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccuRealFeel {
    #[serde(rename = "Maximum")]
    pub maximum: Option<AccuUnitValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccuUnitValue {
    #[serde(rename = "Value")]
    pub value: Option<f64>,
}
