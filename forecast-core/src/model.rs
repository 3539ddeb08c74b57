//! Snapshot and sensor-value types shared by the pollers and the sensors.
//!
//! A [`Snapshot`] is the last successfully parsed provider payload. It is a
//! tagged per-provider parse rather than a loose JSON map, so every field a
//! sensor can expose is an explicit optional on a deserialized struct.

use crate::provider::{
    accuweather::AccuDailyResponse, pirateweather::PirateForecastResponse,
};

/// A single exposed value: the exact primitive found at the field path.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Text(String),
    Number(f64),
}

impl SensorValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SensorValue::Text(s) => Some(s),
            SensorValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            SensorValue::Number(n) => Some(*n),
            SensorValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for SensorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorValue::Text(s) => f.write_str(s),
            SensorValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Field selector for a per-day forecast record.
///
/// The first three exist on AccuWeather payloads, the last two on
/// Pirate Weather payloads; asking a snapshot for a field from the other
/// provider simply yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    DayLongPhrase,
    NightLongPhrase,
    RealFeelMax,
    Summary,
    ApparentTemperatureHigh,
}

impl SensorField {
    /// Stable key used in sensor unique ids.
    pub fn key(&self) -> &'static str {
        match self {
            SensorField::DayLongPhrase => "day_long_phrase",
            SensorField::NightLongPhrase => "night_long_phrase",
            SensorField::RealFeelMax => "realfeel_max",
            SensorField::Summary => "summary",
            SensorField::ApparentTemperatureHigh => "apparent_temperature_high",
        }
    }

    /// Human-readable part of the sensor display name.
    pub fn label(&self) -> &'static str {
        match self {
            SensorField::DayLongPhrase => "Day Long Phrase",
            SensorField::NightLongPhrase => "Night Long Phrase",
            SensorField::RealFeelMax => "RealFeel Max",
            SensorField::Summary => "Summary",
            SensorField::ApparentTemperatureHigh => "Apparent Temperature High",
        }
    }

    /// Unit of measurement for numeric fields.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            SensorField::RealFeelMax | SensorField::ApparentTemperatureHigh => Some("°C"),
            _ => None,
        }
    }

    /// Whether the field is a numeric temperature measurement.
    pub fn is_measurement(&self) -> bool {
        self.unit().is_some()
    }
}

/// Last successfully parsed forecast payload, tagged by provider.
///
/// Replaced atomically on each successful poll; sensors only ever read it.
#[derive(Debug, Clone)]
pub enum Snapshot {
    AccuWeather(AccuDailyResponse),
    PirateWeather(PirateForecastResponse),
}

impl Snapshot {
    /// Number of per-day records the payload actually contained.
    pub fn day_count(&self) -> usize {
        match self {
            Snapshot::AccuWeather(r) => r.daily_forecasts.len(),
            Snapshot::PirateWeather(r) => r.daily.data.len(),
        }
    }

    /// Extract one field from the per-day record at `day_index`.
    ///
    /// Returns `None` when the index is out of range, the field is absent in
    /// the payload, or the field belongs to the other provider. Never fails.
    pub fn field(&self, day_index: usize, field: SensorField) -> Option<SensorValue> {
        match self {
            Snapshot::AccuWeather(r) => {
                let day = r.daily_forecasts.get(day_index)?;
                match field {
                    SensorField::DayLongPhrase => {
                        day.day.as_ref()?.long_phrase.clone().map(SensorValue::Text)
                    }
                    SensorField::NightLongPhrase => {
                        day.night.as_ref()?.long_phrase.clone().map(SensorValue::Text)
                    }
                    SensorField::RealFeelMax => day
                        .real_feel_temperature
                        .as_ref()?
                        .maximum
                        .as_ref()?
                        .value
                        .map(SensorValue::Number),
                    _ => None,
                }
            }
            Snapshot::PirateWeather(r) => {
                let day = r.daily.data.get(day_index)?;
                match field {
                    SensorField::Summary => day.summary.clone().map(SensorValue::Text),
                    SensorField::ApparentTemperatureHigh => {
                        day.apparent_temperature_high.map(SensorValue::Number)
                    }
                    _ => None,
                }
            }
        }
    }
}
