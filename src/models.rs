//! Logical shapes of the two upstream payloads.
//!
//! The fetch layer treats bodies as opaque JSON; these types give them
//! meaning only at render time. Every field is optional so a partially
//! populated payload still renders:
//! - [`WeatherReport`]: an Open-Meteo style body with a `current_weather` object
//! - [`Article`]: one record of a headline list, bare array or `{"articles": [...]}`
//! - [`Payload`]: shape-based classification used to name a race winner

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A weather reading as returned by the forecast endpoint.
///
/// The reading is "available" only when `current_weather` is present.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherReport {
    #[serde(default)]
    pub current_weather: Option<CurrentWeather>,
}

/// The nested current-conditions object.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct CurrentWeather {
    /// Degrees Celsius.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Kilometres per hour.
    #[serde(default)]
    pub windspeed: Option<f64>,
    /// Observation time in ISO 8601 local form, e.g. `2025-05-06T14:30`.
    #[serde(default)]
    pub time: Option<String>,
}

impl WeatherReport {
    /// Read a report out of an arbitrary payload. Anything that does not
    /// deserialize counts as a report without current conditions.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// A single headline record.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
}

impl Article {
    /// Read the article list out of a payload.
    ///
    /// Accepts a bare array or an object carrying an `articles` array.
    /// Records that are not objects become untitled articles. Returns `None`
    /// when the payload has no article list at all.
    pub fn list_from_value(value: &Value) -> Option<Vec<Article>> {
        let records = match value {
            Value::Array(records) => records,
            Value::Object(map) => map.get("articles")?.as_array()?,
            _ => return None,
        };
        Some(
            records
                .iter()
                .map(|record| serde_json::from_value(record.clone()).unwrap_or_default())
                .collect(),
        )
    }
}

/// What a generically shaped payload turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Weather(WeatherReport),
    Articles(Vec<Article>),
    Unclassified(Value),
}

impl Payload {
    /// Decide by shape alone: a `current_weather` key means weather, an
    /// article list means articles, anything else is unclassified.
    pub fn classify(value: &Value) -> Self {
        if value.get("current_weather").is_some() {
            return Payload::Weather(WeatherReport::from_value(value));
        }
        match Article::list_from_value(value) {
            Some(articles) => Payload::Articles(articles),
            None => Payload::Unclassified(value.clone()),
        }
    }
}
