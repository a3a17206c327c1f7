//! Settings resolution and URL construction.
//!
//! Settings are layered: a flag or environment variable wins over the YAML
//! settings file, which wins over the built-in defaults. Resolved settings
//! are turned into one [`FetchRequest`] per resource in [`Endpoints`].
//!
//! # Settings file
//!
//! ```yaml
//! weather_url: https://api.open-meteo.com/v1/forecast
//! latitude: 52.52
//! longitude: 13.41
//! news_url: https://newsapi.org/v2/top-headlines
//! country: us
//! news_api_key: YOUR_KEY
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::cli::Cli;
use crate::fetcher::FetchRequest;
use crate::orchestrator::Resource;

/// Header carrying the news API key. The key never goes in the query string.
pub const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid {resource} URL: {source}")]
    Url {
        resource: Resource,
        source: url::ParseError,
    },
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub weather_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub news_url: String,
    pub country: String,
    pub news_api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            latitude: 52.52,
            longitude: 13.41,
            news_url: "https://newsapi.org/v2/top-headlines".to_string(),
            country: "us".to_string(),
            news_api_key: None,
        }
    }
}

impl Settings {
    /// Load a settings file. Keys it leaves out keep their defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Layer command-line values over the settings file (if any) over defaults.
    #[instrument(level = "debug", skip_all)]
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut settings = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = &cli.weather_url {
            settings.weather_url = url.clone();
        }
        if let Some(latitude) = cli.latitude {
            settings.latitude = latitude;
        }
        if let Some(longitude) = cli.longitude {
            settings.longitude = longitude;
        }
        if let Some(url) = &cli.news_url {
            settings.news_url = url.clone();
        }
        if let Some(country) = &cli.country {
            settings.country = country.clone();
        }
        if cli.news_api_key.is_some() {
            settings.news_api_key = cli.news_api_key.clone();
        }

        debug!(
            weather_url = %settings.weather_url,
            news_url = %settings.news_url,
            has_api_key = settings.news_api_key.is_some(),
            "Resolved settings"
        );
        Ok(settings)
    }
}

/// The request for each resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub weather: FetchRequest,
    pub news: FetchRequest,
}

impl Endpoints {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let weather = Url::parse_with_params(
            &settings.weather_url,
            [
                ("latitude", settings.latitude.to_string()),
                ("longitude", settings.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ],
        )
        .map_err(|source| ConfigError::Url {
            resource: Resource::Weather,
            source,
        })?;

        let news = Url::parse_with_params(&settings.news_url, [("country", &settings.country)])
            .map_err(|source| ConfigError::Url {
                resource: Resource::News,
                source,
            })?;

        let mut news = FetchRequest::new(news);
        if let Some(key) = &settings.news_api_key {
            news = news.with_header(API_KEY_HEADER, key);
        }

        Ok(Self {
            weather: FetchRequest::new(weather),
            news,
        })
    }

    pub fn request(&self, resource: Resource) -> &FetchRequest {
        match resource {
            Resource::Weather => &self.weather,
            Resource::News => &self.news,
        }
    }
}
