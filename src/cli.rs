//! Command-line interface shared by the three binaries.
//!
//! Every option can also come from an environment variable or a YAML
//! settings file; see [`crate::config::Settings::resolve`] for precedence.

use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Defaults: Berlin weather, US headlines
/// weather_news_async --news-api-key YOUR_KEY
///
/// # Another place, settings file for the rest
/// weather_news_callbacks --latitude 48.85 --longitude 2.35 --config ./weather_news.yaml
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, env = "WEATHER_NEWS_CONFIG")]
    pub config: Option<String>,

    /// Forecast endpoint, without query string
    #[arg(long, env = "WEATHER_URL")]
    pub weather_url: Option<String>,

    /// Latitude of the weather reading
    #[arg(long, env = "WEATHER_LATITUDE", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude of the weather reading
    #[arg(long, env = "WEATHER_LONGITUDE", allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Headlines endpoint, without query string
    #[arg(long, env = "NEWS_URL")]
    pub news_url: Option<String>,

    /// Two-letter country code for headlines
    #[arg(long, env = "NEWS_COUNTRY")]
    pub country: Option<String>,

    /// News API key, sent as the X-Api-Key header
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,
}
