//! Shared entry point for the three binaries.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::cli::Cli;
use crate::config::{Endpoints, Settings};
use crate::display::Console;
use crate::fetcher::HttpFetcher;
use crate::orchestrator::{self, Style};

/// Parse arguments, resolve settings, and run every pattern in `style`.
///
/// Only startup problems (bad settings, HTTP client construction) are
/// returned as errors. Fetch failures are rendered and the run still
/// completes successfully.
#[instrument(level = "info")]
pub async fn launch(style: Style) -> Result<(), Box<dyn Error>> {
    crate::utils::init_tracing();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.config, ?args.weather_url, ?args.news_url, "Parsed CLI arguments");

    let settings = Settings::resolve(&args)?;
    let endpoints = Endpoints::from_settings(&settings)?;
    let fetcher = Arc::new(HttpFetcher::new()?);
    info!(?style, weather = %endpoints.weather.url, news = %endpoints.news.url, "weather_news starting up");

    orchestrator::run_all(style, fetcher, &endpoints, &Console).await;

    let elapsed = start_time.elapsed();
    info!(?elapsed, millis = elapsed.as_millis() as u64, "Execution complete");
    Ok(())
}
