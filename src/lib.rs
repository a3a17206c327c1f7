//! # Weather News
//!
//! Fetches a weather reading and a batch of news headlines over HTTPS and
//! renders them to the console, orchestrating the same fetch primitive three
//! ways so their behaviour can be compared side by side.
//!
//! ## Binaries
//!
//! | Binary | Style |
//! |--------|-------|
//! | `weather_news_callbacks` | Spawned fetches reporting through callbacks |
//! | `weather_news_combinators` | `futures` combinators |
//! | `weather_news_async` | Linear async/await |
//!
//! Each binary runs the sequential, parallel-all, and race patterns in turn
//! and prints the same output for the same upstream responses.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... weather_news_async --latitude 52.52 --longitude 13.41
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: [`cli`] and [`config`] resolve settings into [`config::Endpoints`]
//! 2. **Fetching**: [`fetcher`] performs one GET, drains the body, classifies failures, parses JSON
//! 3. **Orchestration**: [`orchestrator`] sequences, joins, or races fetches
//! 4. **Output**: [`display`] turns each settled outcome into console lines

pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod utils;

pub use fetcher::{Fetch, FetchError, FetchErrorKind, FetchOutcome, FetchRequest, HttpFetcher};
pub use orchestrator::Style;
