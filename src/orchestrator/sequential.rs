//! Sequential orchestration: weather, then news, then a weather refresh.
//!
//! The flow is the [`Stage`] state machine:
//!
//! ```text
//! Idle -> FetchingWeather --ok--> FetchingNews --ok--> RefreshingWeather --any--> Done
//!              |                       |
//!              +--------err------------+----------> Aborted
//! ```
//!
//! A failed weather or news stage renders its error and skips everything
//! after it. The refresh is optional: its failure is rendered locally and the
//! run still ends in [`Stage::Done`], leaving earlier output untouched.
//! Each stage finishes rendering before the next fetch starts.

use futures::{FutureExt, TryFutureExt};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, instrument};

use super::{Resource, on_settle, settled_without_outcome};
use crate::config::Endpoints;
use crate::display::{Sink, error_line, headline_lines, weather_lines};
use crate::fetcher::{Fetch, FetchError, FetchOutcome};

/// Position of a sequential run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    FetchingWeather,
    FetchingNews,
    RefreshingWeather,
    Done,
    Aborted,
}

impl Stage {
    pub fn begin(self) -> Stage {
        match self {
            Stage::Idle => Stage::FetchingWeather,
            other => other,
        }
    }

    /// Transition out of a fetching stage once its outcome is known.
    pub fn on_settled(self, succeeded: bool) -> Stage {
        match (self, succeeded) {
            (Stage::FetchingWeather, true) => Stage::FetchingNews,
            (Stage::FetchingNews, true) => Stage::RefreshingWeather,
            (Stage::FetchingWeather | Stage::FetchingNews, false) => Stage::Aborted,
            (Stage::RefreshingWeather, _) => Stage::Done,
            (other, _) => other,
        }
    }

    /// The resource this stage fetches, if it fetches at all.
    pub fn resource(self) -> Option<Resource> {
        match self {
            Stage::FetchingWeather | Stage::RefreshingWeather => Some(Resource::Weather),
            Stage::FetchingNews => Some(Resource::News),
            Stage::Idle | Stage::Done | Stage::Aborted => None,
        }
    }

    fn error_context(self) -> &'static str {
        match self {
            Stage::RefreshingWeather => "Error refreshing weather",
            Stage::FetchingNews => "Error fetching news",
            _ => "Error fetching weather",
        }
    }
}

/// Render one stage's outcome.
pub fn render_stage<S: Sink>(stage: Stage, outcome: &FetchOutcome, sink: &S) {
    match outcome {
        Ok(payload) => match stage.resource() {
            Some(Resource::News) => sink.emit_all(headline_lines(payload)),
            _ => sink.emit_all(weather_lines(payload)),
        },
        Err(err) => sink.emit(error_line(stage.error_context(), err)),
    }
}

/// Callback style: each stage's fetch runs on its own task and reports back
/// through a oneshot continuation; this strand renders and transitions.
#[instrument(level = "debug", skip_all)]
pub async fn run_callbacks<F, S>(fetcher: &Arc<F>, endpoints: &Endpoints, sink: &S) -> Stage
where
    F: Fetch + 'static,
    S: Sink,
{
    let mut stage = Stage::Idle.begin();
    while let Some(resource) = stage.resource() {
        let (tx, rx) = oneshot::channel();
        let _task = on_settle(fetcher, endpoints.request(resource).clone(), move |outcome| {
            let _ = tx.send(outcome);
        });
        let outcome = rx.await.unwrap_or_else(|_| Err(settled_without_outcome()));

        render_stage(stage, &outcome, sink);
        let next = stage.on_settled(outcome.is_ok());
        debug!(from = ?stage, to = ?next, "Stage transition");
        stage = next;
    }
    stage
}

/// Combinator style: one future chain, each link rendering as it settles.
/// A failed link carries its stage out so the chain settles through
/// [`Stage::on_settled`] like the other drivers.
#[instrument(level = "debug", skip_all)]
pub async fn run_combinators<F, S>(fetcher: &F, endpoints: &Endpoints, sink: &S) -> Stage
where
    F: Fetch,
    S: Sink,
{
    let chain = fetcher
        .fetch(endpoints.weather.clone())
        .inspect(move |outcome| render_stage(Stage::FetchingWeather, outcome, sink))
        .map_err(|e| (Stage::FetchingWeather, e))
        .and_then(move |_| {
            fetcher
                .fetch(endpoints.news.clone())
                .inspect(move |outcome| render_stage(Stage::FetchingNews, outcome, sink))
                .map_err(|e| (Stage::FetchingNews, e))
        })
        .and_then(move |_| {
            fetcher.fetch(endpoints.weather.clone()).map(move |outcome| {
                render_stage(Stage::RefreshingWeather, &outcome, sink);
                Ok::<Stage, (Stage, FetchError)>(Stage::RefreshingWeather.on_settled(outcome.is_ok()))
            })
        });

    let stage = match chain.await {
        Ok(stage) => stage,
        Err((failed, _)) => failed.on_settled(false),
    };
    debug!(?stage, "Chain settled");
    stage
}

/// Async/await style: straight-line code, `?` aborts, a local `match`
/// isolates the refresh.
#[instrument(level = "debug", skip_all)]
pub async fn run_async<F, S>(fetcher: &F, endpoints: &Endpoints, sink: &S) -> Stage
where
    F: Fetch,
    S: Sink,
{
    match stages(fetcher, endpoints, sink).await {
        Ok(stage) => stage,
        Err((failed, err)) => {
            render_stage(failed, &Err(err), sink);
            let stage = failed.on_settled(false);
            debug!(from = ?failed, to = ?stage, "Stage transition");
            stage
        }
    }
}

async fn stages<F, S>(fetcher: &F, endpoints: &Endpoints, sink: &S) -> Result<Stage, (Stage, FetchError)>
where
    F: Fetch,
    S: Sink,
{
    let mut stage = Stage::Idle.begin();
    let weather = fetcher
        .fetch(endpoints.weather.clone())
        .await
        .map_err(|e| (stage, e))?;
    sink.emit_all(weather_lines(&weather));
    stage = stage.on_settled(true);

    let news = fetcher
        .fetch(endpoints.news.clone())
        .await
        .map_err(|e| (stage, e))?;
    sink.emit_all(headline_lines(&news));
    stage = stage.on_settled(true);

    let refreshed = fetcher.fetch(endpoints.weather.clone()).await;
    render_stage(stage, &refreshed, sink);
    Ok(stage.on_settled(refreshed.is_ok()))
}
