//! Three orchestration patterns over one fetch primitive, each written in
//! three control-flow styles.
//!
//! | Pattern | Module | Failure semantics |
//! |---------|--------|-------------------|
//! | Sequential | [`sequential`] | A failed stage aborts later stages; the weather refresh is isolated |
//! | Parallel-all | [`parallel`] | First failure wins, the pending sibling is cancelled |
//! | Race | [`race`] | First settlement wins, success or failure; the loser is cancelled |
//!
//! | Style | Mechanism |
//! |-------|-----------|
//! | [`Style::Callbacks`] | [`on_settle`] spawns each fetch and calls back once with its outcome |
//! | [`Style::Combinators`] | `futures` combinators: `and_then`, `try_join`, `select` |
//! | [`Style::AsyncAwait`] | Linear `.await` with `?`, `tokio::try_join!`, `tokio::select!` |
//!
//! All styles render through the same [`crate::display`] functions and must
//! leave identical transcripts for identical outcomes and timings.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::config::Endpoints;
use crate::display::{Sink, heading};
use crate::fetcher::{Fetch, FetchError, FetchOutcome, FetchRequest};

pub mod parallel;
pub mod race;
pub mod sequential;

#[cfg(test)]
pub(crate) mod scripted;

/// How orchestration control flow is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Callbacks,
    Combinators,
    AsyncAwait,
}

/// The logical resource a fetch is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Weather,
    News,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Weather => f.write_str("weather"),
            Resource::News => f.write_str("news"),
        }
    }
}

/// A fetch failure attributed to the resource it was for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{resource}: {error}")]
pub struct StageFailure {
    pub resource: Resource,
    pub error: FetchError,
}

impl StageFailure {
    pub fn new(resource: Resource, error: FetchError) -> Self {
        Self { resource, error }
    }

    /// Context prefix used when rendering this failure.
    pub fn context(&self) -> String {
        format!("Error fetching {}", self.resource)
    }
}

/// Launch `request` on its own task and hand the outcome to `callback`
/// exactly once when it settles.
///
/// Aborting the returned handle before settlement means the callback never
/// runs.
pub fn on_settle<F, C>(fetcher: &Arc<F>, request: FetchRequest, callback: C) -> JoinHandle<()>
where
    F: Fetch + 'static,
    C: FnOnce(FetchOutcome) + Send + 'static,
{
    let fetcher = Arc::clone(fetcher);
    tokio::spawn(async move {
        let outcome = fetcher.fetch(request).await;
        callback(outcome);
    })
}

/// Aborts every held task when dropped.
#[derive(Debug, Default)]
pub(crate) struct AbortOnDrop(pub(crate) Vec<JoinHandle<()>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

pub(crate) fn settled_without_outcome() -> FetchError {
    FetchError::Transport("fetch task ended before settling".to_string())
}

/// Run sequential, then parallel-all, then race, all in one style.
#[instrument(level = "info", skip(fetcher, endpoints, sink))]
pub async fn run_all<F, S>(style: Style, fetcher: Arc<F>, endpoints: &Endpoints, sink: &S)
where
    F: Fetch + 'static,
    S: Sink,
{
    sink.emit(heading("Sequential"));
    let stage = match style {
        Style::Callbacks => sequential::run_callbacks(&fetcher, endpoints, sink).await,
        Style::Combinators => sequential::run_combinators(fetcher.as_ref(), endpoints, sink).await,
        Style::AsyncAwait => sequential::run_async(fetcher.as_ref(), endpoints, sink).await,
    };
    info!(?stage, "Sequential run finished");

    sink.emit(heading("Parallel"));
    let pair = match style {
        Style::Callbacks => parallel::fetch_all_callbacks(&fetcher, endpoints).await,
        Style::Combinators => parallel::fetch_all_combinators(fetcher.as_ref(), endpoints).await,
        Style::AsyncAwait => parallel::fetch_all_async(fetcher.as_ref(), endpoints).await,
    };
    info!(ok = pair.is_ok(), "Parallel run finished");
    parallel::render(&pair, sink);

    sink.emit(heading("Race"));
    let winner = match style {
        Style::Callbacks => race::first_settled_callbacks(&fetcher, endpoints).await,
        Style::Combinators => race::first_settled_combinators(fetcher.as_ref(), endpoints).await,
        Style::AsyncAwait => race::first_settled_async(fetcher.as_ref(), endpoints).await,
    };
    info!(ok = winner.is_ok(), "Race run finished");
    race::render(&winner, sink);
}
