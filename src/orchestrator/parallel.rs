//! Parallel-all orchestration: weather and news fetched concurrently, joined
//! into a `(weather, news)` pair.
//!
//! The pair is always in request order, whichever fetch settles first. The
//! first failure observed fails the whole join immediately and the sibling
//! still in flight is cancelled: the combinator styles drop its future, the
//! callback style aborts its task. A cancelled sibling never renders.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use super::{AbortOnDrop, Resource, StageFailure, on_settle, settled_without_outcome};
use crate::config::Endpoints;
use crate::display::{Sink, error_line, headline_lines, weather_lines};
use crate::fetcher::Fetch;

const ORDER: [Resource; 2] = [Resource::Weather, Resource::News];

/// Both payloads in request order, or the first failure observed.
pub type JoinedPair = Result<(Value, Value), StageFailure>;

/// Callback style: both fetches report into one channel; slots keep request
/// order.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_all_callbacks<F>(fetcher: &Arc<F>, endpoints: &Endpoints) -> JoinedPair
where
    F: Fetch + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _tasks = AbortOnDrop(
        ORDER
            .iter()
            .enumerate()
            .map(|(slot, &resource)| {
                let tx = tx.clone();
                on_settle(fetcher, endpoints.request(resource).clone(), move |outcome| {
                    let _ = tx.send((slot, outcome));
                })
            })
            .collect(),
    );
    drop(tx);

    let mut slots: [Option<Value>; 2] = [None, None];
    while let Some((slot, outcome)) = rx.recv().await {
        debug!(resource = %ORDER[slot], ok = outcome.is_ok(), "Fetch settled");
        match outcome {
            Ok(payload) => slots[slot] = Some(payload),
            Err(err) => return Err(StageFailure::new(ORDER[slot], err)),
        }
        if slots.iter().all(Option::is_some) {
            break;
        }
    }

    match slots {
        [Some(weather), Some(news)] => Ok((weather, news)),
        [None, _] => Err(StageFailure::new(Resource::Weather, settled_without_outcome())),
        [_, None] => Err(StageFailure::new(Resource::News, settled_without_outcome())),
    }
}

/// Combinator style: `future::try_join` over the two fetches.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_all_combinators<F: Fetch>(fetcher: &F, endpoints: &Endpoints) -> JoinedPair {
    use futures::TryFutureExt;

    futures::future::try_join(
        fetcher
            .fetch(endpoints.weather.clone())
            .map_err(|e| StageFailure::new(Resource::Weather, e)),
        fetcher
            .fetch(endpoints.news.clone())
            .map_err(|e| StageFailure::new(Resource::News, e)),
    )
    .await
}

/// Async/await style: `tokio::try_join!` over the two fetches.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_all_async<F: Fetch>(fetcher: &F, endpoints: &Endpoints) -> JoinedPair {
    let weather = async {
        fetcher
            .fetch(endpoints.weather.clone())
            .await
            .map_err(|e| StageFailure::new(Resource::Weather, e))
    };
    let news = async {
        fetcher
            .fetch(endpoints.news.clone())
            .await
            .map_err(|e| StageFailure::new(Resource::News, e))
    };
    tokio::try_join!(weather, news)
}

/// Render a joined pair: weather then headlines, or the single failure.
pub fn render<S: Sink>(pair: &JoinedPair, sink: &S) {
    match pair {
        Ok((weather, news)) => {
            sink.emit_all(weather_lines(weather));
            sink.emit_all(headline_lines(news));
        }
        Err(failure) => sink.emit(error_line(&failure.context(), &failure.error)),
    }
}
