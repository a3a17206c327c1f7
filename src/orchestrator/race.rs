//! Race orchestration: weather and news fetched concurrently; the first to
//! settle, success or failure, is the result.
//!
//! The loser is cancelled the moment the race settles and can never render
//! or surface an error. Fetches are not tagged with their resource, so the
//! winner is named from its payload shape in [`crate::display::race_lines`].

use std::pin::pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use super::{AbortOnDrop, Resource, on_settle, settled_without_outcome};
use crate::config::Endpoints;
use crate::display::{Sink, race_lines};
use crate::fetcher::{Fetch, FetchOutcome};

/// Callback style: both fetches report into one channel; the first message
/// wins and dropping the guard aborts the other task.
#[instrument(level = "debug", skip_all)]
pub async fn first_settled_callbacks<F>(fetcher: &Arc<F>, endpoints: &Endpoints) -> FetchOutcome
where
    F: Fetch + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _tasks = AbortOnDrop(
        [Resource::Weather, Resource::News]
            .into_iter()
            .map(|resource| {
                let tx = tx.clone();
                on_settle(fetcher, endpoints.request(resource).clone(), move |outcome| {
                    let _ = tx.send(outcome);
                })
            })
            .collect(),
    );
    drop(tx);

    let winner = rx.recv().await.unwrap_or_else(|| Err(settled_without_outcome()));
    debug!(ok = winner.is_ok(), "Race settled");
    winner
}

/// Combinator style: `future::select`, the unfinished future is dropped.
#[instrument(level = "debug", skip_all)]
pub async fn first_settled_combinators<F: Fetch>(fetcher: &F, endpoints: &Endpoints) -> FetchOutcome {
    use futures::future::{Either, select};

    let weather = pin!(fetcher.fetch(endpoints.weather.clone()));
    let news = pin!(fetcher.fetch(endpoints.news.clone()));
    let winner = match select(weather, news).await {
        Either::Left((outcome, _)) | Either::Right((outcome, _)) => outcome,
    };
    debug!(ok = winner.is_ok(), "Race settled");
    winner
}

/// Async/await style: `tokio::select!` over the two fetches, polled in
/// request order so a tie goes to weather as in the other styles.
#[instrument(level = "debug", skip_all)]
pub async fn first_settled_async<F: Fetch>(fetcher: &F, endpoints: &Endpoints) -> FetchOutcome {
    let winner = tokio::select! {
        biased;
        outcome = fetcher.fetch(endpoints.weather.clone()) => outcome,
        outcome = fetcher.fetch(endpoints.news.clone()) => outcome,
    };
    debug!(ok = winner.is_ok(), "Race settled");
    winner
}

pub fn render<S: Sink>(winner: &FetchOutcome, sink: &S) {
    sink.emit_all(race_lines(winner));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Transcript;
    use crate::fetcher::FetchError;
    use crate::orchestrator::Style;
    use crate::orchestrator::scripted::{NEWS_URL, ScriptedFetcher, WEATHER_URL, endpoints};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    const STYLES: [Style; 3] = [Style::Callbacks, Style::Combinators, Style::AsyncAwait];

    async fn race(style: Style, fetcher: &Arc<ScriptedFetcher>) -> FetchOutcome {
        let e = endpoints();
        match style {
            Style::Callbacks => first_settled_callbacks(fetcher, &e).await,
            Style::Combinators => first_settled_combinators(fetcher.as_ref(), &e).await,
            Style::AsyncAwait => first_settled_async(fetcher.as_ref(), &e).await,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_earliest_success_wins_and_loser_never_renders() {
        for style in STYLES {
            let fetcher = Arc::new(
                ScriptedFetcher::new()
                    .respond(
                        WEATHER_URL,
                        Duration::from_millis(10),
                        Ok(json!({"current_weather": {"temperature": 22, "windspeed": 8.3}})),
                    )
                    .respond(NEWS_URL, Duration::from_millis(50), Ok(json!([{"title": "Late"}]))),
            );
            let transcript = Transcript::new();
            let started = Instant::now();

            let winner = race(style, &fetcher).await;
            render(&winner, &transcript);
            sleep(Duration::from_millis(100)).await;

            assert!(started.elapsed() < Duration::from_millis(150));
            assert_eq!(
                transcript.texts(),
                vec![
                    "First to settle: weather",
                    "Temperature: 22°C",
                    "Wind speed: 8.3 km/h"
                ],
                "style {style:?}"
            );
            assert!(!transcript.texts().iter().any(|t| t.contains("Late")));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_counts_as_settlement() {
        for style in STYLES {
            let fetcher = Arc::new(
                ScriptedFetcher::new()
                    .respond(
                        WEATHER_URL,
                        Duration::from_millis(5),
                        Err(FetchError::Transport("connection refused".into())),
                    )
                    .respond(NEWS_URL, Duration::from_millis(50), Ok(json!([{"title": "X"}]))),
            );

            let winner = race(style, &fetcher).await;

            assert_eq!(
                winner,
                Err(FetchError::Transport("connection refused".into())),
                "style {style:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_news_can_win() {
        for style in STYLES {
            let fetcher = Arc::new(
                ScriptedFetcher::new()
                    .respond(WEATHER_URL, Duration::from_millis(40), Ok(json!({"current_weather": {}})))
                    .respond(NEWS_URL, Duration::from_millis(20), Ok(json!({"articles": []}))),
            );
            let transcript = Transcript::new();

            render(&race(style, &fetcher).await, &transcript);

            assert_eq!(
                transcript.texts(),
                vec!["First to settle: news", "No headlines available."],
                "style {style:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unclassified_winner_renders() {
        for style in STYLES {
            let fetcher = Arc::new(
                ScriptedFetcher::new()
                    .respond(WEATHER_URL, Duration::from_millis(1), Ok(json!({"reason": "maintenance"})))
                    .respond(NEWS_URL, Duration::from_millis(20), Ok(json!([]))),
            );
            let transcript = Transcript::new();

            render(&race(style, &fetcher).await, &transcript);

            assert_eq!(
                transcript.texts(),
                vec!["First to settle: unrecognized payload (keys: reason)"],
                "style {style:?}"
            );
            assert!(transcript.errors().is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tie_goes_to_weather_in_every_style() {
        for style in STYLES {
            for _ in 0..20 {
                let fetcher = Arc::new(
                    ScriptedFetcher::new()
                        .respond(WEATHER_URL, Duration::from_millis(10), Ok(json!({"current_weather": {}})))
                        .respond(NEWS_URL, Duration::from_millis(10), Ok(json!([]))),
                );

                let winner = race(style, &fetcher).await;

                assert_eq!(winner, Ok(json!({"current_weather": {}})), "style {style:?}");
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_failing_loser_is_cancelled() {
        for style in STYLES {
            let fetcher = Arc::new(
                ScriptedFetcher::new()
                    .respond(
                        WEATHER_URL,
                        Duration::from_millis(10),
                        Ok(json!({"current_weather": {"temperature": 4}})),
                    )
                    .respond(
                        NEWS_URL,
                        Duration::from_millis(50),
                        Err(FetchError::Http {
                            status: 502,
                            body: "bad gateway".into(),
                        }),
                    ),
            );
            let transcript = Transcript::new();

            render(&race(style, &fetcher).await, &transcript);
            sleep(Duration::from_millis(100)).await;

            assert!(transcript.errors().is_empty(), "style {style:?}");
            assert_eq!(transcript.texts()[0], "First to settle: weather");
            assert_eq!(fetcher.calls(NEWS_URL), 1);
            assert_eq!(fetcher.settled(NEWS_URL), 0, "style {style:?}");
        }
    }
}
