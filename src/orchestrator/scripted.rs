//! In-memory [`Fetch`] double: per-URL queues of delayed outcomes plus call counters.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::Endpoints;
use crate::fetcher::{Fetch, FetchError, FetchOutcome, FetchRequest};

pub(crate) const WEATHER_URL: &str = "https://weather.test/v1/forecast?current_weather=true";
pub(crate) const NEWS_URL: &str = "https://news.test/v2/top-headlines?country=us";

pub(crate) fn endpoints() -> Endpoints {
    Endpoints {
        weather: FetchRequest::new(WEATHER_URL),
        news: FetchRequest::new(NEWS_URL).with_header("X-Api-Key", "test-key"),
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    script: Mutex<HashMap<String, VecDeque<(Duration, FetchOutcome)>>>,
    calls: Mutex<HashMap<String, usize>>,
    settled: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next call to `url`, settling after `delay`.
    pub(crate) fn respond(self, url: &str, delay: Duration, outcome: FetchOutcome) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back((delay, outcome));
        self
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Fetches for `url` whose delay ran out. A cancelled fetch never counts.
    pub(crate) fn settled(&self, url: &str) -> usize {
        self.settled.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

impl Fetch for ScriptedFetcher {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = FetchOutcome> + Send {
        *self.calls.lock().unwrap().entry(request.url.clone()).or_default() += 1;
        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front);

        async move {
            match next {
                Some((delay, outcome)) => {
                    tokio::time::sleep(delay).await;
                    *self.settled.lock().unwrap().entry(request.url).or_default() += 1;
                    outcome
                }
                None => Err(FetchError::Transport(format!(
                    "no scripted response for {}",
                    request.url
                ))),
            }
        }
    }
}
