//! The HTTP-GET-then-parse-JSON primitive shared by every orchestration style.
//!
//! A fetch takes a [`FetchRequest`], drains the whole response body, and
//! produces exactly one [`FetchOutcome`]. Failures are classified rather than
//! raised, so callers always get a value to branch on:
//!
//! | Kind | When |
//! |------|------|
//! | [`FetchErrorKind::Transport`] | DNS, connect, reset, or a fault while draining the body |
//! | [`FetchErrorKind::Http`] | Status code >= 400, message carries the full body |
//! | [`FetchErrorKind::Parse`] | Status < 400 but the body is not valid JSON |
//!
//! The [`Fetch`] trait is the seam orchestrators are written against;
//! [`HttpFetcher`] is the `reqwest` implementation.

use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::utils::truncate_for_log;

/// Value of the identifying header sent with every request.
pub const IDENTITY: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A single GET request: the URL plus extra headers merged over the identifying one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute URL, query string included.
    pub url: String,
    /// Extra headers. A key matching the identifying header is ignored.
    pub headers: BTreeMap<String, String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Add a header to the request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Headers actually sent: the identifying header first, then every caller
    /// header whose key does not collide with it.
    pub fn merged_headers(&self) -> Vec<(&str, &str)> {
        let mut merged = vec![(USER_AGENT.as_str(), IDENTITY)];
        merged.extend(
            self.headers
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case(USER_AGENT.as_str()))
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        merged
    }
}

/// Coarse classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Transport,
    Http,
    Parse,
}

/// A classified fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),

    #[error("status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("{0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Http { .. } => FetchErrorKind::Http,
            FetchError::Parse(_) => FetchErrorKind::Parse,
        }
    }

    fn transport(err: &reqwest::Error) -> Self {
        FetchError::Transport(error_chain(err))
    }
}

/// The single result of one fetch: the parsed JSON body or a classified failure.
pub type FetchOutcome = Result<Value, FetchError>;

/// Anything that can turn a [`FetchRequest`] into a [`FetchOutcome`].
///
/// Implementations never panic on network or payload problems; every failure
/// comes back as a [`FetchError`]. The returned future is `Send` so the
/// callback style can run it on a spawned task.
pub trait Fetch: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = FetchOutcome> + Send;
}

/// [`Fetch`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with a fresh HTTP client.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(Client::builder().build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = FetchOutcome> + Send {
        get_json(&self.client, request)
    }
}

#[instrument(level = "debug", skip_all, fields(url = %request.url))]
async fn get_json(client: &Client, request: FetchRequest) -> FetchOutcome {
    let mut builder = client.get(&request.url);
    for (name, value) in request.merged_headers() {
        builder = builder.header(name, value);
    }

    let mut response = builder.send().await.map_err(|e| FetchError::transport(&e))?;
    let status = response.status();

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::transport(&e))? {
        body.extend_from_slice(&chunk);
    }
    debug!(status = status.as_u16(), bytes = body.len(), "Drained response body");

    if status.as_u16() >= 400 {
        let body = String::from_utf8_lossy(&body).into_owned();
        debug!(status = status.as_u16(), body = %truncate_for_log(&body, 200), "HTTP error status");
        return Err(FetchError::Http {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))
}

/// Render an error together with every `source()` below it, joined by `": "`.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
