//! Console rendering of fetched payloads and failures.
//!
//! Every function here is a pure mapping from an already-settled value to
//! [`Line`]s; nothing decides control flow. Lines are handed to a [`Sink`]:
//! [`Console`] prints them (stdout for results, stderr for errors) and
//! [`Transcript`] keeps them in memory.

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde_json::Value;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::fetcher::FetchOutcome;
use crate::models::{Article, Payload, WeatherReport};

/// Which standard stream a line belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// One rendered line of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub stream: Stream,
    pub text: String,
}

impl Line {
    pub fn out(text: impl Into<String>) -> Self {
        Self {
            stream: Stream::Stdout,
            text: text.into(),
        }
    }

    pub fn err(text: impl Into<String>) -> Self {
        Self {
            stream: Stream::Stderr,
            text: text.into(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Destination for rendered lines.
///
/// Takes `&self` so several pending stages of one orchestrator can hold it.
pub trait Sink {
    fn emit(&self, line: Line);

    fn emit_all(&self, lines: Vec<Line>) {
        for line in lines {
            self.emit(line);
        }
    }
}

/// Writes stdout lines to standard output and stderr lines to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Sink for Console {
    fn emit(&self, line: Line) {
        match line.stream {
            Stream::Stdout => println!("{line}"),
            Stream::Stderr => eprintln!("{line}"),
        }
    }
}

/// Records lines in emission order.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Mutex<Vec<Line>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<Line> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Just the text of every line, both streams interleaved.
    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|line| line.text).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.stream == Stream::Stderr)
            .map(|line| line.text)
            .collect()
    }
}

impl Sink for Transcript {
    fn emit(&self, line: Line) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}

pub fn heading(title: &str) -> Line {
    Line::out(format!("== {title} =="))
}

/// Lines for a weather payload. A payload without `current_weather` renders
/// as unavailable.
pub fn weather_lines(value: &Value) -> Vec<Line> {
    report_lines(&WeatherReport::from_value(value))
}

pub fn report_lines(report: &WeatherReport) -> Vec<Line> {
    let Some(current) = &report.current_weather else {
        return vec![Line::out("Weather data unavailable.")];
    };

    let mut lines = vec![
        Line::out(format!("Temperature: {}°C", or_na(current.temperature))),
        Line::out(format!("Wind speed: {} km/h", or_na(current.windspeed))),
    ];
    if let Some(observed) = current.time.as_deref().and_then(parse_observed_at) {
        lines.push(Line::out(format!(
            "Observed at: {}",
            observed.format("%Y-%m-%d %H:%M")
        )));
    }
    lines
}

/// Numbered headline lines for an article payload.
pub fn headline_lines(value: &Value) -> Vec<Line> {
    article_lines(&Article::list_from_value(value).unwrap_or_default())
}

pub fn article_lines(articles: &[Article]) -> Vec<Line> {
    if articles.is_empty() {
        return vec![Line::out("No headlines available.")];
    }

    let mut lines = vec![Line::out("Top headlines:")];
    lines.extend(articles.iter().enumerate().map(|(i, article)| {
        Line::out(format!(
            "{}. {}",
            i + 1,
            article.title.as_deref().unwrap_or("(untitled)")
        ))
    }));
    lines
}

/// An error line naming the operation that failed.
pub fn error_line(context: &str, err: &impl fmt::Display) -> Line {
    Line::err(format!("{context}: {err}"))
}

/// Lines for whichever fetch settled first in a race. The winner is named
/// from the payload shape only.
pub fn race_lines(outcome: &FetchOutcome) -> Vec<Line> {
    let value = match outcome {
        Ok(value) => value,
        Err(err) => return vec![error_line("Race settled on a failure", err)],
    };

    match Payload::classify(value) {
        Payload::Weather(report) => {
            let mut lines = vec![Line::out("First to settle: weather")];
            lines.extend(report_lines(&report));
            lines
        }
        Payload::Articles(articles) => {
            let mut lines = vec![Line::out("First to settle: news")];
            lines.extend(article_lines(&articles));
            lines
        }
        Payload::Unclassified(other) => vec![Line::out(format!(
            "First to settle: unrecognized payload ({})",
            describe_shape(&other)
        ))],
    }
}

fn or_na(reading: Option<f64>) -> String {
    reading.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn parse_observed_at(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn describe_shape(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => "empty object".to_string(),
        Value::Object(map) => format!("keys: {}", map.keys().join(", ")),
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchError;
    use serde_json::json;

    fn texts(lines: Vec<Line>) -> Vec<String> {
        lines.into_iter().map(|line| line.text).collect()
    }

    #[test]
    fn test_weather_lines() {
        let lines = weather_lines(&json!({
            "current_weather": {"temperature": 22, "windspeed": 8.3}
        }));
        assert_eq!(
            texts(lines),
            vec!["Temperature: 22°C", "Wind speed: 8.3 km/h"]
        );
    }

    #[test]
    fn test_weather_lines_with_observation_time() {
        let lines = weather_lines(&json!({
            "current_weather": {"temperature": -1.5, "time": "2025-01-02T07:45"}
        }));
        assert_eq!(
            texts(lines),
            vec![
                "Temperature: -1.5°C",
                "Wind speed: n/a km/h",
                "Observed at: 2025-01-02 07:45"
            ]
        );
    }

    #[test]
    fn test_weather_unavailable() {
        assert_eq!(
            texts(weather_lines(&json!({"error": true}))),
            vec!["Weather data unavailable."]
        );
    }

    #[test]
    fn test_headline_lines() {
        let lines = headline_lines(&json!([{"title": "X"}, {"title": "Y"}, {}]));
        assert_eq!(
            texts(lines),
            vec!["Top headlines:", "1. X", "2. Y", "3. (untitled)"]
        );
    }

    #[test]
    fn test_headlines_empty_is_explicit() {
        assert_eq!(
            texts(headline_lines(&json!([]))),
            vec!["No headlines available."]
        );
        assert_eq!(
            texts(headline_lines(&json!({"articles": []}))),
            vec!["No headlines available."]
        );
    }

    #[test]
    fn test_error_line_goes_to_stderr() {
        let line = error_line(
            "Error fetching news",
            &FetchError::Http {
                status: 401,
                body: "bad key".to_string(),
            },
        );
        assert_eq!(line, Line::err("Error fetching news: status 401: bad key"));
    }

    #[test]
    fn test_race_lines_names_winner_by_shape() {
        let weather = race_lines(&Ok(json!({"current_weather": {"temperature": 3}})));
        assert_eq!(weather[0].text, "First to settle: weather");

        let news = race_lines(&Ok(json!([{"title": "Only"}])));
        assert_eq!(
            texts(news),
            vec!["First to settle: news", "Top headlines:", "1. Only"]
        );
    }

    #[test]
    fn test_classified_payload_renders_like_raw_value() {
        let value = json!({"current_weather": {"temperature": 9, "time": "2025-05-06T08:00"}});
        let Payload::Weather(report) = Payload::classify(&value) else {
            panic!("expected a weather payload");
        };
        assert_eq!(report_lines(&report), weather_lines(&value));
        assert_eq!(
            texts(race_lines(&Ok(value)))[1..],
            [
                "Temperature: 9°C",
                "Wind speed: n/a km/h",
                "Observed at: 2025-05-06 08:00"
            ]
        );

        let articles = vec![Article { title: None }, Article { title: Some("B".into()) }];
        assert_eq!(
            texts(article_lines(&articles)),
            vec!["Top headlines:", "1. (untitled)", "2. B"]
        );
    }

    #[test]
    fn test_race_lines_unclassified() {
        let lines = race_lines(&Ok(json!({"b": 1, "a": 2})));
        assert_eq!(
            texts(lines),
            vec!["First to settle: unrecognized payload (keys: a, b)"]
        );
    }

    #[test]
    fn test_race_lines_failure() {
        let lines = race_lines(&Err(FetchError::Transport("connection reset".to_string())));
        assert_eq!(
            lines,
            vec![Line::err("Race settled on a failure: connection reset")]
        );
    }

    #[test]
    fn test_transcript_records_in_order() {
        let transcript = Transcript::new();
        transcript.emit(Line::out("one"));
        transcript.emit(Line::err("two"));
        assert_eq!(transcript.texts(), vec!["one", "two"]);
        assert_eq!(transcript.errors(), vec!["two"]);
    }
}
