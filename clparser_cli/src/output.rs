//! Rendering of batch results for the terminal and for JSON consumers

use clap::ValueEnum;
use clparser::{BatchResults, LineOutcome, ParseMetrics};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Render one token as `[tok]`
///
/// Control characters and `\` use Rust escape syntax and `]` becomes `\]`,
/// so distinct tokens never render the same.
pub fn render_token(token: &str) -> String {
    let mut rendered = String::with_capacity(token.len() + 2);
    rendered.push('[');
    for ch in token.chars() {
        match ch {
            ']' => rendered.push_str("\\]"),
            '\\' => rendered.push_str("\\\\"),
            c if c.is_control() => rendered.extend(c.escape_default()),
            c => rendered.push(c),
        }
    }
    rendered.push(']');
    rendered
}

pub fn render_tokens(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| render_token(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Message printed to stderr for a line that failed to tokenize
pub fn render_failure(outcome: &LineOutcome) -> Option<String> {
    match &outcome.result {
        Ok(_) => None,
        Err(err) => Some(format!(
            "line {}: {} ({})",
            outcome.line_number,
            err,
            err.error_code()
        )),
    }
}

/// Plain output: stdout lines for successes, stderr lines for failures
pub fn render_plain(results: &BatchResults) -> (Vec<String>, Vec<String>) {
    let mut stdout = Vec::with_capacity(results.outcomes.len());
    let mut stderr = Vec::new();

    for outcome in &results.outcomes {
        match &outcome.result {
            Ok(tokens) => stdout.push(render_tokens(tokens)),
            Err(_) => stderr.extend(render_failure(outcome)),
        }
    }

    (stdout, stderr)
}

#[derive(Debug, Serialize)]
struct JsonError {
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    line: usize,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
}

impl<'a> From<&'a LineOutcome> for JsonLine<'a> {
    fn from(outcome: &'a LineOutcome) -> Self {
        let (tokens, error) = match &outcome.result {
            Ok(tokens) => (Some(tokens.as_slice()), None),
            Err(err) => (
                None,
                Some(JsonError {
                    code: err.error_code().to_string(),
                    message: err.to_string(),
                }),
            ),
        };

        Self {
            line: outcome.line_number,
            input: &outcome.input,
            tokens,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonStats {
    lines: usize,
    successful: usize,
    failed: usize,
    skipped: usize,
    success_rate: f64,
    stopped_early: bool,
    metrics: ParseMetrics,
}

impl From<&BatchResults> for JsonStats {
    fn from(results: &BatchResults) -> Self {
        Self {
            lines: results.lines_processed(),
            successful: results.success_count(),
            failed: results.failure_count(),
            skipped: results.lines_skipped,
            success_rate: results.success_rate(),
            stopped_early: results.stopped_early,
            metrics: results.metrics,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    results: Vec<JsonLine<'a>>,
    stats: JsonStats,
}

/// JSON output: a bare array of lines, or `{results, stats}` with stats
pub fn render_json(results: &BatchResults, with_stats: bool) -> serde_json::Result<String> {
    let lines: Vec<JsonLine> = results.outcomes.iter().map(JsonLine::from).collect();

    if with_stats {
        serde_json::to_string_pretty(&JsonReport {
            results: lines,
            stats: JsonStats::from(results),
        })
    } else {
        serde_json::to_string_pretty(&lines)
    }
}
