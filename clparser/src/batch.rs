//! Batch tokenization of many independent command lines
//!
//! One configured [`CLParser`] is shared by every worker. Lines are numbered
//! from 1 in input order, and results always come back in that order
//! regardless of execution mode.

use crate::config::runtime::{BatchPreferences, ParserPreferences, RuntimeConfig};
use crate::logging::codes;
use crate::tokenizer::{CLParser, ParseError, ParseMetrics};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub fail_fast: bool,
    pub skip_blank_lines: bool,
    pub collect_metrics: bool,
}

impl BatchConfig {
    pub fn from_preferences(batch: &BatchPreferences, parser: &ParserPreferences) -> Self {
        Self {
            max_threads: batch.max_threads.max(1),
            fail_fast: batch.fail_fast,
            skip_blank_lines: batch.skip_blank_lines,
            collect_metrics: parser.collect_metrics,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default(), &ParserPreferences::default())
    }
}

impl From<&RuntimeConfig> for BatchConfig {
    fn from(config: &RuntimeConfig) -> Self {
        Self::from_preferences(&config.batch, &config.parser)
    }
}

/// Result of tokenizing a single line
#[derive(Debug, Clone, PartialEq)]
pub struct LineOutcome {
    /// 1-based position in the original input
    pub line_number: usize,
    pub input: String,
    pub result: Result<Vec<String>, ParseError>,
    pub metrics: Option<ParseMetrics>,
}

impl LineOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub outcomes: Vec<LineOutcome>,
    /// Sum of the metrics of every successful line
    pub metrics: ParseMetrics,
    pub lines_skipped: usize,
    pub stopped_early: bool,
    pub processing_duration: Duration,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.outcomes.len() as f64
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &LineOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    fn push(&mut self, outcome: LineOutcome) {
        if let (Ok(_), Some(metrics)) = (&outcome.result, &outcome.metrics) {
            self.metrics.merge(metrics);
        }
        self.outcomes.push(outcome);
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch tokenization completed: {} lines processed, {} successful ({:.1}%), {} failed, {} skipped{}, {:.2}ms total",
            self.lines_processed(),
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.lines_skipped,
            if self.stopped_early { ", stopped early" } else { "" },
            self.processing_duration.as_secs_f64() * 1000.0
        )
    }
}

// ============================================================================
// LINE SELECTION
// ============================================================================

fn select_lines<'a, S: AsRef<str>>(
    lines: &'a [S],
    config: &BatchConfig,
) -> (Vec<(usize, &'a str)>, usize) {
    let mut selected = Vec::with_capacity(lines.len());
    let mut skipped = 0;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if config.skip_blank_lines && line.trim().is_empty() {
            skipped += 1;
            continue;
        }
        selected.push((index + 1, line));
    }

    (selected, skipped)
}

fn tokenize_one(
    parser: &CLParser,
    line_number: usize,
    input: &str,
    collect_metrics: bool,
) -> LineOutcome {
    let (result, metrics) = match parser.parse_with_metrics(input) {
        Ok((tokens, metrics)) => (Ok(tokens), Some(metrics)),
        Err(err) => (Err(err), None),
    };

    LineOutcome {
        line_number,
        input: input.to_string(),
        result,
        metrics: if collect_metrics { metrics } else { None },
    }
}

fn finish(results: &mut BatchResults, start_time: Instant, mode: &str) {
    results.processing_duration = start_time.elapsed();

    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch tokenization completed",
        "mode" => mode,
        "lines" => results.lines_processed(),
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// EXECUTION MODES
// ============================================================================

/// Tokenize lines one after another, honoring `fail_fast`
pub fn tokenize_lines_sequential<S: AsRef<str>>(
    parser: &CLParser,
    lines: &[S],
    config: &BatchConfig,
) -> BatchResults {
    let start_time = Instant::now();
    let (selected, skipped) = select_lines(lines, config);

    let mut results = BatchResults::new();
    results.lines_skipped = skipped;

    for (line_number, input) in selected.iter().copied() {
        let outcome = tokenize_one(parser, line_number, input, config.collect_metrics);
        let failed = !outcome.is_success();
        results.push(outcome);

        if failed && config.fail_fast {
            crate::log_warning!("Fail-fast mode enabled, stopping batch tokenization",
                "line" => line_number
            );
            results.stopped_early = results.lines_processed() < selected.len();
            break;
        }
    }

    finish(&mut results, start_time, "sequential");
    results
}

/// Tokenize lines on scoped worker threads
///
/// Lines are handed out in rounds of contiguous chunks, one chunk per thread.
/// With `fail_fast` set, no new round starts once a round contains a failure.
pub fn tokenize_lines_parallel<S: AsRef<str> + Sync>(
    parser: &CLParser,
    lines: &[S],
    config: &BatchConfig,
) -> BatchResults {
    let start_time = Instant::now();
    let (selected, skipped) = select_lines(lines, config);
    let threads = config.max_threads.max(1);

    let mut results = BatchResults::new();
    results.lines_skipped = skipped;

    let chunk_size = calculate_chunk_size(selected.len(), threads);
    let round_size = chunk_size * threads;

    crate::log_debug!("Parallel tokenization configuration",
        "total_lines" => selected.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    let mut processed = 0;
    for round in selected.chunks(round_size.max(1)) {
        let round_outcomes = thread::scope(|scope| {
            let handles: Vec<_> = round
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|&(line_number, input)| {
                                tokenize_one(parser, line_number, input, config.collect_metrics)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(outcomes) => outcomes,
                    Err(panic) => {
                        crate::log_error!(
                            codes::system::INTERNAL_ERROR,
                            "Tokenizer worker thread panicked"
                        );
                        std::panic::resume_unwind(panic)
                    }
                })
                .collect::<Vec<_>>()
        });

        processed += round_outcomes.len();
        for outcome in round_outcomes {
            results.push(outcome);
        }

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch tokenization");
            results.stopped_early = processed < selected.len();
            break;
        }
    }

    finish(&mut results, start_time, "parallel");
    results
}

/// Tokenize lines, running sequentially when only one thread is allowed
pub fn tokenize_lines<S: AsRef<str> + Sync>(
    parser: &CLParser,
    lines: &[S],
    config: &BatchConfig,
) -> BatchResults {
    if config.max_threads <= 1 {
        tokenize_lines_sequential(parser, lines, config)
    } else {
        tokenize_lines_parallel(parser, lines, config)
    }
}

/// Split `text` into lines (`\n` or `\r\n`) and tokenize each one
pub fn tokenize_text(parser: &CLParser, text: &str, config: &BatchConfig) -> BatchResults {
    let lines: Vec<&str> = text.lines().collect();
    tokenize_lines(parser, &lines, config)
}

/// Calculate chunk size for parallel processing
fn calculate_chunk_size(line_count: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 256;

    let ideal_chunk_size = line_count.div_ceil(max_threads.max(1));
    ideal_chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}
