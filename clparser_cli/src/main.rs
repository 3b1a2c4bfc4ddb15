//! # clparse
//!
//! Tokenizes command lines the way a POSIX shell would split them and prints
//! the resulting argument vectors.

mod output;

use clap::Parser;
use clparser::batch::{tokenize_lines, tokenize_text};
use clparser::config::runtime::LoggingPreferences;
use clparser::logging::{self, codes, LogLevel};
use clparser::{log_error, log_info, BatchConfig, BatchResults, CLParser, RuntimeConfig};
use output::OutputFormat;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "clparse", version, about = "Split command lines into argument tokens")]
struct Cli {
    /// Lines to tokenize; each argument is one command line
    #[arg(value_name = "LINES")]
    lines: Vec<String>,

    /// Read lines from a file instead of stdin
    #[arg(short, long, value_name = "PATH", conflicts_with = "lines")]
    file: Option<PathBuf>,

    /// Decode \n, \t and other C-style escapes inside double quotes
    #[arg(short = 'e', long)]
    backslash_escapes: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// TOML runtime configuration
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Worker threads for multi-line input
    #[arg(short = 'j', long, value_name = "N")]
    threads: Option<usize>,

    /// Stop at the first line that fails to tokenize
    #[arg(long)]
    fail_fast: bool,

    /// Report batch statistics
    #[arg(long)]
    stats: bool,

    /// Enable logging to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const EXIT_PARSE_FAILURE: u8 = 1;
const EXIT_USAGE_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_env_logger(cli.verbose);

    match run(&cli) {
        Ok(results) if results.failure_count() == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_PARSE_FAILURE),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_USAGE_FAILURE)
        }
    }
}

fn init_env_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }
    builder.init();
}

fn logging_preferences(config: &RuntimeConfig, verbose: u8) -> LoggingPreferences {
    let mut preferences = config.logging.clone();
    let requested = match verbose {
        0 => None,
        1 => Some(LogLevel::Info),
        _ => Some(LogLevel::Debug),
    };
    if let Some(level) = requested {
        if level > preferences.min_log_level {
            preferences.min_log_level = level;
        }
    }
    preferences
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path).map_err(|err| {
            let code = err.error_code();
            format!("{} ({})", err, code)
        })?,
        None => RuntimeConfig::default(),
    };

    if cli.backslash_escapes {
        config.parser.backslash_escapes = true;
    }
    if let Some(threads) = cli.threads {
        config.batch.max_threads = threads;
    }
    if cli.fail_fast {
        config.batch.fail_fast = true;
    }

    Ok(config)
}

/// Positional arguments are taken as given; blank skipping only thins out
/// file and stdin input.
fn batch_config_for(cli: &Cli, config: &RuntimeConfig) -> BatchConfig {
    let mut batch_config = BatchConfig::from(config);
    if !cli.lines.is_empty() {
        batch_config.skip_blank_lines = false;
    }
    batch_config
}

fn read_input_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path).map_err(|err| {
        let code = codes::input::INPUT_UNREADABLE;
        log_error!(code, "Cannot read input file", "path" => path.display());
        format!("cannot read {}: {} ({})", path.display(), err, code).into()
    })
}

fn run(cli: &Cli) -> Result<BatchResults, Box<dyn std::error::Error>> {
    let config = load_config(cli)?;

    logging::config::init_runtime_preferences(logging_preferences(&config, cli.verbose))?;
    logging::init_global_logging()?;
    log::debug!("{}", logging::get_system_diagnostics());
    log_info!("clparse starting",
        "backslash_escapes" => config.parser.backslash_escapes,
        "max_threads" => config.batch.max_threads
    );

    let parser = CLParser::with_preferences(&config.parser);
    let batch_config = batch_config_for(cli, &config);

    let results = if !cli.lines.is_empty() {
        tokenize_lines(&parser, &cli.lines[..], &batch_config)
    } else if let Some(path) = &cli.file {
        let text = read_input_file(path)?;
        tokenize_text(&parser, &text, &batch_config)
    } else {
        let text = io::read_to_string(io::stdin())?;
        tokenize_text(&parser, &text, &batch_config)
    };

    emit(cli, &results)?;
    Ok(results)
}

fn emit(cli: &Cli, results: &BatchResults) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.format {
        OutputFormat::Plain => {
            let (lines, failures) = output::render_plain(results);
            for line in lines {
                writeln!(out, "{}", line)?;
            }
            for failure in failures {
                eprintln!("{}", failure);
            }
            if cli.stats {
                eprintln!("{}", results.summary());
            }
        }
        OutputFormat::Json => {
            let json = output::render_json(results, cli.stats)?;
            writeln!(out, "{}", json)?;
        }
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "clparse", "-e", "-j", "3", "--fail-fast", "--format", "json", "-vv", "a b",
        ])
        .unwrap();

        assert!(cli.backslash_escapes);
        assert_eq!(cli.threads, Some(3));
        assert!(cli.fail_fast);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.lines, vec!["a b"]);
    }

    #[test]
    fn test_file_conflicts_with_lines() {
        assert!(Cli::try_parse_from(["clparse", "-f", "in.txt", "a"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clparse.toml");
        std::fs::write(&path, "[batch]\nmax_threads = 8\n[parser]\nbackslash_escapes = false\n")
            .unwrap();

        let cli = Cli::try_parse_from([
            "clparse",
            "-c",
            path.to_str().unwrap(),
            "-e",
            "-j",
            "1",
            "x",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert!(config.parser.backslash_escapes);
        assert_eq!(config.batch.max_threads, 1);
    }

    #[test]
    fn test_missing_config_reports_code() {
        let cli = Cli::try_parse_from(["clparse", "-c", "/nonexistent/clparse.toml", "x"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("CFG001"));
    }

    #[test]
    fn test_verbosity_raises_library_level() {
        let mut config = RuntimeConfig::default();
        config.logging.min_log_level = LogLevel::Error;

        assert_eq!(logging_preferences(&config, 0).min_log_level, LogLevel::Error);
        assert_eq!(logging_preferences(&config, 1).min_log_level, LogLevel::Info);
        assert_eq!(logging_preferences(&config, 2).min_log_level, LogLevel::Debug);

        config.logging.min_log_level = LogLevel::Debug;
        assert_eq!(logging_preferences(&config, 1).min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_positional_blank_lines_are_kept() {
        let config = RuntimeConfig::default();

        let cli = Cli::try_parse_from(["clparse", "a", ""]).unwrap();
        assert!(!batch_config_for(&cli, &config).skip_blank_lines);

        let cli = Cli::try_parse_from(["clparse", "-f", "input.txt"]).unwrap();
        assert_eq!(
            batch_config_for(&cli, &config).skip_blank_lines,
            config.batch.skip_blank_lines
        );
    }

    #[test]
    fn test_unreadable_input_reports_input_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input_file(&dir.path().join("missing.txt")).unwrap_err();

        assert!(err.to_string().contains("missing.txt"));
        assert!(err.to_string().contains("IN001"));
    }
}
