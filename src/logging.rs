// src/logging.rs

//! Logging setup for `orgtangle` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--verbose` CLI flag (if provided)
//! 2. `ORGTANGLE_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! The log destination follows `--logfile`: stderr when absent, stdout for
//! `-`, otherwise the named file (appended).

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(verbose: bool, logfile: Option<&str>) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        std::env::var("ORGTANGLE_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO)
    };

    let writer = match logfile {
        None => BoxMakeWriter::new(io::stderr),
        Some("-") => BoxMakeWriter::new(io::stdout),
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file at {path:?}"))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    // `init()` does not return a Result, so this cannot fail at runtime
    // (if called more than once, it will panic; we only call once in main).
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(writer)
        .init();

    Ok(())
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
