//! Logging infrastructure for the extraction pipeline
//!
//! Structured logging uses the `tracing` crate. Every pipeline stage emits
//! spans and events; this module only installs the subscriber.
//!
//! # Usage
//!
//! ```rust
//! use umlscout::core::logging::init_logging;
//!
//! // Initialize with default settings
//! let _ = init_logging(None, None);
//!
//! // Or with custom level and format
//! let _ = init_logging(Some("debug"), Some("pretty"));
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for terminals
//! - `pretty`: Multi-line format with source locations
//! - `json`: JSON lines, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `UMLSCOUT_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `UMLSCOUT_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Standard filter directives, e.g.
//!   `RUST_LOG="info,umlscout::pipeline::members=trace"`

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// * `level` - trace|debug|info|warn|error|off. Falls back to
///   `UMLSCOUT_LOG_LEVEL`, then `RUST_LOG`, then `info`.
/// * `format` - compact|pretty|json. Falls back to `UMLSCOUT_LOG_FORMAT`,
///   then `compact`.
///
/// Returns an error for an unknown format or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = level
        .map(|s| s.to_string())
        .or_else(|| std::env::var("UMLSCOUT_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    let log_format = format
        .map(|s| s.to_string())
        .or_else(|| std::env::var("UMLSCOUT_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string());

    // Validate the format before touching the global subscriber
    let format =
        LogFormat::from_str(&log_format).map_err(|e| format!("Invalid log format: {}", e))?;

    let filter = if log_level == "off" {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so diagram text on stdout stays clean
    match format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_level(true)
                        .with_file(false)
                        .with_line_number(false)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .json(),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
