//! # Logging & Tracing Infrastructure
//!
//! Configures the global `tracing` subscriber for hosts of the decode crates:
//! - Pretty, JSON and compact output formats
//! - A default filter covering every workspace crate, with symphonia kept at `warn`
//! - Custom `EnvFilter` directives
//! - Optional span enter/exit events
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = LoggingConfig::default()
//!         .with_format(LogFormat::Pretty)
//!         .with_level(LogLevel::Debug);
//!
//!     init_logging(config).expect("Failed to initialize logging");
//!
//!     tracing::info!("Decoder started");
//! }
//! ```
//!
//! `LoggingConfig` is serde-enabled, so it can be embedded in a host's own
//! configuration file; missing fields take their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use tracing_subscriber::{
    filter::EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Workspace crates that log at the configured level by default.
const WORKSPACE_TARGETS: &[&str] = &["mp3_fastdecode", "core_mpeg", "core_decode", "core_runtime"];

/// Dependencies kept quiet unless a custom filter says otherwise.
const QUIET_TARGETS: &[&str] = &["symphonia_core", "symphonia_bundle_mp3", "symphonia"];

/// Minimum severity of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive spelling used by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Minimum log level for workspace crates
    pub level: LogLevel,
    /// Custom filter string (e.g., "core_mpeg=trace,core_decode=debug").
    /// Replaces the default filter entirely.
    pub filter: Option<String>,
    /// Emit span enter/exit events
    pub enable_spans: bool,
    /// Display target module in logs
    pub display_target: bool,
    /// Display thread info
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            enable_spans: false,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    /// Thread ids and names are useful when following decode workers.
    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Install the global subscriber described by `config`.
///
/// Call once during startup.
///
/// # Errors
///
/// - [`Error::Config`] if the filter string is invalid
/// - [`Error::AlreadyInitialized`] if a global subscriber is already set
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_span_events(span_events)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(config.enable_spans)
                    .with_span_list(config.enable_spans)
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.display_target)
                    .with_thread_ids(config.display_thread_info)
                    .with_thread_names(config.display_thread_info)
                    .with_span_events(span_events)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| Error::AlreadyInitialized(e.to_string()))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = match &config.filter {
        Some(custom) => custom.clone(),
        None => default_directives(config.level),
    };

    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", directives, e)))
}

/// Workspace crates at `level`, symphonia at `warn`, everything else at `warn`.
fn default_directives(level: LogLevel) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(WORKSPACE_TARGETS.iter().map(|t| format!("{}={}", t, level)));
    directives.extend(
        QUIET_TARGETS
            .iter()
            .map(|t| format!("{}={}", t, level.max(LogLevel::Warn))),
    );
    directives.join(",")
}

/// Strip full file paths to basename only
///
/// ```
/// use core_runtime::logging::strip_path;
///
/// assert_eq!(strip_path("/home/user/music/track.mp3"), "track.mp3");
/// ```
pub fn strip_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_level(LogLevel::Debug)
            .with_filter("core_decode=trace")
            .with_spans(true)
            .with_target(false)
            .with_thread_info(true);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.filter.as_deref(), Some("core_decode=trace"));
        assert!(config.enable_spans);
        assert!(!config.display_target);
        assert!(config.display_thread_info);
    }

    #[test]
    fn test_default_format() {
        #[cfg(debug_assertions)]
        assert_eq!(LogFormat::default(), LogFormat::Pretty);

        #[cfg(not(debug_assertions))]
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }

    #[test]
    fn test_default_directives() {
        let directives = default_directives(LogLevel::Debug);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("core_mpeg=debug"));
        assert!(directives.contains("core_decode=debug"));
        assert!(directives.contains("symphonia_core=warn"));

        // quiet targets never log below warn, but follow stricter levels
        let directives = default_directives(LogLevel::Error);
        assert!(directives.contains("symphonia_bundle_mp3=error"));
    }

    #[test]
    fn test_build_filter() {
        let filter = build_filter(&LoggingConfig::default().with_level(LogLevel::Trace)).unwrap();
        assert!(filter.to_string().contains("core_decode=trace"));

        let filter = build_filter(&LoggingConfig::default().with_filter("core_mpeg=trace")).unwrap();
        assert!(filter.to_string().contains("core_mpeg=trace"));
    }

    #[test]
    fn test_invalid_filter() {
        let config = LoggingConfig::default().with_filter("core_mpeg=notalevel");
        assert!(matches!(build_filter(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_level_ordering_and_conversion() {
        assert!(LogLevel::Trace < LogLevel::Error);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(LogLevel::Info.to_string(), "info");
    }

    #[test]
    fn test_strip_path() {
        assert_eq!(strip_path("/home/user/music/song.mp3"), "song.mp3");
        assert_eq!(strip_path("C:\\Users\\John\\Music\\song.mp3"), "song.mp3");
        assert_eq!(strip_path("song.mp3"), "song.mp3");
        assert_eq!(strip_path("/var/log/"), "");
    }
}
