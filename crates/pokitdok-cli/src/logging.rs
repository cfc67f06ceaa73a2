//! Logging configuration and initialization
//!
//! Logs always go to stderr: stdout carries the JSON responses the CLI prints,
//! and must stay machine-readable.
//!
//! # Example
//!
//! ```no_run
//! use pokitdok_cli::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::from_env(LogConfig::default()).unwrap();
//! init_logging(&config).unwrap();
//! ```

use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Log format (text or JSON)
    pub format: LogFormat,

    /// Additional filter directives (e.g., "pokitdok=debug,reqwest=warn")
    pub filter_directives: Option<String>,

    /// Whether to include file and line number in logs
    pub include_location: bool,

    /// Whether to include target module names in logs
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Text,
            filter_directives: None,
            include_location: false,
            include_targets: true,
        }
    }
}

impl LogConfig {
    /// Apply environment overrides on top of `base`
    ///
    /// Environment variables:
    /// - `LOG_LEVEL`: trace, debug, info, warn, error
    /// - `LOG_FORMAT`: text, json
    /// - `LOG_FILTER`: additional filter directives
    /// - `LOG_INCLUDE_LOCATION`: include file/line in logs (true/false)
    /// - `LOG_INCLUDE_TARGETS`: include module targets (true/false)
    pub fn from_env(base: LogConfig) -> Result<Self> {
        let mut config = base;

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.level = level
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid log level: {}", level))?;
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.format = format.parse()?;
        }

        if let Ok(filter) = std::env::var("LOG_FILTER") {
            config.filter_directives = Some(filter);
        }

        if let Ok(val) = std::env::var("LOG_INCLUDE_LOCATION") {
            config.include_location = val.parse().unwrap_or(false);
        }

        if let Ok(val) = std::env::var("LOG_INCLUDE_TARGETS") {
            config.include_targets = val.parse().unwrap_or(true);
        }

        Ok(config)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    fn filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::from_default_env().add_directive(self.level.into());

        if let Some(ref directives) = self.filter_directives {
            for directive in directives.split(',').filter(|d| !d.trim().is_empty()) {
                filter = filter.add_directive(
                    directive
                        .trim()
                        .parse()
                        .with_context(|| format!("Failed to parse filter directive '{}'", directive))?,
                );
            }
        }

        Ok(filter)
    }
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn include_location(mut self, include: bool) -> Self {
        self.config.include_location = include;
        self
    }

    pub fn include_targets(mut self, include: bool) -> Self {
        self.config.include_targets = include;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Install the global tracing subscriber. Call once, at startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = config.filter()?;

    let layer = subscriber_fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.include_targets)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        },
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .try_init()?;
        },
    }

    Ok(())
}
