//! Logging configuration and initialization.
//!
//! This module provides structured logging with:
//! - Multiple presets (production, verbose, debug, trace, quiet)
//! - Per-target level overrides via CLI flags
//! - JSON output format for log aggregation
//! - Environment variable fallback (RUST_LOG)
//!
//! Logs go to stderr so rendered output on stdout stays pipeable.

use std::collections::BTreeMap;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

/// Logging preset levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Production: warnings, plus startup and watch notices
    #[default]
    Production,
    /// Verbose: more operational detail
    Verbose,
    /// Debug: per-pass summaries
    Debug,
    /// Trace: everything including per-record decisions
    Trace,
    /// Quiet: errors only
    Quiet,
}

/// Logging configuration built from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Base preset to use
    pub preset: LogPreset,
    /// Per-target level overrides (e.g., "toolboard::reconcile" -> DEBUG)
    pub overrides: BTreeMap<String, Level>,
    /// Output format
    pub format: LogFormat,
}

impl LogConfig {
    /// Create a new LogConfig from CLI arguments.
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let preset = if quiet {
            LogPreset::Quiet
        } else if trace {
            LogPreset::Trace
        } else if debug {
            LogPreset::Debug
        } else if verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Production
        };

        // "target=level" or "a=level,b=level"
        let mut overrides = BTreeMap::new();
        for override_str in log_overrides {
            for part in override_str.split(',') {
                if let Some((target, level_str)) = part.split_once('=') {
                    let target = target.trim();
                    if target.is_empty() {
                        continue;
                    }

                    // "reconcile" -> "toolboard::reconcile"
                    let full_target = if target == "toolboard" || target.starts_with("toolboard::") {
                        target.to_string()
                    } else {
                        format!("toolboard::{}", target)
                    };

                    // Level parsing is case-insensitive and accepts 1-5 as well.
                    if let Ok(level) = level_str.trim().parse::<Level>() {
                        overrides.insert(full_target, level);
                    }
                }
            }
        }

        Self {
            preset,
            overrides,
            format,
        }
    }

    /// Filter directives for the preset plus overrides.
    pub fn directives(&self) -> Vec<String> {
        let mut directives: Vec<String> = match self.preset {
            LogPreset::Production => vec![
                "warn".into(),
                "toolboard::startup=info".into(),
                "toolboard::watch=info".into(),
                "toolboard::cli=info".into(),
                "toolboard::reconcile=warn".into(),
                "toolboard::describe=warn".into(),
            ],
            LogPreset::Verbose => vec!["warn".into(), "toolboard=info".into()],
            LogPreset::Debug => vec!["warn".into(), "toolboard=debug".into()],
            LogPreset::Trace => vec!["info".into(), "toolboard=trace".into()],
            LogPreset::Quiet => vec!["error".into(), "toolboard=error".into()],
        };

        for (target, level) in &self.overrides {
            directives.push(format!("{}={}", target, level.as_str().to_lowercase()));
        }
        directives
    }

    /// Build an EnvFilter from this configuration.
    pub fn build_filter(&self) -> EnvFilter {
        // RUST_LOG wins over presets and flags
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }

        let filter_str = self.directives().join(",");
        EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Initialize the tracing subscriber with the given configuration.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }
}
