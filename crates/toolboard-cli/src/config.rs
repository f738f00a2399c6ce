//! CLI configuration.

use crate::render::OutputFormat;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use toolboard_core::DescribeLimits;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Default output format for `render` and `watch`.
    #[serde(default)]
    pub format: OutputFormat,
    /// Quiet period after a snapshot change before re-rendering.
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
    /// Context truncation limits for descriptions.
    #[serde(default)]
    pub limits: DescribeLimits,
}

fn default_watch_debounce_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            watch_debounce_ms: default_watch_debounce_ms(),
            limits: DescribeLimits::default(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Load config from the user config directory, or fall back to defaults.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }
}

/// `<config_dir>/toolboard/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("toolboard").join("config.toml"))
}
