//! Typed configuration from environment variables or a TOML file.
//!
//! Loads once at startup, fails fast on malformed values.

pub mod queue;

pub use queue::{DEFAULT_MAX_SIZE, QueueConfig};

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub otel_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            otel_endpoint: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let mut queue = QueueConfig::default();
        if let Some(raw) = optional_var("PROCESS_QUEUE_EMPLACE") {
            queue.emplace = parse_bool("PROCESS_QUEUE_EMPLACE", &raw)?;
        }
        if let Some(raw) = optional_var("PROCESS_QUEUE_MAX_SIZE") {
            queue.max_size = parse_max_size("PROCESS_QUEUE_MAX_SIZE", &raw)?;
        }

        Ok(Self {
            queue,
            otel_endpoint: optional_var("OTEL_ENDPOINT"),
            log_level: optional_var("LOG_LEVEL").unwrap_or_else(default_log_level),
        })
    }

    /// Load configuration from a TOML file with an optional `[queue]` table.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("bad config file {}: {e}", path.display())))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

fn parse_max_size(name: &str, raw: &str) -> Result<Option<usize>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unbounded") {
        return Ok(None);
    }
    raw.parse::<usize>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{name} must be an integer or 'unbounded', got '{raw}'")))
}
