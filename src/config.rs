//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the file named by `REPLAY_CONFIG`) and
//! deserializes it into strongly-typed structs. Only the input sources
//! and output sinks are configurable; the replay rules are not.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides the config file path.
pub const CONFIG_ENV: &str = "REPLAY_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub player_data: String,
    pub match_data: String,
    /// Fail on the first malformed line instead of skipping it.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub result: String,
    #[serde(default)]
    pub summary_json: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Config path from `REPLAY_CONFIG`, falling back to `config.toml`.
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string())
    }
}
