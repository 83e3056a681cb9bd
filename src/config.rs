// src/config.rs

//! Runtime configuration.
//!
//! Settings are read once, on first use of [`CONFIG`], from the JSON file
//! named by the `BYOTTY_CONFIG` environment variable. Every field has a
//! default, so a file only needs the settings it changes. A missing or
//! unreadable file leaves the defaults in place.

use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "BYOTTY_CONFIG";

pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reads the file named by `BYOTTY_CONFIG`, or returns the defaults.
    pub fn load_or_default() -> Config {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Config::default();
        };
        match Config::from_file(Path::new(&path)) {
            Ok(config) => {
                debug!("Config: Loaded {:?}", path);
                config
            }
            Err(e) => {
                warn!("Config: {:#}. Using defaults.", e);
                Config::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Config::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Config> {
        Ok(serde_json::from_str(text)?)
    }
}

// --- Input ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Most bytes returned by one read of the terminal.
    pub read_chunk_size: usize,
    /// Hand back the bytes of an incomplete sequence as they arrive.
    pub report_partial_reads: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            read_chunk_size: 1022,
            report_partial_reads: false,
        }
    }
}

// --- Output ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Used when the OS reports zero rows.
    pub default_rows: u32,
    /// Used when the OS reports zero columns.
    pub default_columns: u32,
    /// End printed lines with CR LF rather than LF alone.
    pub crlf_print: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            default_rows: 24,
            default_columns: 80,
            crlf_print: true,
        }
    }
}

// --- Logging ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            default_filter: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input.read_chunk_size, 1022);
        assert!(!config.input.report_partial_reads);
        assert_eq!(config.output.default_rows, 24);
        assert_eq!(config.output.default_columns, 80);
        assert!(config.output.crlf_print);
        assert_eq!(config.logging.default_filter, "warn");
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config =
            Config::from_json(r#"{ "input": { "report_partial_reads": true } }"#).unwrap();
        assert!(config.input.report_partial_reads);
        assert_eq!(config.input.read_chunk_size, 1022);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::default();
        config.output.crlf_print = false;
        config.logging.default_filter = "byotty=trace".to_string();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_bad_input_is_an_error() {
        assert!(Config::from_json("{ not json").is_err());
        assert!(Config::from_json(r#"{ "input": { "read_chunk_size": "big" } }"#).is_err());
        assert!(Config::from_file(Path::new("/nonexistent/byotty.json")).is_err());
    }
}
