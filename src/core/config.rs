//! Configuration management for Memory Index
//!
//! This module handles all configuration settings with sensible defaults.
//! Every section is optional in the TOML file; missing keys fall back to
//! [`Default`].

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file looked up by [`IndexConfig::load`]
pub const DEFAULT_CONFIG_FILE: &str = "memory-index.toml";

/// Default resolution of the non-unique cardinality sampler
pub const DEFAULT_SAMPLE_BUFFER_SIZE: usize = 1000;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Cardinality sampling
    pub sampling: SamplingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics and monitoring
    pub metrics: MetricsConfig,
}

/// Sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Distinct values held by the non-unique sampler before it folds a step
    pub buffer_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact)
    pub format: String,
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Count index operations in Prometheus counters
    pub enabled: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { buffer_size: DEFAULT_SAMPLE_BUFFER_SIZE }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl IndexConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> Result<Self> {
        let mut config = IndexConfig::default();

        // Try to load from config file first
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            config = Self::from_file(DEFAULT_CONFIG_FILE)?;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(size) = lookup("MI_SAMPLE_BUFFER_SIZE") {
            self.sampling.buffer_size = size
                .parse()
                .map_err(|e| Error::config(format!("Invalid sample buffer size: {}", e)))?;
        }

        if let Some(level) = lookup("MI_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("MI_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Some(enabled) = lookup("MI_METRICS_ENABLED") {
            self.metrics.enabled = enabled
                .parse()
                .map_err(|e| Error::config(format!("Invalid metrics flag: {}", e)))?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sampling.buffer_size == 0 {
            return Err(Error::config("Sample buffer size must be at least 1"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => return Err(Error::config("Invalid log format")),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = IndexConfig::default();
        assert_eq!(config.sampling.buffer_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = IndexConfig::from_toml_str("[sampling]\nbuffer_size = 64\n").unwrap();
        assert_eq!(config.sampling.buffer_size, 64);
        assert_eq!(config.logging, LoggingConfig::default());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"\nformat = \"compact\"").unwrap();
        let config = IndexConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(IndexConfig::from_toml_str("[sampling]\nbuffer_size = 0\n").is_err());
        assert!(IndexConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").is_err());
        assert!(IndexConfig::from_toml_str("sampling = 3").is_err());
        assert!(IndexConfig::from_file("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("MI_SAMPLE_BUFFER_SIZE", "10"),
            ("MI_LOG_LEVEL", "warn"),
            ("MI_METRICS_ENABLED", "false"),
        ]
        .into_iter()
        .collect();
        let mut config = IndexConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.sampling.buffer_size, 10);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.metrics.enabled);

        let mut config = IndexConfig::default();
        let bad = config.apply_overrides(|k| (k == "MI_SAMPLE_BUFFER_SIZE").then(|| "lots".to_string()));
        assert!(matches!(bad, Err(Error::Config(_))));
    }
}
