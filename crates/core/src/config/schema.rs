//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCode, Result};

/// Largest number of decimals worth printing for an `f64` degree value.
pub const MAX_PRECISION: usize = 15;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub restore: RestoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.output.precision > MAX_PRECISION {
            return Err(invalid_value(format!(
                "output.precision must be at most {MAX_PRECISION}, got {}",
                self.output.precision
            )));
        }
        if !(self.restore.tolerance.is_finite() && self.restore.tolerance > 0.0) {
            return Err(invalid_value(format!(
                "restore.tolerance must be a positive number, got {}",
                self.restore.tolerance
            )));
        }
        if self.restore.max_iterations == 0 {
            return Err(invalid_value("restore.max_iterations must be at least 1"));
        }
        Ok(())
    }
}

fn invalid_value(message: impl Into<String>) -> Error {
    Error::new(ErrorCode::InvalidConfigValue, message)
        .with_suggestion("Fix the value in your .timejourney.toml or remove it to use the default")
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Decimals printed for degree values
    #[serde(default = "default_precision")]
    pub precision: usize,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            format: OutputFormat::default(),
        }
    }
}

fn default_precision() -> usize {
    6
}

/// Inverse correction (GCJ-02 to WGS84) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreConfig {
    /// Residual below which the iteration stops, in degrees
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> u32 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub show_target: bool,

    #[serde(default)]
    pub show_thread_ids: bool,

    /// Source file and line of each log event
    #[serde(default)]
    pub show_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            show_target: false,
            show_thread_ids: false,
            show_location: false,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let schema = ConfigSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.output.precision, 6);
        assert_eq!(schema.output.format, OutputFormat::Text);
        assert_eq!(schema.restore.max_iterations, 30);
        assert_eq!(schema.logging.level, "warn");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let schema: ConfigSchema = toml::from_str("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(schema.output.format, OutputFormat::Json);
        assert_eq!(schema.output.precision, 6);
        assert_eq!(schema.restore.tolerance, 1e-10);
    }

    #[test]
    fn test_logging_section() {
        let schema: ConfigSchema =
            toml::from_str("[logging]\nlevel = \"debug\"\nshow_thread_ids = true\nshow_location = true\n").unwrap();
        assert_eq!(schema.logging.level, "debug");
        assert!(schema.logging.show_thread_ids);
        assert!(schema.logging.show_location);
        assert!(!schema.logging.show_target);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut schema = ConfigSchema::default();
        schema.output.precision = 20;
        assert_eq!(schema.validate().unwrap_err().code, ErrorCode::InvalidConfigValue);

        let mut schema = ConfigSchema::default();
        schema.restore.tolerance = -1.0;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.restore.max_iterations = 0;
        assert!(schema.validate().is_err());
    }
}
