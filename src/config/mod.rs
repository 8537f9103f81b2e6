//! Configuration management for ua-export.
//!
//! Configuration comes from a TOML file plus command-line overrides:
//!
//! 1. Command-line arguments (highest)
//! 2. Configuration file (`--config`, or `./ua-export.toml` if present)
//! 3. Default values
//!
//! The loaded [`Config`] is built once at startup and handed by reference
//! to whatever needs it; there is no process-wide configuration singleton.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{ConfigError, Result};
use crate::export::{OutputEncoding, UnmappablePolicy};
use crate::reporting::DimensionFilter;

/// File consulted when no `--config` argument is given.
pub const DEFAULT_CONFIG_FILE: &str = "ua-export.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Analytics property access
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Report query parameters
    #[serde(default)]
    pub report: ReportConfig,

    /// Output file configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which Analytics view to query, and how to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Numeric view (profile) id of the Universal Analytics property.
    #[serde(default)]
    pub view_id: String,

    /// Path to a file holding a ready OAuth2 access token. Obtaining the
    /// token (service account, `gcloud auth print-access-token`, ...) is the
    /// operator's job; this tool only sends it as a bearer header.
    #[serde(default = "default_credentials")]
    pub credentials: PathBuf,
}

/// Date range and filter for the report query.
///
/// Start and end date have no defaults on purpose: an export over an
/// unintended range is worse than a startup error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// First day of the export range (inclusive), `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the export range (inclusive), `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Optional dimension filter clause sent with every page request.
    #[serde(default)]
    pub filter: Option<DimensionFilter>,
}

/// Where and how the CSV file is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the export file is created in.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Character encoding of the output file.
    #[serde(default = "default_encoding")]
    pub encoding: OutputEncoding,

    /// What to do with characters the target encoding cannot represent.
    #[serde(default = "default_unmappable")]
    pub on_unmappable: UnmappablePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_credentials() -> PathBuf {
    PathBuf::from("analytics-token.txt")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_encoding() -> OutputEncoding {
    OutputEncoding::ShiftJis
}

fn default_unmappable() -> UnmappablePolicy {
    UnmappablePolicy::Substitute
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analytics: AnalyticsConfig::default(),
            report: ReportConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            view_id: String::new(),
            credentials: default_credentials(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            encoding: default_encoding(),
            on_unmappable: default_unmappable(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration, preferring the explicit path when given.
    ///
    /// With no explicit path, `./ua-export.toml` is used if it exists;
    /// otherwise the defaults are returned and the command line has to
    /// supply the required values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::from_file(explicit),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

        let config =
            toml::from_str(&raw).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Called after command-line overrides were applied, so a value missing
    /// here is genuinely missing.
    pub fn validate(&self) -> Result<()> {
        if self.analytics.view_id.is_empty() {
            return Err(ConfigError::MissingField("analytics.view_id".to_string()).into());
        }
        // The view id is spliced into the output file name; keeping it
        // numeric also keeps path separators out of that name.
        if !self.analytics.view_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidValue {
                field: "analytics.view_id".to_string(),
                value: self.analytics.view_id.clone(),
            }
            .into());
        }

        self.report.date_range()?;

        if let Some(filter) = &self.report.filter {
            if filter.dimension.is_empty() {
                return Err(
                    ConfigError::MissingField("report.filter.dimension".to_string()).into(),
                );
            }
            if filter.operator.is_empty() {
                return Err(
                    ConfigError::MissingField("report.filter.operator".to_string()).into(),
                );
            }
            if filter.expressions.is_empty() {
                return Err(
                    ConfigError::MissingField("report.filter.expressions".to_string()).into(),
                );
            }
        }

        Ok(())
    }
}

impl ReportConfig {
    /// The validated export date range.
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = self
            .start_date
            .ok_or_else(|| ConfigError::MissingField("report.start_date".to_string()))?;
        let end = self
            .end_date
            .ok_or_else(|| ConfigError::MissingField("report.end_date".to_string()))?;

        if start > end {
            return Err(ConfigError::InvalidValue {
                field: "report.start_date".to_string(),
                value: format!("{start} (after end_date {end})"),
            }
            .into());
        }

        Ok((start, end))
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.analytics.view_id = "123456789".to_string();
        config.report.start_date = NaiveDate::from_ymd_opt(2022, 6, 1);
        config.report.end_date = NaiveDate::from_ymd_opt(2022, 6, 30);
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analytics.view_id.is_empty());
        assert_eq!(config.analytics.credentials, PathBuf::from("analytics-token.txt"));
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert_eq!(config.output.encoding, OutputEncoding::ShiftJis);
        assert_eq!(config.output.on_unmappable, UnmappablePolicy::Substitute);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.logging.timestamps);
    }

    #[test]
    fn test_parse_full_file() {
        let raw = r#"
            [analytics]
            view_id = "98765"
            credentials = "secrets/token"

            [report]
            start_date = "2022-06-01"
            end_date = "2022-06-30"

            [report.filter]
            dimension = "ga:pagePath"
            operator = "EXACT"
            expressions = ["/lp/summer-sale"]

            [output]
            directory = "out"
            encoding = "utf8"
            on_unmappable = "fail"

            [logging]
            level = "debug"
            timestamps = false
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.analytics.view_id, "98765");
        assert_eq!(config.analytics.credentials, PathBuf::from("secrets/token"));
        assert_eq!(config.report.start_date, NaiveDate::from_ymd_opt(2022, 6, 1));
        assert_eq!(config.report.end_date, NaiveDate::from_ymd_opt(2022, 6, 30));
        let filter = config.report.filter.as_ref().unwrap();
        assert_eq!(filter.dimension, "ga:pagePath");
        assert_eq!(filter.operator, "EXACT");
        assert_eq!(filter.expressions, vec!["/lp/summer-sale".to_string()]);
        assert_eq!(config.output.encoding, OutputEncoding::Utf8);
        assert_eq!(config.output.on_unmappable, UnmappablePolicy::Fail);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(!config.logging.timestamps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file_uses_defaults() {
        let raw = r#"
            [analytics]
            view_id = "42"
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.analytics.view_id, "42");
        assert_eq!(config.output.encoding, OutputEncoding::ShiftJis);
        assert!(config.report.filter.is_none());
    }

    #[test]
    fn test_validate_requires_view_id() {
        let mut config = valid_config();
        config.analytics.view_id.clear();
        assert!(matches!(
            config.validate(),
            Err(ExportError::Config(ConfigError::MissingField(_)))
        ));
    }

    #[test]
    fn test_validate_rejects_non_numeric_view_id() {
        let mut config = valid_config();
        config.analytics.view_id = "../etc".to_string();
        assert!(matches!(
            config.validate(),
            Err(ExportError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_validate_requires_dates() {
        let mut config = valid_config();
        config.report.end_date = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = valid_config();
        config.report.start_date = NaiveDate::from_ymd_opt(2022, 7, 1);
        assert!(matches!(
            config.validate(),
            Err(ExportError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_filter_expressions() {
        let mut config = valid_config();
        config.report.filter = Some(DimensionFilter {
            dimension: "ga:pagePath".to_string(),
            operator: "EXACT".to_string(),
            expressions: Vec::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_range() {
        let config = valid_config();
        let (start, end) = config.report.date_range().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2022, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2022, 6, 30).unwrap());
    }
}
