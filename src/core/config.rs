//! Serde-deserializable logger configuration
//!
//! ```
//! use fieldlog::{LoggerConfig, LogLevel};
//!
//! let config = LoggerConfig::from_json_str(r#"{
//!     "level": "debug",
//!     "formatter": { "disable_timestamp": true, "field_map": { "msg": "message" } },
//!     "file": { "dir": "/tmp/fieldlog-doc", "file_name": "svc.log", "max_file_size": 4096 }
//! }"#).unwrap();
//!
//! assert_eq!(config.level, LogLevel::Debug);
//! assert_eq!(config.file.as_ref().unwrap().max_file_size, 4096);
//! ```

use super::error::{LoggerError, Result};
use super::formatter::{FieldKey, FieldMap};
use super::log_level::LogLevel;
use super::logger::{Logger, LoggerBuilder};
use super::text_formatter::TextFormatter;
use super::timestamp::TimestampFormat;
use crate::appenders::RotationConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Options of the text formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextFormatterConfig {
    pub force_quote: bool,
    pub disable_quote: bool,
    pub quote_empty_fields: bool,
    pub disable_timestamp: bool,
    pub timestamp_format: TimestampFormat,
    pub disable_sorting: bool,
    pub pad_level_text: bool,
    pub colors: bool,
    /// Fixed key (`time`, `level`, `msg`, `field_error`, `func`, `file`) to
    /// the name it is rendered under
    pub field_map: BTreeMap<String, String>,
}

impl TextFormatterConfig {
    /// # Errors
    ///
    /// Returns error if `field_map` names an unknown key or the timestamp
    /// pattern is invalid
    pub fn to_formatter(&self) -> Result<TextFormatter> {
        self.timestamp_format.validate()?;

        let mut field_map = FieldMap::new();
        for (key, name) in &self.field_map {
            field_map = field_map.with(key.parse::<FieldKey>()?, name.clone());
        }

        Ok(TextFormatter::new()
            .with_force_quote(self.force_quote)
            .with_disable_quote(self.disable_quote)
            .with_quote_empty_fields(self.quote_empty_fields)
            .with_disable_timestamp(self.disable_timestamp)
            .with_timestamp_format(self.timestamp_format.clone())
            .with_disable_sorting(self.disable_sorting)
            .with_pad_level_text(self.pad_level_text)
            .with_colors(self.colors)
            .with_field_map(field_map))
    }
}

/// Everything about a logger that can be stated in a file.
///
/// Output goes to stderr unless `file` is present, in which case the logger
/// writes to a rotating file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub report_caller: bool,
    pub single_threaded: bool,
    pub formatter: TextFormatterConfig,
    pub file: Option<RotationConfig>,
}

impl LoggerConfig {
    /// # Errors
    ///
    /// Returns error if `json` is not a valid configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid
    /// configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "read logger config",
                format!("Failed to read {}", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&contents)
    }

    /// # Errors
    ///
    /// Returns error if the formatter options are invalid
    pub fn into_builder(self) -> Result<LoggerBuilder> {
        let mut builder = Logger::builder()
            .level(self.level)
            .report_caller(self.report_caller)
            .single_threaded(self.single_threaded)
            .formatter(self.formatter.to_formatter()?);
        if let Some(rotation) = self.file {
            builder = builder.rotation(rotation);
        }
        Ok(builder)
    }

    /// Build a logger, opening its log files if file output is configured.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the log files cannot
    /// be opened
    pub fn build(self) -> Result<Logger> {
        self.into_builder()?.try_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::ArchiveFormat;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LoggerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_file_defaults_fill_missing_keys() {
        let config = LoggerConfig::from_json_str(r#"{"file": {"archive": "gzip"}}"#).unwrap();
        let file = config.file.unwrap();

        assert_eq!(file.file_name, "app.log");
        assert_eq!(file.max_file_size, 10240);
        assert_eq!(file.archive, ArchiveFormat::Gzip);
    }

    #[test]
    fn test_level_spellings() {
        let config = LoggerConfig::from_json_str(r#"{"level": "warning"}"#).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        let config = LoggerConfig::from_json_str(r#"{"level": "warn"}"#).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(LoggerConfig::from_json_str(r#"{"levle": "debug"}"#).is_err());
    }

    #[test]
    fn test_unknown_field_map_key_rejected() {
        let config =
            LoggerConfig::from_json_str(r#"{"formatter": {"field_map": {"message": "m"}}}"#)
                .unwrap();
        assert!(config.into_builder().is_err());
    }

    #[test]
    fn test_invalid_timestamp_pattern_rejected() {
        let config = LoggerConfig::from_json_str(
            r#"{"formatter": {"timestamp_format": {"custom": "%Q"}}}"#,
        )
        .unwrap();

        let err = config.into_builder().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_file_and_build() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("logger.json");
        let log_dir = dir.path().join("logs");
        fs::write(
            &config_path,
            format!(
                r#"{{"level": "error", "file": {{"dir": {:?}, "file_name": "svc.log"}}}}"#,
                log_dir.display().to_string()
            ),
        )
        .unwrap();

        let logger = LoggerConfig::from_file(&config_path).unwrap().build().unwrap();

        assert_eq!(logger.level(), LogLevel::Error);
        assert!(logger.file_output());
        assert!(log_dir.join("svc.log").exists());
        assert!(log_dir.join("error-svc.log").exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LoggerConfig::from_file("/nonexistent/fieldlog.json").unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }
}
