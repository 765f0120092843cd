//! Timestamp formatting for the `time` field
//!
//! Entry timestamps are local times. The default rendering is RFC 3339 with
//! second precision, which uses `Z` when the local offset is zero.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use fieldlog::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Rfc3339.format(&t).unwrap(), "2025-01-08T10:30:45Z");
/// assert_eq!(TimestampFormat::Custom("%H:%M".into()).format(&t).unwrap(), "10:30");
/// assert!(TimestampFormat::Custom("%Q".into()).validate().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45+02:00`
    #[default]
    Rfc3339,

    /// `2025-01-08T10:30:45.123+02:00`
    Rfc3339Millis,

    /// Seconds since the epoch: `1736332245`
    Unix,

    /// Milliseconds since the epoch: `1736332245123`
    UnixMillis,

    /// Any strftime-compatible format string
    Custom(String),
}

impl TimestampFormat {
    /// Check that a custom pattern only uses known strftime specifiers.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern contains an unknown specifier
    pub fn validate(&self) -> Result<()> {
        match self {
            TimestampFormat::Custom(pattern)
                if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) =>
            {
                Err(LoggerError::config(
                    "timestamp_format",
                    format!("invalid strftime pattern: {:?}", pattern),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Append the rendered timestamp to `out`.
    pub fn write_to<Tz, W>(&self, datetime: &DateTime<Tz>, out: &mut W) -> fmt::Result
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
        W: Write,
    {
        match self {
            TimestampFormat::Rfc3339 => {
                out.write_str(&datetime.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            TimestampFormat::Rfc3339Millis => {
                out.write_str(&datetime.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            TimestampFormat::Unix => write!(out, "{}", datetime.timestamp()),
            TimestampFormat::UnixMillis => write!(out, "{}", datetime.timestamp_millis()),
            TimestampFormat::Custom(pattern) => write!(out, "{}", datetime.format(pattern)),
        }
    }

    /// # Errors
    ///
    /// Returns error if a custom pattern cannot be rendered
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut out = String::new();
        self.write_to(datetime, &mut out).map_err(|_| {
            LoggerError::formatter("timestamp", format!("cannot render {:?}", self))
        })?;
        Ok(out)
    }
}

/// Suffix format used for rotated backup file names.
pub(crate) const BACKUP_SUFFIX_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
