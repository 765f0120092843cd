//! Human-readable `key=value` text formatter
//!
//! A record is one line of space-separated `key=value` tokens. The fixed
//! keys come first, in this order: time, level, msg, field error, caller
//! function, caller file. User fields follow, sorted by key unless sorting is
//! disabled. A value is written bare when it consists only of
//! `[A-Za-z0-9-._/@^+]`, and as an escaped, double-quoted string otherwise.
//!
//! ```
//! use fieldlog::{Logger, TextFormatter, appenders::MemorySink};
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .output(sink.clone())
//!     .formatter(TextFormatter::new().with_disable_timestamp(true))
//!     .build();
//!
//! logger.with_field("path", "/var/log").with_field("user", "J Doe").info("opened");
//! assert_eq!(sink.lines()[0], r#"level=info msg=opened path=/var/log user="J Doe""#);
//! ```

use super::caller::Frame;
use super::entry::Entry;
use super::error::Result;
use super::fields::FieldValue;
use super::formatter::{prefix_field_clashes, FieldKey, FieldMap, Formatter};
use super::log_level::{LogLevel, ALL_LEVELS};
use super::timestamp::TimestampFormat;
use chrono::Local;
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, OnceLock};

/// Reorders user field keys in place.
pub type SortingFunc = Arc<dyn Fn(&mut [String]) + Send + Sync>;

/// Maps a caller frame to the `(func, file)` values to render.
pub type CallerPrettyfier = Arc<dyn Fn(&Frame) -> (String, String) + Send + Sync>;

#[derive(Clone, Default)]
pub struct TextFormatter {
    force_quote: bool,
    disable_quote: bool,
    quote_empty_fields: bool,
    disable_timestamp: bool,
    timestamp_format: TimestampFormat,
    disable_sorting: bool,
    sorting_func: Option<SortingFunc>,
    pad_level_text: bool,
    colors: bool,
    field_map: FieldMap,
    caller_prettyfier: Option<CallerPrettyfier>,
    level_text_max_length: OnceLock<usize>,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote every value.
    #[must_use]
    pub fn with_force_quote(mut self, enabled: bool) -> Self {
        self.force_quote = enabled;
        self
    }

    /// Never quote, unless forced or an empty value must be quoted.
    #[must_use]
    pub fn with_disable_quote(mut self, enabled: bool) -> Self {
        self.disable_quote = enabled;
        self
    }

    #[must_use]
    pub fn with_quote_empty_fields(mut self, enabled: bool) -> Self {
        self.quote_empty_fields = enabled;
        self
    }

    #[must_use]
    pub fn with_disable_timestamp(mut self, disabled: bool) -> Self {
        self.disable_timestamp = disabled;
        self
    }

    /// Render the `time` field with `format`. A custom pattern with an
    /// unknown specifier is refused and the current format is kept.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        match format.validate() {
            Ok(()) => self.timestamp_format = format,
            Err(e) => eprintln!("[LOGGER WARNING] Ignoring timestamp format: {}", e),
        }
        self
    }

    #[must_use]
    pub fn with_disable_sorting(mut self, disabled: bool) -> Self {
        self.disable_sorting = disabled;
        self
    }

    /// Order user fields with `f` instead of lexicographically.
    #[must_use]
    pub fn with_sorting_func<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut [String]) + Send + Sync + 'static,
    {
        self.sorting_func = Some(Arc::new(f));
        self
    }

    /// Pad the level value to the width of the longest level name.
    #[must_use]
    pub fn with_pad_level_text(mut self, enabled: bool) -> Self {
        self.pad_level_text = enabled;
        self
    }

    /// Colour the level value with ANSI escapes. Has no effect without the
    /// `console` feature.
    #[must_use]
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors = enabled;
        self
    }

    #[must_use]
    pub fn with_field_map(mut self, field_map: FieldMap) -> Self {
        self.field_map = field_map;
        self
    }

    #[must_use]
    pub fn with_caller_prettyfier<F>(mut self, f: F) -> Self
    where
        F: Fn(&Frame) -> (String, String) + Send + Sync + 'static,
    {
        self.caller_prettyfier = Some(Arc::new(f));
        self
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    fn level_text_max_length(&self) -> usize {
        *self.level_text_max_length.get_or_init(|| {
            ALL_LEVELS
                .iter()
                .map(|level| level.to_str().chars().count())
                .max()
                .unwrap_or(0)
        })
    }

    pub(crate) fn needs_quoting(&self, text: &str) -> bool {
        if self.force_quote {
            return true;
        }
        if self.quote_empty_fields && text.is_empty() {
            return true;
        }
        if self.disable_quote {
            return false;
        }
        !text.chars().all(|ch| {
            ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | '/' | '@' | '^' | '+')
        })
    }

    fn append_key(&self, buf: &mut Vec<u8>, start: usize, key: &str) {
        if buf.len() > start {
            buf.push(b' ');
        }
        buf.extend_from_slice(key.as_bytes());
        buf.push(b'=');
    }

    fn append_value(&self, buf: &mut Vec<u8>, value: &str) -> Result<()> {
        if self.needs_quoting(value) {
            write!(buf, "{:?}", value)?;
        } else {
            buf.extend_from_slice(value.as_bytes());
        }
        Ok(())
    }

    fn append_key_value(&self, buf: &mut Vec<u8>, start: usize, key: &str, value: &str) -> Result<()> {
        self.append_key(buf, start, key);
        self.append_value(buf, value)
    }

    fn append_level(&self, buf: &mut Vec<u8>, start: usize, level: LogLevel) -> Result<()> {
        let text = level.to_str();
        self.append_key(buf, start, self.field_map.resolve(FieldKey::Level));

        #[cfg(feature = "console")]
        let colored = if self.colors {
            use colored::Colorize;
            let rendered = if self.needs_quoting(text) {
                format!("{:?}", text)
            } else {
                text.to_string()
            };
            write!(buf, "{}", rendered.color(level.color_code()))?;
            true
        } else {
            false
        };
        #[cfg(not(feature = "console"))]
        let colored = false;

        if !colored {
            self.append_value(buf, text)?;
        }

        if self.pad_level_text {
            let width = text.chars().count();
            let max = self.level_text_max_length();
            buf.extend(std::iter::repeat(b' ').take(max.saturating_sub(width)));
        }
        Ok(())
    }
}

fn value_text(value: &FieldValue) -> Cow<'_, str> {
    match value {
        FieldValue::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &Entry, buf: &mut Vec<u8>) -> Result<()> {
        let caller = entry.caller();
        let data = prefix_field_clashes(entry.fields(), &self.field_map, caller.is_some());

        let mut keys: Vec<String> = data.keys().map(|key| key.to_string()).collect();
        if !self.disable_sorting {
            match &self.sorting_func {
                Some(sort) => sort(&mut keys),
                None => keys.sort_unstable(),
            }
        }

        let start = buf.len();

        if !self.disable_timestamp {
            let time = match entry.time() {
                Some(time) => self.timestamp_format.format(time)?,
                None => self.timestamp_format.format(&Local::now())?,
            };
            self.append_key_value(buf, start, self.field_map.resolve(FieldKey::Time), &time)?;
        }

        self.append_level(buf, start, entry.level())?;

        if !entry.message().is_empty() {
            self.append_key_value(buf, start, self.field_map.resolve(FieldKey::Msg), entry.message())?;
        }

        if !entry.field_error().is_empty() {
            self.append_key_value(
                buf,
                start,
                self.field_map.resolve(FieldKey::FieldError),
                entry.field_error(),
            )?;
        }

        if let Some(frame) = caller {
            let (func, file) = match &self.caller_prettyfier {
                Some(prettyfier) => prettyfier(frame),
                None => (frame.function.clone(), frame.to_string()),
            };
            if !func.is_empty() {
                self.append_key_value(buf, start, self.field_map.resolve(FieldKey::Func), &func)?;
            }
            if !file.is_empty() {
                self.append_key_value(buf, start, self.field_map.resolve(FieldKey::File), &file)?;
            }
        }

        for key in &keys {
            if let Some(value) = data.get(key.as_str()) {
                self.append_key_value(buf, start, key, &value_text(value))?;
            }
        }

        buf.push(b'\n');
        Ok(())
    }
}

impl fmt::Debug for TextFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFormatter")
            .field("force_quote", &self.force_quote)
            .field("disable_quote", &self.disable_quote)
            .field("quote_empty_fields", &self.quote_empty_fields)
            .field("disable_timestamp", &self.disable_timestamp)
            .field("timestamp_format", &self.timestamp_format)
            .field("disable_sorting", &self.disable_sorting)
            .field("sorting_func", &self.sorting_func.is_some())
            .field("pad_level_text", &self.pad_level_text)
            .field("colors", &self.colors)
            .field("field_map", &self.field_map)
            .field("caller_prettyfier", &self.caller_prettyfier.is_some())
            .finish()
    }
}
