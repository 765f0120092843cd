//! Log entry: an immutable snapshot of a record under construction
//!
//! Every `with_*` method returns a new [`Entry`] carrying a copy of the field
//! map; the receiver is left untouched. A base entry can therefore be stored
//! and shared between call sites and threads, and each derived entry renders
//! independently.
//!
//! ```
//! use fieldlog::{Logger, appenders::MemorySink, TextFormatter};
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .output(sink.clone())
//!     .formatter(TextFormatter::new().with_disable_timestamp(true))
//!     .build();
//!
//! let request = logger.with_field("request_id", "r-17");
//! request.with_field("status", 200).info("served");
//! request.with_field("status", 404).warn("missing");
//!
//! assert_eq!(
//!     sink.lines(),
//!     vec![
//!         "level=info msg=served request_id=r-17 status=200",
//!         "level=warning msg=missing request_id=r-17 status=404",
//!     ]
//! );
//! ```

use super::args::{sprint, Arg};
use super::caller::{CallSite, Frame};
use super::error::{LoggerError, Result};
use super::fields::{FieldValue, Fields};
use super::log_level::LogLevel;
use super::logger::Logger;
use chrono::{DateTime, Local};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Field key used by [`Entry::with_error`].
pub const ERROR_KEY: &str = "error";

pub struct Entry {
    logger: Logger,
    fields: Fields,
    time: Option<DateTime<Local>>,
    level: LogLevel,
    caller: Option<Frame>,
    message: String,
    field_error: String,
    context: Option<Arc<dyn Any + Send + Sync>>,
}

impl Entry {
    pub fn new(logger: &Logger) -> Self {
        Self::with_field_map(logger.clone(), Fields::new())
    }

    pub(crate) fn with_field_map(logger: Logger, fields: Fields) -> Self {
        Self {
            logger,
            fields,
            time: None,
            level: LogLevel::default(),
            caller: None,
            message: String::new(),
            field_error: String::new(),
            context: None,
        }
    }

    /// New entry sharing everything but the field map with `self`.
    fn derive(&self, fields: Fields) -> Self {
        Self {
            logger: self.logger.clone(),
            fields,
            time: self.time,
            level: LogLevel::default(),
            caller: None,
            message: String::new(),
            field_error: self.field_error.clone(),
            context: self.context.clone(),
        }
    }

    /// Add an error as a single field under [`ERROR_KEY`].
    #[must_use]
    pub fn with_error<E: fmt::Display + ?Sized>(&self, err: &E) -> Entry {
        self.with_field(ERROR_KEY, err.to_string())
    }

    /// Attach an opaque context value, retrievable with [`Entry::context`].
    #[must_use]
    pub fn with_context<C: Any + Send + Sync>(&self, ctx: C) -> Entry {
        let mut entry = self.derive(self.fields.clone());
        entry.context = Some(Arc::new(ctx));
        entry
    }

    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.with_fields([(key, value)])
    }

    /// Merge `fields` over a copy of this entry's fields.
    ///
    /// Callable values are not stored; each one appends
    /// `can not add field "<key>"` to the entry's field error instead.
    #[must_use]
    pub fn with_fields<I, K, V>(&self, fields: I) -> Entry
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut data = self.fields.clone();
        let mut field_error = self.field_error.clone();

        for (key, value) in fields {
            let key = key.into();
            let value = value.into();
            if value.is_func() {
                let rejection = format!("can not add field {:?}", key);
                if !field_error.is_empty() {
                    field_error.push_str(", ");
                }
                field_error.push_str(&rejection);
                self.logger.metrics().record_rejected_field();
            } else {
                data.insert(key, value);
            }
        }

        let mut entry = self.derive(data);
        entry.field_error = field_error;
        entry
    }

    /// Override the time of the entry.
    #[must_use]
    pub fn with_time(&self, time: DateTime<Local>) -> Entry {
        let mut entry = self.derive(self.fields.clone());
        entry.time = Some(time);
        entry
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn time(&self) -> Option<&DateTime<Local>> {
        self.time.as_ref()
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn caller(&self) -> Option<&Frame> {
        self.caller.as_ref()
    }

    pub fn has_caller(&self) -> bool {
        self.caller.is_some()
    }

    pub(crate) fn set_caller(&mut self, caller: Option<Frame>) {
        self.caller = caller;
    }

    pub(crate) fn into_fields(self) -> Fields {
        self.fields
    }

    /// Accumulated description of rejected fields; empty when none were.
    pub fn field_error(&self) -> &str {
        &self.field_error
    }

    pub fn context<C: Any>(&self) -> Option<&C> {
        self.context.as_deref()?.downcast_ref::<C>()
    }

    /// Render with the owning logger's formatter into a fresh buffer.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        let formatter = self.logger.formatter();
        let mut buf = Vec::new();
        formatter.format(self, &mut buf)?;
        Ok(buf)
    }

    pub fn string(&self) -> Result<String> {
        String::from_utf8(self.bytes()?).map_err(|e| LoggerError::formatter("utf-8", e.to_string()))
    }

    #[inline]
    pub fn is_level_enabled(&self, level: LogLevel) -> bool {
        self.logger.is_level_enabled(level)
    }

    /// Log at `level`. A `Panic` record panics after being written, with the
    /// finalized entry as payload; use [`Entry::fatal`] to also exit.
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if self.logger.is_level_enabled(level) {
            self.emit(level, message.into(), CallSite::here());
        }
    }

    /// Join `args` print-style and log them. Used by the logging macros.
    #[track_caller]
    pub fn log_args(&self, level: LogLevel, args: &[Arg<'_>]) {
        if self.logger.is_level_enabled(level) {
            self.emit(level, sprint(args), CallSite::here());
        }
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __log_args(&self, level: LogLevel, module_path: &'static str, args: &[Arg<'_>]) {
        if self.logger.is_level_enabled(level) {
            let site = CallSite::here().with_module(module_path);
            self.emit(level, sprint(args), site);
        }
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __fatal_args(&self, module_path: &'static str, args: &[Arg<'_>]) {
        self.__log_args(LogLevel::Fatal, module_path, args);
        self.logger.exit(1);
    }

    /// Stamp, render and write one record built from this entry.
    pub(crate) fn emit(&self, level: LogLevel, message: String, site: CallSite) {
        let mut fields = self.logger.acquire_fields();
        fields.reserve(self.fields.len());
        fields.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut record = self.derive(fields);
        record.time.get_or_insert_with(Local::now);
        record.level = level;
        record.message = message;

        self.logger.write_entry(&mut record, &site);

        if level <= LogLevel::Panic {
            std::panic::panic_any(record);
        }
        self.logger.release_fields(record.into_fields());
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Same as [`info`](Self::info).
    #[track_caller]
    pub fn print(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    /// Same as [`warn`](Self::warn).
    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Log at `Fatal`, then call the logger's exit function with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
        self.logger.exit(1);
    }

    /// Log at `Panic`, then panic with the record as payload.
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) {
        self.log(LogLevel::Panic, message);
    }
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Self {
            logger: self.logger.clone(),
            fields: self.fields.clone(),
            time: self.time,
            level: self.level,
            caller: self.caller.clone(),
            message: self.message.clone(),
            field_error: self.field_error.clone(),
            context: self.context.clone(),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("fields", &self.fields)
            .field("time", &self.time)
            .field("level", &self.level)
            .field("caller", &self.caller)
            .field("message", &self.message)
            .field("field_error", &self.field_error)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemorySink;
    use crate::core::text_formatter::TextFormatter;
    use chrono::TimeZone;

    fn quiet_logger() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .output(sink.clone())
            .formatter(TextFormatter::new().with_disable_timestamp(true))
            .build();
        (logger, sink)
    }

    #[test]
    fn test_with_field_does_not_mutate_receiver() {
        let (logger, _) = quiet_logger();
        let base = logger.with_field("a", 1);
        let derived = base.with_field("b", 2);

        assert_eq!(base.fields().len(), 1);
        assert_eq!(derived.fields().len(), 2);
        assert!(!base.fields().contains_key("b"));
    }

    #[test]
    fn test_func_field_is_rejected() {
        let (logger, _) = quiet_logger();
        let entry = logger
            .with_field("ok", "yes")
            .with_field("cb", FieldValue::func(|| FieldValue::Null));

        assert!(!entry.fields().contains_key("cb"));
        assert_eq!(entry.field_error(), "can not add field \"cb\"");
        assert_eq!(logger.metrics().rejected_fields(), 1);
    }

    #[test]
    fn test_field_errors_accumulate() {
        let (logger, _) = quiet_logger();
        let entry = logger
            .with_field("first", FieldValue::func(|| FieldValue::Null))
            .with_fields(vec![
                ("second", FieldValue::func(|| FieldValue::Null)),
                ("n", FieldValue::from(3)),
            ]);

        assert_eq!(
            entry.field_error(),
            "can not add field \"first\", can not add field \"second\""
        );
        assert_eq!(entry.fields().len(), 1);
    }

    #[test]
    fn test_with_time_and_context() {
        #[derive(Debug, PartialEq)]
        struct RequestId(u64);

        let (logger, _) = quiet_logger();
        let t = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let entry = logger.with_time(t).with_context(RequestId(7)).with_field("k", "v");

        assert_eq!(entry.time(), Some(&t));
        assert_eq!(entry.context::<RequestId>(), Some(&RequestId(7)));
        assert!(entry.context::<String>().is_none());
    }

    #[test]
    fn test_with_error_uses_error_key() {
        let (logger, _) = quiet_logger();
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let entry = logger.with_error(&err);

        assert_eq!(
            entry.fields().get(ERROR_KEY),
            Some(&FieldValue::String("no such file".to_string()))
        );
    }

    #[test]
    fn test_bytes_renders_without_logging() {
        let (logger, sink) = quiet_logger();
        let entry = logger.with_field("x", 1);

        assert_eq!(entry.string().unwrap(), "level=info x=1\n");
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn test_log_returns_field_map_to_pool() {
        let (logger, sink) = quiet_logger();
        let base = logger.with_field("a", 1);
        base.info("one");
        base.info("two");

        assert_eq!(sink.lines().len(), 2);
        assert!(logger.idle_entries() >= 1);
        assert_eq!(base.fields().len(), 1);
    }
}
