//! Main logger implementation
//!
//! A [`Logger`] is a cheap, cloneable handle; clones share one level, one
//! output and one lock. The level lives in an atomic so the enabled check
//! never contends. Everything else (output, formatter, rotation state) sits
//! behind a single `parking_lot::Mutex`, and a record is rendered and
//! written under one acquisition of it, so records never interleave.

use super::{
    args::{sprint, Arg},
    caller::{CallSite, CallerResolver, LocationResolver},
    entry::Entry,
    error::Result,
    fields::{FieldValue, Fields},
    formatter::Formatter,
    global,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    pool::{default_buffer_pool, BufferPool, EntryPool},
    text_formatter::TextFormatter,
};
use crate::appenders::rotating_file::{RotatingFile, RotationConfig};
use crate::appenders::ArchiveFormat;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Called by `fatal` with the exit status.
pub type ExitFunc = Arc<dyn Fn(i32) + Send + Sync>;

fn process_exit() -> ExitFunc {
    Arc::new(|code| global::exit(code))
}

struct LoggerState {
    out: Box<dyn Write + Send>,
    formatter: Arc<dyn Formatter>,
    report_caller: bool,
    caller_resolver: Arc<dyn CallerResolver>,
    buffer_pool: Option<Arc<dyn BufferPool>>,
    exit_func: ExitFunc,
    file_output: bool,
    rotation: RotatingFile,
}

impl LoggerState {
    fn buffer_pool(&self) -> Arc<dyn BufferPool> {
        self.buffer_pool.clone().unwrap_or_else(default_buffer_pool)
    }

    fn write_bytes(&mut self, level: LogLevel, bytes: &[u8], metrics: &LoggerMetrics) {
        if self.file_output {
            match self.rotation.write_record(level, bytes) {
                Ok(report) => {
                    if let Some(rotation) = report.rotation {
                        metrics.record_rotation();
                        if rotation.archive_failed {
                            metrics.record_archive_failure();
                        }
                    }
                    if report.error_file_failed {
                        metrics.record_error_file_failure();
                    }
                    metrics.record_logged();
                }
                Err(e) => {
                    eprintln!("[LOGGER ERROR] Failed to write to log file: {}", e);
                    metrics.record_dropped();
                }
            }
        } else if let Err(e) = self.out.write_all(bytes) {
            eprintln!("[LOGGER ERROR] Failed to write to log: {}", e);
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }
    }

    fn flush(&mut self) -> Result<()> {
        if self.file_output {
            self.rotation.flush()
        } else {
            self.out.flush()?;
            Ok(())
        }
    }
}

struct LoggerInner {
    level: AtomicU32,
    lock_disabled: AtomicBool,
    state: Mutex<LoggerState>,
    entry_pool: EntryPool,
    metrics: LoggerMetrics,
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        if let Err(e) = self.state.get_mut().flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Leveled, structured logger
///
/// # Example
///
/// ```
/// use fieldlog::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .output(sink.clone())
///     .build();
///
/// logger.debug("connecting");
/// logger.trace("filtered out");
/// assert_eq!(sink.lines().len(), 1);
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Logger at `Info`, writing text to stderr.
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u32(self.inner.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: LogLevel) {
        self.inner.level.store(level as u32, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_level_enabled(&self, level: LogLevel) -> bool {
        self.level().enables(level)
    }

    pub fn set_output<W: Write + Send + 'static>(&self, output: W) {
        self.inner.state.lock().out = Box::new(output);
    }

    pub fn set_formatter<F: Formatter + 'static>(&self, formatter: F) {
        self.inner.state.lock().formatter = Arc::new(formatter);
    }

    /// The formatter currently in use.
    ///
    /// Must not be called from inside [`Formatter::format`]: the lock is
    /// held while a record renders.
    pub fn formatter(&self) -> Arc<dyn Formatter> {
        Arc::clone(&self.inner.state.lock().formatter)
    }

    pub fn set_report_caller(&self, report_caller: bool) {
        self.inner.state.lock().report_caller = report_caller;
    }

    pub fn report_caller(&self) -> bool {
        self.inner.state.lock().report_caller
    }

    pub fn set_caller_resolver<R: CallerResolver + 'static>(&self, resolver: R) {
        self.inner.state.lock().caller_resolver = Arc::new(resolver);
    }

    /// Use a private buffer pool instead of the process-wide one.
    pub fn set_buffer_pool(&self, pool: Arc<dyn BufferPool>) {
        self.inner.state.lock().buffer_pool = Some(pool);
    }

    pub fn set_exit_func<F: Fn(i32) + Send + Sync + 'static>(&self, exit_func: F) {
        self.inner.state.lock().exit_func = Arc::new(exit_func);
    }

    /// Write to the rotating file instead of the output sink.
    pub fn set_file_output(&self, enabled: bool) {
        self.inner.state.lock().file_output = enabled;
    }

    pub fn file_output(&self) -> bool {
        self.inner.state.lock().file_output
    }

    /// Configure the rotating file and switch to it.
    pub fn set_rotation(&self, config: RotationConfig) {
        let mut state = self.inner.state.lock();
        state.rotation.set_config(config);
        state.file_output = true;
    }

    pub fn rotation_config(&self) -> RotationConfig {
        self.inner.state.lock().rotation.config().clone()
    }

    pub fn set_file_path(&self, dir: impl Into<PathBuf>, file_name: impl Into<String>) {
        self.update_rotation(|config| {
            config.dir = dir.into();
            config.file_name = file_name.into();
        });
    }

    pub fn set_max_file_size(&self, size: u64) {
        self.update_rotation(|config| config.max_file_size = size);
    }

    pub fn set_archive_format(&self, archive: ArchiveFormat) {
        self.update_rotation(|config| config.archive = archive);
    }

    pub fn set_error_file_level(&self, level: Option<LogLevel>) {
        self.update_rotation(|config| config.error_file_level = level);
    }

    fn update_rotation(&self, update: impl FnOnce(&mut RotationConfig)) {
        let mut state = self.inner.state.lock();
        let mut config = state.rotation.config().clone();
        update(&mut config);
        state.rotation.set_config(config);
    }

    /// Render records outside the lock and serialize only the write.
    ///
    /// For callers that never log from more than one thread at a time.
    /// Records from concurrent callers may then be written in a different
    /// order than they were rendered.
    pub fn set_no_lock(&self) {
        self.inner.lock_disabled.store(true, Ordering::Relaxed);
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.state.lock().flush()
    }

    /// Flush, then call the exit function with `code`.
    pub fn exit(&self, code: i32) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
        }
        let exit_func = Arc::clone(&self.inner.state.lock().exit_func);
        exit_func(code);
    }

    pub(crate) fn acquire_fields(&self) -> Fields {
        self.inner.entry_pool.get()
    }

    pub(crate) fn release_fields(&self, fields: Fields) {
        self.inner.entry_pool.put(fields);
    }

    #[cfg(test)]
    pub(crate) fn idle_entries(&self) -> usize {
        self.inner.entry_pool.idle()
    }

    fn new_entry(&self) -> Entry {
        Entry::with_field_map(self.clone(), self.acquire_fields())
    }

    fn release_entry(&self, entry: Entry) {
        self.release_fields(entry.into_fields());
    }

    fn derive<F: FnOnce(&Entry) -> Entry>(&self, f: F) -> Entry {
        let entry = self.new_entry();
        let derived = f(&entry);
        self.release_entry(entry);
        derived
    }

    /// Resolve the caller, render and write one finalized record.
    pub(crate) fn write_entry(&self, record: &mut Entry, site: &CallSite) {
        let inner = &*self.inner;
        let single_threaded = inner.lock_disabled.load(Ordering::Relaxed);

        let (report_caller, resolver, pool, unlocked_formatter) = {
            let state = inner.state.lock();
            (
                state.report_caller,
                Arc::clone(&state.caller_resolver),
                state.buffer_pool(),
                single_threaded.then(|| Arc::clone(&state.formatter)),
            )
        };

        if report_caller {
            record.set_caller(resolver.resolve(site));
        }

        let mut buf = pool.get();
        match unlocked_formatter {
            Some(formatter) => match formatter.format(record, &mut buf) {
                Ok(()) => inner
                    .state
                    .lock()
                    .write_bytes(record.level(), &buf, &inner.metrics),
                Err(e) => report_format_error(&e, &inner.metrics),
            },
            None => {
                let mut state = inner.state.lock();
                match state.formatter.format(record, &mut buf) {
                    Ok(()) => state.write_bytes(record.level(), &buf, &inner.metrics),
                    Err(e) => report_format_error(&e, &inner.metrics),
                }
            }
        }
        pool.put(buf);
    }

    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Entry
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.derive(|entry| entry.with_field(key, value))
    }

    #[must_use]
    pub fn with_fields<I, K, V>(&self, fields: I) -> Entry
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.derive(|entry| entry.with_fields(fields))
    }

    #[must_use]
    pub fn with_error<E: fmt::Display + ?Sized>(&self, err: &E) -> Entry {
        self.derive(|entry| entry.with_error(err))
    }

    #[must_use]
    pub fn with_context<C: Any + Send + Sync>(&self, ctx: C) -> Entry {
        self.derive(|entry| entry.with_context(ctx))
    }

    #[must_use]
    pub fn with_time(&self, time: DateTime<Local>) -> Entry {
        self.derive(|entry| entry.with_time(time))
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if self.is_level_enabled(level) {
            let entry = self.new_entry();
            entry.emit(level, message.into(), CallSite::here());
            self.release_entry(entry);
        }
    }

    /// Log the message produced by `f`. `f` only runs when `level` is
    /// enabled.
    #[track_caller]
    pub fn log_fn<F, M>(&self, level: LogLevel, f: F)
    where
        F: FnOnce() -> M,
        M: Into<String>,
    {
        if self.is_level_enabled(level) {
            let entry = self.new_entry();
            entry.emit(level, f().into(), CallSite::here());
            self.release_entry(entry);
        }
    }

    #[track_caller]
    pub fn log_args(&self, level: LogLevel, args: &[Arg<'_>]) {
        if self.is_level_enabled(level) {
            let entry = self.new_entry();
            entry.emit(level, sprint(args), CallSite::here());
            self.release_entry(entry);
        }
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __log_args(&self, level: LogLevel, module_path: &'static str, args: &[Arg<'_>]) {
        if self.is_level_enabled(level) {
            let entry = self.new_entry();
            let site = CallSite::here().with_module(module_path);
            entry.emit(level, sprint(args), site);
            self.release_entry(entry);
        }
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn __fatal_args(&self, module_path: &'static str, args: &[Arg<'_>]) {
        self.__log_args(LogLevel::Fatal, module_path, args);
        self.exit(1);
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

    /// Log at `Fatal`, then exit with status 1 through the exit function.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
        self.exit(1);
    }

    /// Log at `Panic`, then panic with the finalized [`Entry`] as payload.
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) {
        self.log(LogLevel::Panic, message);
    }
}

fn report_format_error(e: &dyn std::error::Error, metrics: &LoggerMetrics) {
    eprintln!("[LOGGER ERROR] Failed to format entry: {}", e);
    metrics.record_dropped();
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("single_threaded", &self.inner.lock_disabled.load(Ordering::Relaxed))
            .field("metrics", &self.inner.metrics)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use fieldlog::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .formatter(TextFormatter::new().with_disable_timestamp(true))
///     .output(std::io::stdout())
///     .report_caller(true)
///     .build();
/// assert_eq!(logger.level(), LogLevel::Debug);
/// ```
pub struct LoggerBuilder {
    level: LogLevel,
    output: Option<Box<dyn Write + Send>>,
    formatter: Option<Arc<dyn Formatter>>,
    report_caller: bool,
    caller_resolver: Option<Arc<dyn CallerResolver>>,
    buffer_pool: Option<Arc<dyn BufferPool>>,
    exit_func: Option<ExitFunc>,
    rotation: Option<RotationConfig>,
    single_threaded: bool,
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("level", &self.level)
            .field("report_caller", &self.report_caller)
            .field("rotation", &self.rotation)
            .field("single_threaded", &self.single_threaded)
            .finish_non_exhaustive()
    }
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            output: None,
            formatter: None,
            report_caller: false,
            caller_resolver: None,
            buffer_pool: None,
            exit_func: None,
            rotation: None,
            single_threaded: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Output sink; ignored while file output is enabled.
    #[must_use = "builder methods return a new value"]
    pub fn output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn report_caller(mut self, enabled: bool) -> Self {
        self.report_caller = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_resolver<R: CallerResolver + 'static>(mut self, resolver: R) -> Self {
        self.caller_resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn buffer_pool(mut self, pool: Arc<dyn BufferPool>) -> Self {
        self.buffer_pool = Some(pool);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exit_func<F: Fn(i32) + Send + Sync + 'static>(mut self, exit_func: F) -> Self {
        self.exit_func = Some(Arc::new(exit_func));
        self
    }

    /// Write to a rotating file instead of the output sink.
    #[must_use = "builder methods return a new value"]
    pub fn rotation(mut self, config: RotationConfig) -> Self {
        self.rotation = Some(config);
        self
    }

    /// See [`Logger::set_no_lock`].
    #[must_use = "builder methods return a new value"]
    pub fn single_threaded(mut self, enabled: bool) -> Self {
        self.single_threaded = enabled;
        self
    }

    /// Build the Logger. Log files are opened on the first write.
    pub fn build(mut self) -> Logger {
        let file_output = self.rotation.is_some();
        let rotation = RotatingFile::new(self.rotation.take().unwrap_or_default());
        self.assemble(rotation, file_output)
    }

    /// Build the Logger, validating the rotation configuration and opening
    /// its files up front.
    ///
    /// # Errors
    ///
    /// Returns error if the rotation configuration is invalid or the log
    /// files cannot be opened
    pub fn try_build(mut self) -> Result<Logger> {
        match self.rotation.take() {
            Some(config) => {
                let rotation = RotatingFile::open(config)?;
                Ok(self.assemble(rotation, true))
            }
            None => Ok(self.build()),
        }
    }

    fn assemble(self, rotation: RotatingFile, file_output: bool) -> Logger {
        let state = LoggerState {
            out: self.output.unwrap_or_else(|| Box::new(io::stderr())),
            formatter: self
                .formatter
                .unwrap_or_else(|| Arc::new(TextFormatter::new())),
            report_caller: self.report_caller,
            caller_resolver: self
                .caller_resolver
                .unwrap_or_else(|| Arc::new(LocationResolver)),
            buffer_pool: self.buffer_pool,
            exit_func: self.exit_func.unwrap_or_else(process_exit),
            file_output,
            rotation,
        };

        Logger {
            inner: Arc::new(LoggerInner {
                level: AtomicU32::new(self.level as u32),
                lock_disabled: AtomicBool::new(self.single_threaded),
                state: Mutex::new(state),
                entry_pool: EntryPool::new(),
                metrics: LoggerMetrics::new(),
            }),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
