//! Core logger types and traits

pub mod args;
pub mod caller;
pub mod config;
pub mod entry;
pub mod error;
pub mod fields;
pub mod formatter;
pub mod global;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod pool;
pub mod text_formatter;
pub mod timestamp;

pub use args::{sprint, Arg, ToArg};
pub use caller::{CallSite, CallerResolver, Frame, LocationResolver};
pub use config::{LoggerConfig, TextFormatterConfig};
pub use entry::{Entry, ERROR_KEY};
pub use error::{LoggerError, Result};
pub use fields::{FieldFn, FieldValue, Fields};
pub use formatter::{FieldKey, FieldMap, Formatter};
pub use global::{
    defer_exit_handler, exit, register_exit_handler, run_exit_handlers, set_standard_logger,
    standard_logger, ExitHandler,
};
pub use log_level::{LogLevel, ALL_LEVELS};
pub use logger::{ExitFunc, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use pool::{default_buffer_pool, BufferPool, SharedBufferPool};
pub use text_formatter::{CallerPrettyfier, SortingFunc, TextFormatter};
pub use timestamp::TimestampFormat;
