//! # fieldlog
//!
//! Leveled, structured logging with `key=value` text output and size-based
//! file rotation.
//!
//! ## Features
//!
//! - **Structured fields**: attach context with `with_field`/`with_fields`;
//!   derived entries never affect their parent
//! - **Text formatter**: sorted, quoted-when-needed `key=value` records
//! - **Rotating files**: size-bounded active file, timestamped backups
//!   archived as zip (or gzip), plus an `error-` companion file
//! - **Thread safe**: one lock per logger, lock-free level checks, pooled
//!   render buffers
//!
//! ```
//! use fieldlog::prelude::*;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .output(sink.clone())
//!     .formatter(TextFormatter::new().with_disable_timestamp(true))
//!     .build();
//!
//! logger
//!     .with_fields([("user", "alice"), ("action", "login")])
//!     .info("user event");
//!
//! assert_eq!(sink.lines()[0], r#"level=info msg="user event" action=login user=alice"#);
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ArchiveFormat, MemorySink, RotatingFile, RotationConfig};
    pub use crate::core::{
        standard_logger, BufferPool, CallerResolver, Entry, FieldKey, FieldMap, FieldValue,
        Fields, Formatter, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerMetrics, Result, TextFormatter, TimestampFormat,
    };
}

pub use crate::appenders::{
    ArchiveFormat, MemorySink, RotatingFile, RotationConfig, RotationReport, WriteReport,
};
pub use crate::core::{
    default_buffer_pool, defer_exit_handler, exit, register_exit_handler, run_exit_handlers,
    set_standard_logger, sprint, standard_logger, Arg, BufferPool, CallSite, CallerPrettyfier,
    CallerResolver, Entry, ExitFunc, ExitHandler, FieldFn, FieldKey, FieldMap,
    FieldValue, Fields, Formatter, Frame, LocationResolver, LogLevel, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, Result, SharedBufferPool, SortingFunc,
    TextFormatter, TextFormatterConfig, TimestampFormat, ToArg, ALL_LEVELS, ERROR_KEY,
};
