//! Logging macros
//!
//! The macros take a [`Logger`](crate::Logger) or an [`Entry`](crate::Entry)
//! followed by any number of operands, joined with print semantics (see
//! [`sprint`](crate::sprint)). Operands are only rendered when the level is
//! enabled, and the calling module is recorded for caller reporting.
//!
//! # Examples
//!
//! ```
//! use fieldlog::prelude::*;
//! use fieldlog::{info, warn};
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .output(sink.clone())
//!     .formatter(TextFormatter::new().with_disable_timestamp(true))
//!     .build();
//!
//! let port = 8080;
//! info!(logger, "listening on :", port);
//! warn!(logger.with_field("attempt", 3), "retrying");
//!
//! assert_eq!(
//!     sink.lines(),
//!     vec![
//!         r#"level=info msg="listening on :8080""#,
//!         "level=warning msg=retrying attempt=3",
//!     ]
//! );
//! ```

/// Log at an explicit level.
///
/// ```
/// # use fieldlog::prelude::*;
/// # let logger = Logger::new();
/// use fieldlog::log;
/// log!(logger, LogLevel::Debug, "cache miss for ", "user:", 42);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:expr),+ $(,)?) => {
        $logger.__log_args(
            $level,
            ::core::module_path!(),
            &[$($crate::ToArg::to_arg(&$arg)),+],
        )
    };
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg),+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg),+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg),+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg),+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg),+)
    };
}

/// Log at `Fatal`, then call the logger's exit function with status 1.
///
/// The exit function runs even when `Fatal` is filtered out.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.__fatal_args(
            ::core::module_path!(),
            &[$($crate::ToArg::to_arg(&$arg)),+],
        )
    };
}

/// Log at `Panic`, then panic with the record as payload.
#[macro_export]
macro_rules! log_panic {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Panic, $($arg),+)
    };
}

/// Build a [`Fields`](crate::Fields) map.
///
/// ```
/// use fieldlog::fields;
///
/// let fields = fields! { "user" => "alice", "attempts" => 3 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(fields.insert($key, $value);)+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemorySink;
    use crate::core::{LogLevel, Logger, TextFormatter};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn capture() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .level(LogLevel::Debug)
            .output(sink.clone())
            .formatter(TextFormatter::new().with_disable_timestamp(true))
            .build();
        (logger, sink)
    }

    #[test]
    fn test_level_macros() {
        let (logger, sink) = capture();
        trace!(logger, "hidden");
        debug!(logger, "d");
        info!(logger, "i");
        warn!(logger, "w");
        error!(logger, "e");

        assert_eq!(
            sink.lines(),
            vec![
                "level=debug msg=d",
                "level=info msg=i",
                "level=warning msg=w",
                "level=error msg=e",
            ]
        );
    }

    #[test]
    fn test_print_style_joining() {
        let (logger, sink) = capture();
        let name = String::from("db");
        info!(logger, name, 1, 2, "x", 3.5);

        assert_eq!(sink.lines(), vec![r#"level=info msg="db1 2x3.5""#]);
    }

    #[test]
    fn test_macro_on_entry() {
        let (logger, sink) = capture();
        let entry = logger.with_field("k", "v");
        info!(entry, "from entry");

        assert_eq!(sink.lines(), vec![r#"level=info msg="from entry" k=v"#]);
    }

    #[test]
    fn test_macro_records_module() {
        let (logger, sink) = capture();
        logger.set_report_caller(true);
        info!(logger, "here");

        let line = &sink.lines()[0];
        assert!(line.contains(r#"func="fieldlog::macros::tests""#), "{}", line);
        assert!(line.contains("macros.rs:"), "{}", line);
    }

    #[test]
    fn test_fatal_macro_exits() {
        let (logger, _sink) = capture();
        let codes = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&codes);
        logger.set_exit_func(move |code| recorded.lock().push(code));

        fatal!(logger, "bye");
        assert_eq!(*codes.lock(), vec![1]);
    }

    #[test]
    fn test_fields_macro() {
        let fields = fields! { "a" => 1, "b" => "two" };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("b").and_then(|v| v.as_str()), Some("two"));
    }
}
