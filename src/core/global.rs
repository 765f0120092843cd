//! Process-wide default logger and exit handlers
//!
//! The standard logger is created on first use with default settings, unless
//! one was installed earlier with [`set_standard_logger`].
//!
//! Exit handlers run, in registration order, when the process leaves through
//! [`exit`]. A logger's default exit function goes through [`exit`] as well,
//! so `fatal` runs them too.

use super::error::{LoggerError, Result};
use super::logger::Logger;
use parking_lot::{const_mutex, Mutex};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

/// Callback run before the process exits.
pub type ExitHandler = Arc<dyn Fn() + Send + Sync>;

static STANDARD_LOGGER: OnceLock<Logger> = OnceLock::new();
static EXIT_HANDLERS: Mutex<Vec<ExitHandler>> = const_mutex(Vec::new());

/// The shared default logger.
pub fn standard_logger() -> &'static Logger {
    STANDARD_LOGGER.get_or_init(Logger::new)
}

/// Install `logger` as the standard logger.
///
/// # Errors
///
/// Returns [`LoggerError::AlreadyInitialized`] if the standard logger was
/// already installed or used
pub fn set_standard_logger(logger: Logger) -> Result<()> {
    STANDARD_LOGGER
        .set(logger)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// Append `handler` to the exit handlers.
pub fn register_exit_handler<F>(handler: F)
where
    F: Fn() + Send + Sync + 'static,
{
    EXIT_HANDLERS.lock().push(Arc::new(handler));
}

/// Put `handler` in front of the exit handlers registered so far.
pub fn defer_exit_handler<F>(handler: F)
where
    F: Fn() + Send + Sync + 'static,
{
    EXIT_HANDLERS.lock().insert(0, Arc::new(handler));
}

/// Run every exit handler in order. A handler that panics is reported on
/// stderr and the rest still run.
pub fn run_exit_handlers() {
    // Handlers may register further handlers; run a snapshot without the lock.
    let handlers = EXIT_HANDLERS.lock().clone();
    for handler in handlers {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler())) {
            eprintln!(
                "[LOGGER ERROR] Exit handler error: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}

/// Run the exit handlers, then terminate the process with `code`.
pub fn exit(code: i32) -> ! {
    run_exit_handlers();
    std::process::exit(code)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
