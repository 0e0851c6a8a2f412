//! Simple leveled logging module.

use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Log level for filtering messages.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Initialize the logger with the given minimum level.
pub fn init(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns true if the given level should be logged.
#[inline]
fn enabled(level: Level) -> bool {
    level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Logs a message with an optional identifier prefix.
pub fn log_with_id(level: Level, id: Option<&str>, message: &str) {
    if !enabled(level) {
        return;
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    match id {
        Some(id) => eprintln!(
            "{}.{:03} [{:5}] [{}] {}",
            now.as_secs(),
            now.subsec_millis(),
            level,
            id,
            message
        ),
        None => eprintln!(
            "{}.{:03} [{:5}] {}",
            now.as_secs(),
            now.subsec_millis(),
            level,
            message
        ),
    }
}

/// Logs an info-level message without an identifier.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::utils::log::log_with_id($crate::utils::log::Level::Info, None, &format!($($arg)*))
    };
}

/// Logs a warning-level message without an identifier.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::utils::log::log_with_id($crate::utils::log::Level::Warn, None, &format!($($arg)*))
    };
}

/// Logs an error-level message without an identifier.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::utils::log::log_with_id($crate::utils::log::Level::Error, None, &format!($($arg)*))
    };
}

/// Thread-safe logger instance with an identifier prefix.
///
/// Each logger carries an ID that is prepended to its messages, allowing
/// differentiation between components. The engine logs every block
/// rejection cause through one of these, so operators can tell an invalid
/// block from a store fault without parsing return values.
#[derive(Clone)]
pub struct Logger {
    pub id: Arc<str>,
}

impl Logger {
    /// Creates a new logger with the given identifier.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self { id: id.into() }
    }

    /// Logs an info-level message.
    pub fn info(&self, message: &str) {
        log_with_id(Level::Info, Some(&self.id), message);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, message: &str) {
        log_with_id(Level::Warn, Some(&self.id), message);
    }

    /// Logs an error-level message.
    pub fn error(&self, message: &str) {
        log_with_id(Level::Error, Some(&self.id), message);
    }
}
