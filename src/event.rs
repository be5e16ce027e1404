//! Event and log callback system.
//!
//! The library never writes to stdout or stderr. Hosts that want
//! diagnostics from document mutations or the fuzz harness install a
//! callback here.

use std::sync::{Mutex, OnceLock};

/// Log level for diagnostic callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

type EventCallback = Box<dyn Fn(&str, &str) + Send + Sync + 'static>;
type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

fn event_callback() -> &'static Mutex<Option<EventCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<EventCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

fn log_callback() -> &'static Mutex<Option<LogCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<LogCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

/// Set the global event callback, replacing any previous one.
///
/// Events carry a dotted name such as `"fuzz.started"` and a short
/// `key=value` payload.
pub fn set_event_callback<F>(callback: F)
where
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    // A poisoned lock only means a previous callback panicked.
    let mut guard = event_callback()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    *guard = Some(Box::new(callback));
}

/// Remove the global event callback.
pub fn clear_event_callback() {
    if let Ok(mut guard) = event_callback().lock() {
        *guard = None;
    }
}

/// Emit an event to the registered callback.
pub fn emit_event(name: &str, data: &str) {
    if let Ok(guard) = event_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(name, data);
        }
    }
}

/// Set the global log callback, replacing any previous one.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    let mut guard = log_callback()
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    *guard = Some(Box::new(callback));
}

/// Remove the global log callback.
pub fn clear_log_callback() {
    if let Ok(mut guard) = log_callback().lock() {
        *guard = None;
    }
}

/// Emit a log message.
pub fn emit_log(level: LogLevel, message: &str) {
    if let Ok(guard) = log_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(level, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    // Both callbacks are process globals; keep the assertions in one test so
    // parallel test threads do not swap callbacks underneath each other.
    #[test]
    fn test_callbacks() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = Arc::clone(&called);
        set_event_callback(move |name, data| {
            if name == "event.test" {
                assert_eq!(data, "k=v");
                called_clone.store(true, Ordering::SeqCst);
            }
        });
        emit_event("event.test", "k=v");
        assert!(called.load(Ordering::SeqCst));

        let warnings = Arc::new(AtomicUsize::new(0));
        let warnings_clone = Arc::clone(&warnings);
        set_log_callback(move |level, msg| {
            if level == LogLevel::Warn && msg == "event.test warn" {
                warnings_clone.fetch_add(1, Ordering::SeqCst);
            }
        });
        emit_log(LogLevel::Warn, "event.test warn");
        emit_log(LogLevel::Info, "event.test warn");
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_level_order() {
        assert!(LogLevel::Debug < LogLevel::Error);
        assert!(LogLevel::Warn > LogLevel::Info);
    }
}
