//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Once;

use paraedit::{Document, Editor, EditorOptions, LogLevel, MonospaceMetrics, set_log_callback};

/// Install a test-friendly tracing subscriber and route library
/// diagnostics into it. Safe to call from every test.
pub fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        set_log_callback(|level, message| match level {
            LogLevel::Debug => tracing::debug!(target: "paraedit", "{message}"),
            LogLevel::Info => tracing::info!(target: "paraedit", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "paraedit", "{message}"),
            LogLevel::Error => tracing::error!(target: "paraedit", "{message}"),
        });
    });
}

/// Editor over `text` with 10x10 pixel cells and a `columns` x `rows`
/// viewport.
pub fn editor(text: &str, columns: i32, rows: i32) -> Editor<'static> {
    let doc = Document::from_utf8(text.as_bytes()).expect("valid UTF-8");
    Editor::with_metrics(
        doc,
        EditorOptions::default().viewport(columns * 10, rows * 10),
        Box::new(MonospaceMetrics::new(10, 10)),
    )
}
