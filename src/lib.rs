//! `paraedit` - paragraph text editing core
//!
//! A word-wrapping text editor model: paragraph storage with glyph-indexed
//! UTF-8 strings, a document with atomic replace, undo/redo and change
//! observers, a pixel layout engine driven by a pluggable measurement
//! oracle, and a keyboard/mouse controller with a deterministic fuzz
//! harness.
//!
//! # Quick Start
//!
//! ```
//! use paraedit::{Document, Editor, EditorOptions, KeyCode, KeyEvent, Pg};
//!
//! let doc = Document::from_utf8(b"ab\ncd").unwrap();
//! let mut editor = Editor::new(doc, EditorOptions::default());
//!
//! editor.move_to(Pg::new(0, 1));
//! editor.paste("X");
//! assert_eq!(editor.text(), "aXb\ncd");
//!
//! editor.key_pressed(KeyEvent::key(KeyCode::Backspace));
//! assert!(editor.undo());
//! assert_eq!(editor.text(), "aXb\ncd");
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)] // No unsafe code is expected anywhere
#![allow(clippy::cast_possible_truncation)] // Intentional index/pixel casts
#![allow(clippy::cast_sign_loss)] // Positions are validated before casting
#![allow(clippy::cast_possible_wrap)] // Paragraph and glyph counts fit in i32
#![allow(clippy::module_name_repetitions)] // Allow text::TextMeasure etc
#![allow(clippy::struct_excessive_bools)] // Options carry several mode flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::similar_names)] // pg/pr, rn0/rn1 mirror the domain terms

pub mod editor;
pub mod error;
pub mod event;
pub mod layout;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{
    LogLevel, clear_event_callback, clear_log_callback, emit_event, emit_log, set_event_callback,
    set_log_callback,
};

// Re-export text model types
pub use text::{Change, Document, DocumentObserver, Pg, Pr, Range, SubscriptionId, Text};

// Re-export layout types
pub use layout::{LayoutCache, Mapper, MonospaceMetrics, Point, Run, TextMeasure};

// Re-export controller types
pub use editor::{
    Clipboard, Command, Editor, EditorOptions, Fuzzer, KeyCode, KeyEvent, KeyModifiers,
    MemoryClipboard, MouseButton, MouseButtons,
};
pub use unicode::WidthMethod;
