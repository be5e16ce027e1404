//! Paragraph text storage and the editable document.
//!
//! Text is stored as a list of paragraphs, each a UTF-8 string with a
//! glyph-to-byte table. Carets are addressed by [`Pg`] (paragraph, glyph),
//! so moving across multi-byte characters never needs a scan from the start
//! of the document.
//!
//! Key types:
//!
//! - [`Text`]: paragraph sequence, split on `\n`
//! - [`GlyphString`]: one paragraph with its glyph offsets
//! - [`Document`]: atomic replace, undo/redo and change notification
//! - [`Range`]: anchor/caret pair of positions
//!
//! # Examples
//!
//! ## Parsing
//!
//! ```
//! use paraedit::text::{Pg, Text};
//!
//! let text = Text::parse("héllo\nworld".as_bytes()).unwrap();
//! assert_eq!(text.np(), 2);
//! assert_eq!(text.glyphs(0), 5);
//! assert_eq!(text.paragraph(0).bytes(), 6);
//! assert_eq!(text.end(), Pg::new(1, 5));
//! ```
//!
//! ## Observing edits
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use paraedit::text::{Change, Document, DocumentObserver, Pg, Range, Text};
//!
//! #[derive(Default)]
//! struct Counter(usize);
//!
//! impl DocumentObserver for Counter {
//!     fn after(&mut self, _text: &Text<'_>, change: &Change<'_>) {
//!         if change.ok {
//!             self.0 += 1;
//!         }
//!     }
//! }
//!
//! let counter = Rc::new(RefCell::new(Counter::default()));
//! let mut doc = Document::from_utf8(b"ab").unwrap();
//! doc.subscribe(&counter);
//! doc.replace(Range::caret(Pg::new(0, 1)), b"\n").unwrap();
//! assert_eq!(doc.np(), 2);
//! assert_eq!(counter.borrow().0, 1);
//! ```

mod document;
mod position;
mod storage;
mod string;

pub use document::{Change, Document, DocumentObserver, SubscriptionId};
pub use position::{Pg, Pr, Range};
pub use storage::{Text, end_of_insert};
pub use string::GlyphString;
