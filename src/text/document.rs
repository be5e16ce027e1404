//! Mutable document with undo/redo and change notification.
//!
//! Every mutation goes through [`Document::replace`] (or
//! [`Document::replace_text`]), which splices the range, records the inverse
//! edit and notifies subscribers before and after the change. Subscribers
//! are held weakly; dropping an observer is enough to stop notifications.
//!
//! # Example
//!
//! ```
//! use paraedit::text::{Document, Pg, Range};
//!
//! let mut doc = Document::from_utf8(b"ab\ncd").unwrap();
//! let caret = Range::caret(Pg::new(0, 1));
//! let x = doc.replace(caret, b"X").unwrap();
//! assert_eq!(doc.to_string(), "aXb\ncd");
//! assert_eq!(x.to, Pg::new(0, 2));
//!
//! assert!(doc.undo());
//! assert_eq!(doc.to_string(), "ab\ncd");
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::position::Range;
use super::storage::Text;
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};

/// Details of a completed (or failed) mutation passed to
/// [`DocumentObserver::after`].
#[derive(Clone, Copy, Debug)]
pub struct Change<'c> {
    /// Whether the splice was applied.
    pub ok: bool,
    /// The ordered range that was replaced.
    pub range: Range,
    /// Range now occupied by the replacement text.
    pub extended: Range,
    /// Replacement text, `None` when it failed to parse.
    pub text: Option<&'c Text<'c>>,
    /// First paragraph touched, in post-mutation indices.
    pub first: i32,
    /// Last paragraph touched (inclusive), in post-mutation indices.
    pub last: i32,
    /// Paragraphs removed by the splice.
    pub deleted: i32,
    /// Paragraphs added by the splice.
    pub inserted: i32,
}

/// Receives notifications around every document mutation.
///
/// `before` sees the text as it is prior to the splice. `after` is always
/// delivered once for each `before`, with `change.ok == false` and zero
/// deltas when the mutation was rejected.
pub trait DocumentObserver {
    fn before(&mut self, _text: &Text<'_>, _range: Range) {}
    fn after(&mut self, _text: &Text<'_>, _change: &Change<'_>) {}
}

/// Handle returned by [`Document::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A reversible edit: applying `text` over `range` undoes (or redoes) the
/// edit that produced it.
#[derive(Clone, Debug)]
struct EditRecord {
    range: Range,
    text: Text<'static>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Apply {
    Fresh,
    Undo,
    Redo,
}

/// Undo/redo stacks.
#[derive(Clone, Debug, Default)]
struct History {
    undo_stack: Vec<EditRecord>,
    redo_stack: Vec<EditRecord>,
}

impl History {
    fn record(&mut self, record: EditRecord, mode: Apply) {
        match mode {
            Apply::Fresh => {
                self.undo_stack.push(record);
                self.redo_stack.clear();
            }
            Apply::Undo => self.redo_stack.push(record),
            Apply::Redo => self.undo_stack.push(record),
        }
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[derive(Clone, Copy, Debug)]
struct Delta {
    extended: Range,
    first: i32,
    last: i32,
    deleted: i32,
    inserted: i32,
}

type Subscriber = (SubscriptionId, Weak<RefCell<dyn DocumentObserver>>);

/// A paragraph document.
pub struct Document<'a> {
    text: Text<'a>,
    history: History,
    observers: Vec<Subscriber>,
    next_id: u64,
}

impl Default for Document<'_> {
    fn default() -> Self {
        Self::with_text(Text::default())
    }
}

impl<'a> Document<'a> {
    /// Create a document that borrows `bytes`. The buffer must outlive the
    /// document; paragraphs are copied only when they are replaced.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        Ok(Self::with_text(Text::parse(bytes)?))
    }

    /// Create a document that owns a copy of `bytes`.
    pub fn from_utf8(bytes: &[u8]) -> Result<Document<'static>> {
        Ok(Document::with_text(Text::parse(bytes)?.into_owned()))
    }

    /// Create a document from existing paragraphs.
    #[must_use]
    pub fn with_text(text: Text<'a>) -> Self {
        Self {
            text,
            history: History::default(),
            observers: Vec::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn text(&self) -> &Text<'a> {
        &self.text
    }

    /// Number of paragraphs.
    #[must_use]
    pub fn np(&self) -> usize {
        self.text.np()
    }

    /// Replace `range` with the UTF-8 `bytes`, which may contain `\n`.
    ///
    /// Returns the range occupied by the inserted text. Fails with
    /// [`Error::OutOfRange`] before any notification when an endpoint is not
    /// addressable, and with [`Error::InvalidEncoding`] (after notifying
    /// `ok == false`) when `bytes` is malformed.
    pub fn replace(&mut self, range: Range, bytes: &[u8]) -> Result<Range> {
        let range = self.validate(range)?;
        self.notify_before(range);
        match Text::parse(bytes) {
            Ok(insert) => {
                let outcome = self.apply(range, &insert, Apply::Fresh);
                self.finish(range, Some(&insert), outcome)
            }
            Err(e) => self.finish(range, None, Err(e)),
        }
    }

    /// Replace `range` with already parsed paragraphs.
    pub fn replace_text(&mut self, range: Range, text: &Text<'_>) -> Result<Range> {
        let range = self.validate(range)?;
        self.notify_before(range);
        let outcome = self.apply(range, text, Apply::Fresh);
        self.finish(range, Some(text), outcome)
    }

    /// Revert the most recent edit. Returns `false` when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.history.undo_stack.pop() else {
            emit_log(LogLevel::Debug, "undo: history is empty");
            return false;
        };
        self.revert(record, Apply::Undo)
    }

    /// Re-apply the most recently undone edit. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.history.redo_stack.pop() else {
            emit_log(LogLevel::Debug, "redo: history is empty");
            return false;
        };
        self.revert(record, Apply::Redo)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.history.redo_stack.len()
    }

    /// Drop all undo and redo records.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Register `observer` for change notifications.
    pub fn subscribe<O: DocumentObserver + 'static>(
        &mut self,
        observer: &Rc<RefCell<O>>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let weak = Rc::downgrade(observer);
        let weak: Weak<RefCell<dyn DocumentObserver>> = weak;
        self.observers.push((id, weak));
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscribers(&self) -> usize {
        self.observers
            .iter()
            .filter(|(_, w)| w.strong_count() > 0)
            .count()
    }

    /// Text inside `range` as a string.
    pub fn copy(&self, range: Range) -> Result<String> {
        let r = self.validate(range)?;
        let mut out = String::with_capacity(self.text.byte_length(r));
        self.text.write_range(r, &mut out);
        Ok(out)
    }

    /// Text inside `range` as paragraphs.
    pub fn copy_text(&self, range: Range) -> Result<Text<'static>> {
        let r = self.validate(range)?;
        self.text.copy_range(r)
    }

    /// Bytes needed to hold `range` as UTF-8, including a NUL terminator.
    pub fn utf8bytes(&self, range: Range) -> Result<usize> {
        let r = self.validate(range)?;
        Ok(self.text.byte_length(r) + 1)
    }

    /// Write the whole document, paragraphs joined by `\n` and followed by a
    /// NUL byte, into `buf`.
    ///
    /// With `None`, fails with [`Error::MoreData`] carrying the required
    /// size. Returns the number of bytes written, terminator included.
    pub fn save(&self, buf: Option<&mut [u8]>) -> Result<usize> {
        let all = self.text.all();
        let required = self.text.byte_length(all) + 1;
        let Some(buf) = buf else {
            return Err(Error::MoreData { required });
        };
        if buf.len() < required {
            return Err(Error::InsufficientBuffer {
                required,
                provided: buf.len(),
            });
        }
        let mut at = 0;
        for (i, p) in self.text.paragraphs().iter().enumerate() {
            if i > 0 {
                buf[at] = b'\n';
                at += 1;
            }
            buf[at..at + p.bytes()].copy_from_slice(p.as_bytes());
            at += p.bytes();
        }
        buf[at] = 0;
        Ok(required)
    }

    fn validate(&self, range: Range) -> Result<Range> {
        let r = range.ordered();
        Ok(Range::new(self.text.check(r.from)?, self.text.check(r.to)?))
    }

    fn apply(&mut self, range: Range, insert: &Text<'_>, mode: Apply) -> Result<Delta> {
        let removed = self.text.copy_range(range)?;
        let end = self.text.splice(range, insert)?;
        let extended = Range::new(range.from, end);
        let inserted = insert.np() as i32 - 1;
        self.history.record(
            EditRecord {
                range: extended,
                text: removed,
            },
            mode,
        );
        Ok(Delta {
            extended,
            first: range.from.pn,
            last: range.from.pn + inserted,
            deleted: range.to.pn - range.from.pn,
            inserted,
        })
    }

    fn revert(&mut self, record: EditRecord, mode: Apply) -> bool {
        self.notify_before(record.range);
        let outcome = self.apply(record.range, &record.text, mode);
        let ok = self
            .finish(record.range, Some(&record.text), outcome)
            .is_ok();
        if !ok {
            match mode {
                Apply::Undo => self.history.undo_stack.push(record),
                Apply::Redo => self.history.redo_stack.push(record),
                Apply::Fresh => {}
            }
        }
        ok
    }

    fn finish(
        &mut self,
        range: Range,
        text: Option<&Text<'_>>,
        outcome: Result<Delta>,
    ) -> Result<Range> {
        let change = match &outcome {
            Ok(d) => Change {
                ok: true,
                range,
                extended: d.extended,
                text,
                first: d.first,
                last: d.last,
                deleted: d.deleted,
                inserted: d.inserted,
            },
            Err(e) => {
                emit_log(LogLevel::Warn, &format!("replace {range} failed: {e}"));
                Change {
                    ok: false,
                    range,
                    extended: range,
                    text,
                    first: range.from.pn,
                    last: range.from.pn,
                    deleted: 0,
                    inserted: 0,
                }
            }
        };
        self.notify_after(&change);
        outcome.map(|d| d.extended)
    }

    fn live_observers(&mut self) -> Vec<Rc<RefCell<dyn DocumentObserver>>> {
        self.observers.retain(|(_, w)| w.strong_count() > 0);
        self.observers.iter().filter_map(|(_, w)| w.upgrade()).collect()
    }

    fn notify_before(&mut self, range: Range) {
        for observer in self.live_observers() {
            observer.borrow_mut().before(&self.text, range);
        }
    }

    fn notify_after(&mut self, change: &Change<'_>) {
        for observer in self.live_observers() {
            observer.borrow_mut().after(&self.text, change);
        }
    }
}

impl<'a> From<Text<'a>> for Document<'a> {
    fn from(text: Text<'a>) -> Self {
        Self::with_text(text)
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.text, f)
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text)
            .field("undo", &self.history.undo_stack.len())
            .field("redo", &self.history.redo_stack.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::position::Pg;

    fn r(a: (i32, i32), b: (i32, i32)) -> Range {
        Range::new(Pg::new(a.0, a.1), Pg::new(b.0, b.1))
    }

    #[derive(Default)]
    struct Recorder {
        np_before: Vec<usize>,
        changes: Vec<(bool, i32, i32, i32, i32, Range)>,
    }

    impl DocumentObserver for Recorder {
        fn before(&mut self, text: &Text<'_>, _range: Range) {
            self.np_before.push(text.np());
        }

        fn after(&mut self, text: &Text<'_>, c: &Change<'_>) {
            if c.ok {
                let np = *self.np_before.last().unwrap();
                assert_eq!(
                    text.np() as i32,
                    np as i32 - c.deleted + c.inserted,
                    "paragraph delta must match"
                );
            }
            self.changes
                .push((c.ok, c.first, c.last, c.deleted, c.inserted, c.extended));
        }
    }

    #[test]
    fn test_replace_inline() {
        let mut doc = Document::from_utf8(b"ab\ncd").unwrap();
        let rec = Rc::new(RefCell::new(Recorder::default()));
        doc.subscribe(&rec);

        let x = doc.replace(r((0, 1), (0, 1)), b"X").unwrap();
        assert_eq!(doc.to_string(), "aXb\ncd");
        assert_eq!(doc.np(), 2);
        assert_eq!(x.to, Pg::new(0, 2));

        let rec = rec.borrow();
        assert_eq!(rec.np_before, vec![2]);
        assert_eq!(rec.changes[0], (true, 0, 0, 0, 0, r((0, 1), (0, 2))));
    }

    #[test]
    fn test_replace_splits_paragraph() {
        let mut doc = Document::from_utf8(b"ab").unwrap();
        let rec = Rc::new(RefCell::new(Recorder::default()));
        doc.subscribe(&rec);

        let x = doc.replace(r((0, 1), (0, 1)), b"\n").unwrap();
        assert_eq!(doc.to_string(), "a\nb");
        assert_eq!(doc.np(), 2);
        assert_eq!(x.to, Pg::new(1, 0));
        assert_eq!(rec.borrow().changes[0], (true, 0, 1, 0, 1, r((0, 1), (1, 0))));
    }

    #[test]
    fn test_replace_joins_paragraphs() {
        let mut doc = Document::from_utf8(b"one\ntwo\nthree").unwrap();
        let rec = Rc::new(RefCell::new(Recorder::default()));
        doc.subscribe(&rec);

        doc.replace(r((2, 1), (0, 3)), b"").unwrap();
        assert_eq!(doc.to_string(), "onehree");
        assert_eq!(rec.borrow().changes[0], (true, 0, 0, 2, 0, r((0, 3), (0, 3))));
    }

    #[test]
    fn test_out_of_range_is_rejected_without_notification() {
        let mut doc = Document::from_utf8(b"ab").unwrap();
        let rec = Rc::new(RefCell::new(Recorder::default()));
        doc.subscribe(&rec);

        let err = doc.replace(r((0, 0), (0, 3)), b"x").unwrap_err();
        assert!(matches!(err, Error::OutOfRange { pn: 0, gp: 3 }));
        assert!(rec.borrow().np_before.is_empty());
        assert_eq!(doc.to_string(), "ab");
    }

    #[test]
    fn test_invalid_utf8_notifies_failure() {
        let mut doc = Document::from_utf8(b"ab").unwrap();
        let rec = Rc::new(RefCell::new(Recorder::default()));
        doc.subscribe(&rec);

        let err = doc.replace(r((0, 0), (0, 1)), b"\xE2\x82").unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding { .. }));
        assert_eq!(doc.to_string(), "ab");
        assert_eq!(doc.undo_depth(), 0);
        let rec = rec.borrow();
        assert_eq!(rec.np_before.len(), 1);
        assert!(!rec.changes[0].0);
        assert_eq!((rec.changes[0].3, rec.changes[0].4), (0, 0));
    }

    #[test]
    fn test_past_end_position_is_end() {
        let mut doc = Document::from_utf8(b"ab\ncd").unwrap();
        doc.replace(r((1, 2), (2, 0)), b"!").unwrap();
        assert_eq!(doc.to_string(), "ab\ncd!");
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut doc = Document::from_utf8(b"hello\nworld").unwrap();
        doc.replace(r((0, 2), (1, 3)), b"XY\nZ").unwrap();
        assert_eq!(doc.to_string(), "heXY\nZld");

        assert!(doc.undo());
        assert_eq!(doc.to_string(), "hello\nworld");
        assert!(!doc.can_undo());
        assert!(doc.redo());
        assert_eq!(doc.to_string(), "heXY\nZld");
        assert!(!doc.redo());
    }

    #[test]
    fn test_history_depths() {
        let mut doc = Document::from_utf8(b"").unwrap();
        for i in 0..3 {
            doc.replace(r((0, i), (0, i)), b"a").unwrap();
        }
        assert_eq!(doc.undo_depth(), 3);
        assert!(doc.undo());
        assert!(doc.undo());
        assert_eq!((doc.undo_depth(), doc.redo_depth()), (1, 2));

        doc.replace(r((0, 0), (0, 0)), b"b").unwrap();
        assert_eq!((doc.undo_depth(), doc.redo_depth()), (2, 0));
        assert_eq!(doc.to_string(), "ba");

        doc.clear_history();
        assert!(!doc.can_undo() && !doc.can_redo());
        assert_eq!(doc.to_string(), "ba");
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut doc = Document::default();
        assert!(!doc.undo());
        assert!(!doc.redo());
    }

    #[test]
    fn test_unsubscribe_and_dropped_observer() {
        let mut doc = Document::from_utf8(b"ab").unwrap();
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let id = doc.subscribe(&rec);
        {
            let transient = Rc::new(RefCell::new(Recorder::default()));
            doc.subscribe(&transient);
            assert_eq!(doc.subscribers(), 2);
        }
        assert_eq!(doc.subscribers(), 1);
        assert!(doc.unsubscribe(id));
        assert!(!doc.unsubscribe(id));
        doc.replace(r((0, 0), (0, 0)), b"x").unwrap();
        assert!(rec.borrow().changes.is_empty());
    }

    #[test]
    fn test_copy_and_utf8bytes() {
        let doc = Document::from_utf8("añ\nb".as_bytes()).unwrap();
        assert_eq!(doc.copy(doc.text().all()).unwrap(), "añ\nb");
        assert_eq!(doc.utf8bytes(doc.text().all()).unwrap(), 6);
        let t = doc.copy_text(r((0, 1), (1, 1))).unwrap();
        assert_eq!(t.np(), 2);
        assert!(doc.copy(r((5, 0), (5, 0))).is_err());
    }

    #[test]
    fn test_save_query_then_fill() {
        let doc = Document::from_utf8(b"ab\ncd").unwrap();
        let Err(Error::MoreData { required }) = doc.save(None) else {
            panic!("expected a size query result");
        };
        assert_eq!(required, 6);

        let mut small = [0u8; 3];
        assert!(matches!(
            doc.save(Some(&mut small)),
            Err(Error::InsufficientBuffer {
                required: 6,
                provided: 3
            })
        ));

        let mut buf = vec![0xAAu8; required];
        assert_eq!(doc.save(Some(&mut buf)).unwrap(), 6);
        assert_eq!(&buf, b"ab\ncd\0");
    }

    #[test]
    fn test_borrowed_document() {
        let source = String::from("keep\nthis");
        let mut doc = Document::parse(source.as_bytes()).unwrap();
        assert!(doc.text().paragraph(1).is_borrowed());
        doc.replace(r((1, 0), (1, 0)), b">").unwrap();
        assert!(!doc.text().paragraph(1).is_borrowed());
        assert!(doc.text().paragraph(0).is_borrowed());
        assert_eq!(doc.to_string(), "keep\n>this");
    }
}
