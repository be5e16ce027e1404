//! Navigation and editing controller.
//!
//! [`Editor`] owns a [`Document`], its layout cache, the measurement
//! metrics and the interaction state: selection, scroll anchor, remembered
//! horizontal position and mouse buttons. Input arrives either through the
//! individual command methods or as queued [`Command`]s via
//! [`Editor::dispatch`].
//!
//! The layout cache follows the document through a [`DocumentObserver`],
//! so it stays in step with edits made by undo and redo as well as by the
//! editor's own commands.
//!
//! # Example
//!
//! ```
//! use paraedit::editor::{Editor, EditorOptions, KeyCode, KeyEvent, KeyModifiers};
//! use paraedit::text::{Document, Pg};
//!
//! let doc = Document::from_utf8(b"hello world").unwrap();
//! let mut editor = Editor::new(doc, EditorOptions::default());
//!
//! editor.key_pressed(KeyEvent::key(KeyCode::End));
//! editor.paste("!");
//! assert_eq!(editor.text(), "hello world!");
//!
//! editor.key_pressed(KeyEvent::new(KeyCode::Home, KeyModifiers::SHIFT));
//! assert_eq!(editor.selection().from, Pg::new(0, 12));
//! assert_eq!(editor.selection().to, Pg::new(0, 0));
//! ```

mod clipboard;
mod command;
mod fuzz;
mod input;
mod options;

pub use clipboard::{Clipboard, MemoryClipboard, read_clipboard};
pub use command::Command;
pub use fuzz::{Fuzzer, random_command};
pub use input::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseButtons};
pub use options::EditorOptions;

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Result;
use crate::event::{LogLevel, emit_event, emit_log};
use crate::layout::{LayoutCache, Mapper, MonospaceMetrics, Point, TextMeasure};
use crate::text::{
    Change, Document, DocumentObserver, GlyphString, Pg, Pr, Range, SubscriptionId, Text,
};
use crate::unicode::{next_word_boundary, prev_word_boundary};

/// Layout state shared with the document as an observer.
struct ViewState {
    cache: LayoutCache,
    np_before: usize,
    /// Range produced by the last successful change, not yet consumed.
    pending: Option<Range>,
}

impl DocumentObserver for ViewState {
    fn before(&mut self, text: &Text<'_>, _range: Range) {
        self.np_before = text.np();
    }

    fn after(&mut self, text: &Text<'_>, change: &Change<'_>) {
        if !change.ok {
            return;
        }
        assert_eq!(
            text.np() as i32,
            self.np_before as i32 - change.deleted + change.inserted,
            "paragraph count does not match the reported change"
        );
        self.cache.apply_change(change);
        self.pending = Some(change.extended);
    }
}

fn glyph_index(s: &GlyphString<'_>, byte: usize) -> usize {
    s.g2b().partition_point(|&b| b < byte)
}

fn is_blank(c: Option<char>) -> bool {
    c.is_none_or(|c| c.is_whitespace() || c.is_control())
}

/// Editing controller over one document.
pub struct Editor<'a> {
    doc: Document<'a>,
    view: Rc<RefCell<ViewState>>,
    subscription: SubscriptionId,
    metrics: Box<dyn TextMeasure>,
    clipboard: Box<dyn Clipboard>,
    on_enter: Option<Box<dyn FnMut()>>,
    options: EditorOptions,
    selection: Range,
    scroll: Pr,
    caret: Option<Point>,
    last_x: i32,
    mouse: MouseButtons,
    fuzzer: Option<Fuzzer>,
}

impl<'a> Editor<'a> {
    /// Create an editor with default monospace metrics.
    #[must_use]
    pub fn new(doc: Document<'a>, options: EditorOptions) -> Self {
        Self::with_metrics(doc, options, Box::new(MonospaceMetrics::default()))
    }

    /// Create an editor measuring text with `metrics`.
    #[must_use]
    pub fn with_metrics(
        mut doc: Document<'a>,
        mut options: EditorOptions,
        metrics: Box<dyn TextMeasure>,
    ) -> Self {
        options.width = options.width.max(4 * metrics.em_width());
        options.height = options.height.max(metrics.line_height());
        let view = Rc::new(RefCell::new(ViewState {
            cache: LayoutCache::new(doc.np(), options.width),
            np_before: doc.np(),
            pending: None,
        }));
        let subscription = doc.subscribe(&view);
        let mut editor = Self {
            doc,
            view,
            subscription,
            metrics,
            clipboard: Box::new(MemoryClipboard::new()),
            on_enter: None,
            options,
            selection: Range::caret(Pg::ZERO),
            scroll: Pr::default(),
            caret: None,
            last_x: -1,
            mouse: MouseButtons::empty(),
            fuzzer: None,
        };
        editor.refresh();
        editor
    }

    #[must_use]
    pub fn document(&self) -> &Document<'a> {
        &self.doc
    }

    /// Detach the document from the editor.
    #[must_use]
    pub fn into_document(mut self) -> Document<'a> {
        self.doc.unsubscribe(self.subscription);
        std::mem::take(&mut self.doc)
    }

    /// Document contents with `\n` between paragraphs.
    #[must_use]
    pub fn text(&self) -> String {
        self.doc.to_string()
    }

    /// Current selection. `to` is the caret; `from` is the anchor.
    #[must_use]
    pub fn selection(&self) -> Range {
        self.selection
    }

    /// Caret location in viewport pixels, `None` while scrolled above the
    /// viewport.
    #[must_use]
    pub fn caret(&self) -> Option<Point> {
        self.caret
    }

    /// Run shown on the first row of the viewport.
    #[must_use]
    pub fn scroll(&self) -> Pr {
        self.scroll
    }

    #[must_use]
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    #[must_use]
    pub fn mouse_buttons(&self) -> MouseButtons {
        self.mouse
    }

    #[must_use]
    pub fn metrics(&self) -> &dyn TextMeasure {
        self.metrics.as_ref()
    }

    #[must_use]
    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    /// Replace the clipboard used by copy, cut and paste.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    /// Handler invoked by Enter in single-line mode.
    pub fn set_enter_handler<F>(&mut self, handler: F)
    where
        F: FnMut() + 'static,
    {
        self.on_enter = Some(Box::new(handler));
    }

    pub fn set_read_only(&mut self, enabled: bool) {
        self.options.read_only = enabled;
    }

    pub fn set_single_line(&mut self, enabled: bool) {
        self.options.single_line = enabled;
    }

    fn mapper<R>(&mut self, f: impl FnOnce(&mut Mapper<'_, '_>) -> R) -> R {
        let mut view = self.view.borrow_mut();
        let mut mapper = Mapper::new(
            self.doc.text(),
            &mut view.cache,
            self.metrics.as_ref(),
            &mut self.scroll,
            self.options.height,
        );
        f(&mut mapper)
    }

    /// Consume a pending document change: take over its extended range as
    /// the selection and bring the caret back into view.
    fn sync(&mut self) {
        let pending = self.view.borrow_mut().pending.take();
        let Some(x) = pending else {
            return;
        };
        let text = self.doc.text();
        self.selection = Range::new(text.clamp(x.from), text.clamp(x.to));
        self.last_x = -1;
        self.fix_scroll();
        self.refresh();
    }

    fn fix_scroll(&mut self) {
        let last = self.doc.np() as i32 - 1;
        if self.scroll.pn > last {
            self.scroll = Pr::new(last, 0);
        }
        self.mapper(|m| {
            let s = m.scroll();
            let count = m.run_count(s.pn) as i32;
            if s.rn >= count {
                m.set_scroll(Pr::new(s.pn, count - 1));
            }
        });
    }

    fn refresh(&mut self) {
        let to = self.selection.to;
        let single = self.options.single_line;
        self.caret = self.mapper(|m| {
            m.scroll_into_view(to, single);
            m.pg_to_xy(to)
        });
    }

    /// Move the live end of the selection to `pg`. The anchor follows
    /// unless `extend` is set or a mouse button is held.
    fn move_caret(&mut self, pg: Pg, extend: bool) {
        let pg = self.doc.text().clamp(pg);
        let single = self.options.single_line;
        self.caret = self.mapper(|m| {
            m.scroll_into_view(pg, single);
            m.pg_to_xy(pg)
        });
        self.selection.to = pg;
        if !extend && self.mouse.is_empty() {
            self.selection.from = pg;
        }
    }

    /// Keyboard movement; single-line mode keeps the caret in its paragraph.
    fn navigate(&mut self, to: Pg, modifiers: KeyModifiers) {
        let from = self.selection.to;
        let to = if self.options.single_line && to.pn != from.pn {
            let gp = if to > from {
                self.doc.text().glyphs(from.pn as usize) as i32
            } else {
                0
            };
            Pg::new(from.pn, gp)
        } else {
            to
        };
        self.move_caret(to, modifiers.contains(KeyModifiers::SHIFT));
    }

    /// Place the caret at `pg`, collapsing the selection.
    pub fn move_to(&mut self, pg: Pg) {
        self.sync();
        let pg = self.doc.text().clamp(pg);
        self.selection = Range::caret(pg);
        self.last_x = -1;
        self.move_caret(pg, false);
    }

    /// Select `range`; the caret goes to `range.to`.
    pub fn set_selection(&mut self, range: Range) {
        self.sync();
        self.selection.from = self.doc.text().clamp(range.from);
        self.last_x = -1;
        self.move_caret(range.to, true);
    }

    pub fn key_left(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let to = self.selection.to;
        let text = self.doc.text();
        let target = if to.gp > 0 {
            if modifiers.contains(KeyModifiers::CTRL) {
                let s = text.paragraph(to.pn as usize);
                let byte = prev_word_boundary(s.as_str(), s.byte_offset(to.gp as usize));
                Pg::new(to.pn, glyph_index(s, byte) as i32)
            } else {
                Pg::new(to.pn, to.gp - 1)
            }
        } else if to.pn > 0 && !self.options.single_line {
            Pg::new(to.pn - 1, text.glyphs(to.pn as usize - 1) as i32)
        } else {
            return;
        };
        self.last_x = -1;
        self.navigate(target, modifiers);
    }

    pub fn key_right(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let to = self.selection.to;
        let text = self.doc.text();
        let glyphs = text.glyphs(to.pn as usize) as i32;
        let target = if to.gp < glyphs {
            if modifiers.contains(KeyModifiers::CTRL) {
                let s = text.paragraph(to.pn as usize);
                let byte = next_word_boundary(s.as_str(), s.byte_offset(to.gp as usize));
                Pg::new(to.pn, glyph_index(s, byte) as i32)
            } else {
                Pg::new(to.pn, to.gp + 1)
            }
        } else if (to.pn as usize) + 1 < text.np() && !self.options.single_line {
            Pg::new(to.pn + 1, 0)
        } else {
            return;
        };
        self.last_x = -1;
        self.navigate(target, modifiers);
    }

    /// Keep the horizontal position of a run of vertical moves stable when
    /// glyph widths differ between runs.
    fn reuse_last_x(&mut self, pt: &mut Point) {
        if pt.x <= 0 {
            return;
        }
        if self.last_x > 0 {
            let em = self.metrics.em_width();
            if (self.last_x - em..=self.last_x + em).contains(&pt.x) {
                pt.x = self.last_x;
            }
        }
        self.last_x = pt.x;
    }

    pub fn key_up(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let pg = self.selection.to;
        let single = self.options.single_line;
        let start = self.mapper(|m| {
            m.scroll_into_view(pg, single);
            let top = pg.pn == 0 && m.pg_to_pr(pg).rn == 0;
            m.pg_to_xy(pg).filter(|_| !top)
        });
        let Some(mut pt) = start else {
            self.navigate(pg, modifiers);
            return;
        };
        self.reuse_last_x(&mut pt);
        let target = self.mapper(|m| {
            let y = if pt.y == 0 {
                m.scroll_down(1);
                0
            } else {
                pt.y - 1
            };
            let mut to = m.xy_to_pg(pt.x, y)?;
            let rn0 = m.pg_to_pr(pg).rn;
            let rn1 = m.pg_to_pr(to).rn;
            if to.pn == pg.pn && rn1 > 0 && rn0 == rn1 {
                to.gp = m.run(to.pn, rn1).gp as i32;
            }
            Some(to)
        });
        if let Some(to) = target {
            self.navigate(to, modifiers);
        }
    }

    pub fn key_down(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let pg = self.selection.to;
        let single = self.options.single_line;
        let start = self.mapper(|m| {
            m.scroll_into_view(pg, single);
            m.pg_to_xy(pg)
        });
        let Some(mut pt) = start else {
            return;
        };
        self.reuse_last_x(&mut pt);
        let h = self.metrics.line_height();
        let target = self.mapper(|m| {
            let top = m.scroll_pg();
            let before = m.scroll();
            if !single && m.runs_between(top, pg) + 1 >= m.visible_runs() {
                m.scroll_up(1);
            }
            let y = if m.scroll() == before { pt.y + h } else { pt.y };
            m.xy_to_pg(pt.x, y)
        });
        if let Some(to) = target {
            self.navigate(to, modifiers);
        }
    }

    /// First press goes to the start of the wrapped run, a second press to
    /// the start of the paragraph. Ctrl goes to the start of the document.
    pub fn key_home(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let pg = self.selection.to;
        let target = if modifiers.contains(KeyModifiers::CTRL) {
            Pg::ZERO
        } else {
            let run_gp = self.mapper(|m| {
                let pr = m.pg_to_pr(pg);
                m.run(pr.pn, pr.rn).gp as i32
            });
            let gp = if pg.gp == run_gp { 0 } else { run_gp };
            Pg::new(pg.pn, gp)
        };
        self.navigate(target, modifiers);
    }

    /// First press goes to the last glyph of the wrapped run, a second press
    /// to the end of the paragraph. Ctrl goes to the end of the document.
    pub fn key_end(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let pg = self.selection.to;
        let target = if modifiers.contains(KeyModifiers::CTRL) {
            self.doc.text().end()
        } else {
            let glyphs = self.doc.text().glyphs(pg.pn as usize) as i32;
            let (last, run_end) = self.mapper(|m| {
                let pr = m.pg_to_pr(pg);
                let run = m.run(pr.pn, pr.rn);
                let last = pr.rn as usize + 1 == m.run_count(pr.pn);
                (last, (run.gp + run.glyphs) as i32 - 1)
            });
            let gp = if last || pg.gp == glyphs || pg.gp == run_end {
                glyphs
            } else {
                run_end
            };
            Pg::new(pg.pn, gp)
        };
        self.navigate(target, modifiers);
    }

    fn page_runs(&mut self) -> usize {
        let visible = self.mapper(|m| m.visible_runs());
        visible.saturating_sub(1).max(1)
    }

    /// Scroll back by a page and keep the caret at the same pixel location,
    /// or go to the start of the document when less than a page is left.
    pub fn key_page_up(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let n = self.page_runs();
        let pg = self.selection.to;
        let target = self.mapper(|m| {
            let top = m.scroll_pg();
            if m.runs_between(Pg::ZERO, top) <= n {
                return Some(Pg::ZERO);
            }
            let pt = m.pg_to_xy(pg);
            let before = m.scroll();
            m.scroll_down(n);
            if m.scroll() == before {
                return None;
            }
            pt.and_then(|pt| m.xy_to_pg(pt.x, pt.y))
        });
        if let Some(to) = target {
            self.navigate(to, modifiers);
        }
    }

    /// Scroll forward by a page and keep the caret at the same pixel
    /// location, or go to the end of the document when less than a page is
    /// left.
    pub fn key_page_down(&mut self, modifiers: KeyModifiers) {
        self.sync();
        let n = self.page_runs();
        let pg = self.selection.to;
        let end = self.doc.text().end();
        let target = self.mapper(|m| {
            let top = m.scroll_pg();
            if m.runs_between(top, end) <= n {
                return Some(end);
            }
            let pt = m.pg_to_xy(pg);
            let before = m.scroll();
            m.scroll_up(n);
            if m.scroll() == before {
                return None;
            }
            pt.and_then(|pt| m.xy_to_pg(pt.x, pt.y))
        });
        if let Some(to) = target {
            self.navigate(to, modifiers);
        }
    }

    /// Delete the selection, or the glyph (word with Ctrl) after the caret.
    pub fn key_delete(&mut self, modifiers: KeyModifiers) {
        self.sync();
        if self.options.read_only {
            return;
        }
        if self.selection.is_empty() && self.selection.to != self.doc.text().end() {
            let anchor = self.selection.from;
            self.key_right(modifiers & KeyModifiers::CTRL);
            self.selection.from = anchor;
        }
        self.erase();
    }

    /// Delete the selection, or the glyph (word with Ctrl) before the caret.
    pub fn key_backspace(&mut self, modifiers: KeyModifiers) {
        self.sync();
        if self.options.read_only {
            return;
        }
        if self.selection.is_empty() && self.selection.to != Pg::ZERO {
            let anchor = self.selection.from;
            self.key_left(modifiers & KeyModifiers::CTRL);
            self.selection.from = anchor;
        }
        self.erase();
    }

    /// Insert a paragraph break, or call the enter handler in single-line
    /// mode.
    pub fn key_enter(&mut self) {
        self.sync();
        if self.options.read_only {
            return;
        }
        if self.options.single_line {
            if let Some(handler) = self.on_enter.as_mut() {
                handler();
            }
            emit_event("editor.enter", "");
            return;
        }
        self.insert(b"\n");
    }

    /// Handle a key press. Ctrl shortcuts: A select all, C copy, X cut,
    /// V paste, Z undo, Y or Shift+Z redo.
    pub fn key_pressed(&mut self, key: KeyEvent) {
        let modifiers = key.modifiers;
        match key.code {
            KeyCode::Left => self.key_left(modifiers),
            KeyCode::Right => self.key_right(modifiers),
            KeyCode::Up => self.key_up(modifiers),
            KeyCode::Down => self.key_down(modifiers),
            KeyCode::Home => self.key_home(modifiers),
            KeyCode::End => self.key_end(modifiers),
            KeyCode::PageUp => self.key_page_up(modifiers),
            KeyCode::PageDown => self.key_page_down(modifiers),
            KeyCode::Delete => self.key_delete(modifiers),
            KeyCode::Backspace => self.key_backspace(modifiers),
            KeyCode::Enter => self.key_enter(),
            KeyCode::Char(c) if key.has_ctrl() => match c.to_ascii_lowercase() {
                'a' => self.select_all(),
                'c' => self.copy(),
                'x' => self.cut(),
                'v' => self.paste_from_clipboard(),
                'y' => {
                    self.redo();
                }
                'z' if key.shift() => {
                    self.redo();
                }
                'z' => {
                    self.undo();
                }
                _ => {}
            },
            KeyCode::Char(c) => self.character(c),
        }
    }

    /// Type one character over the selection. Control characters are
    /// ignored.
    pub fn character(&mut self, c: char) {
        self.sync();
        if c < ' ' || self.options.read_only {
            return;
        }
        let mut buf = [0u8; 4];
        self.insert(c.encode_utf8(&mut buf).as_bytes());
    }

    /// Insert `text` over the selection and place the caret after it. In
    /// single-line mode line breaks become spaces.
    pub fn paste(&mut self, text: &str) {
        self.sync();
        if self.options.read_only || text.is_empty() {
            return;
        }
        let text = if self.options.single_line && text.contains('\n') {
            Cow::Owned(text.replace('\n', " "))
        } else {
            Cow::Borrowed(text)
        };
        self.insert(text.as_bytes());
    }

    fn insert(&mut self, bytes: &[u8]) {
        self.erase();
        let at = self.selection.to;
        let outcome = self.doc.replace(Range::caret(at), bytes);
        self.sync();
        if let Ok(x) = outcome {
            self.selection = Range::caret(x.to);
            self.last_x = -1;
            self.move_caret(x.to, false);
        }
    }

    /// Delete the selected text. Does nothing when the selection is empty.
    pub fn erase(&mut self) {
        self.sync();
        let r = self.selection.ordered();
        if self.options.read_only || r.is_empty() {
            return;
        }
        let outcome = self.doc.replace(r, b"");
        self.sync();
        if outcome.is_ok() {
            self.selection = Range::caret(r.from);
            self.last_x = -1;
            self.move_caret(r.from, false);
        }
    }

    /// Programmatic replacement. Unlike the commands it is not affected by
    /// read-only mode.
    pub fn replace(&mut self, range: Range, bytes: &[u8]) -> Result<Range> {
        self.sync();
        let outcome = self.doc.replace(range, bytes);
        self.sync();
        outcome
    }

    pub fn select_all(&mut self) {
        self.sync();
        self.selection.from = Pg::ZERO;
        let end = self.doc.text().end();
        self.move_caret(end, true);
    }

    /// Put the selected text on the clipboard.
    pub fn copy(&mut self) {
        self.sync();
        let r = self.selection.ordered();
        if r.is_empty() {
            return;
        }
        match self.doc.copy(r) {
            Ok(text) => self.clipboard.put_text(&text),
            Err(e) => emit_log(LogLevel::Warn, &format!("copy {r} failed: {e}")),
        }
    }

    pub fn cut(&mut self) {
        self.sync();
        if self.options.read_only {
            return;
        }
        self.copy();
        self.erase();
    }

    pub fn paste_from_clipboard(&mut self) {
        self.sync();
        if self.options.read_only {
            return;
        }
        match read_clipboard(self.clipboard.as_ref()) {
            Ok(Some(text)) => self.paste(&text),
            Ok(None) => {}
            Err(e) => emit_log(LogLevel::Warn, &format!("clipboard read failed: {e}")),
        }
    }

    /// Undo the last edit and select the restored text.
    pub fn undo(&mut self) -> bool {
        self.sync();
        if self.options.read_only {
            return false;
        }
        let done = self.doc.undo();
        self.sync();
        done
    }

    /// Redo the last undone edit and select the restored text.
    pub fn redo(&mut self) -> bool {
        self.sync();
        if self.options.read_only {
            return false;
        }
        let done = self.doc.redo();
        self.sync();
        done
    }

    /// Press `button` at pixel `(x, y)`. The caret moves to the click; Shift
    /// extends the selection.
    pub fn mouse_down(&mut self, button: MouseButton, x: i32, y: i32, modifiers: KeyModifiers) {
        self.sync();
        self.mouse = MouseButtons::empty();
        if let Some(pg) = self.mapper(|m| m.xy_to_pg(x, y)) {
            self.last_x = -1;
            self.move_caret(pg, modifiers.contains(KeyModifiers::SHIFT));
        }
        self.mouse |= MouseButtons::from(button);
    }

    pub fn mouse_up(&mut self, button: MouseButton) {
        self.mouse.remove(MouseButtons::from(button));
    }

    /// Extend the selection to `(x, y)` while the left button is held.
    pub fn mouse_move(&mut self, x: i32, y: i32) {
        self.sync();
        if !self.mouse.contains(MouseButtons::LEFT) {
            return;
        }
        if let Some(pg) = self.mapper(|m| m.xy_to_pg(x, y)) {
            self.move_caret(pg, true);
        }
    }

    /// Select the word under the pointer, or the whole paragraph when the
    /// pointer is inside an existing single-paragraph selection.
    pub fn double_click(&mut self, x: i32, y: i32) {
        self.sync();
        if self.selection.is_empty() {
            self.select_word(x, y);
        } else if self.selection.is_single_paragraph() {
            self.select_paragraph(x, y);
        }
        self.mouse = MouseButtons::empty();
    }

    fn select_word(&mut self, x: i32, y: i32) {
        let Some(p) = self.mapper(|m| m.xy_to_pg(x, y)) else {
            return;
        };
        let bounds = {
            let s = self.doc.text().paragraph(p.pn as usize);
            let glyphs = s.glyphs();
            let mut gp = (p.gp as usize).min(glyphs);
            if is_blank(s.glyph(gp)) && gp > 0 {
                gp -= 1;
            }
            if is_blank(s.glyph(gp)) {
                None
            } else {
                let mut from = gp;
                while from > 0 && !is_blank(s.glyph(from - 1)) {
                    from -= 1;
                }
                let mut to = gp + 1;
                while to < glyphs && !is_blank(s.glyph(to)) {
                    to += 1;
                }
                Some((from as i32, to as i32))
            }
        };
        if let Some((from, to)) = bounds {
            self.selection.from = Pg::new(p.pn, from);
            self.move_caret(Pg::new(p.pn, to), true);
        }
    }

    fn select_paragraph(&mut self, x: i32, y: i32) {
        let Some(p) = self.mapper(|m| m.xy_to_pg(x, y)) else {
            return;
        };
        let text = self.doc.text();
        let glyphs = text.glyphs(p.pn as usize) as i32;
        if glyphs == 0 || p.pn != self.selection.from.pn || !self.selection.inside(p) {
            return;
        }
        let end = if (p.pn as usize) + 1 < text.np() {
            Pg::new(p.pn + 1, 0)
        } else {
            Pg::new(p.pn, glyphs)
        };
        self.selection.from = Pg::new(p.pn, 0);
        self.move_caret(end, true);
    }

    /// Scroll by `ceil(|dy| / line_height)` runs; positive `dy` scrolls
    /// toward the start. The caret stays where it is.
    pub fn mouse_wheel(&mut self, dy: i32) {
        self.sync();
        let h = self.metrics.line_height();
        let lines = dy.unsigned_abs().div_ceil(h as u32) as usize;
        let to = self.selection.to;
        self.caret = self.mapper(|m| {
            if dy > 0 {
                m.scroll_down(lines);
            } else if dy < 0 {
                m.scroll_up(lines);
            }
            m.pg_to_xy(to)
        });
    }

    /// Move the scroll anchor forward by `n` runs.
    pub fn scroll_up(&mut self, n: usize) {
        self.sync();
        let to = self.selection.to;
        self.caret = self.mapper(|m| {
            m.scroll_up(n);
            m.pg_to_xy(to)
        });
    }

    /// Move the scroll anchor back by `n` runs.
    pub fn scroll_down(&mut self, n: usize) {
        self.sync();
        let to = self.selection.to;
        self.caret = self.mapper(|m| {
            m.scroll_down(n);
            m.pg_to_xy(to)
        });
    }

    /// Resize the viewport. The width is at least four em widths and the
    /// height at least one line. A width change rewraps every paragraph and
    /// keeps the anchor paragraph at the top.
    pub fn set_viewport(&mut self, width: i32, height: i32) {
        self.sync();
        let width = width.max(4 * self.metrics.em_width());
        self.options.height = height.max(self.metrics.line_height());
        if width != self.options.width {
            self.options.width = width;
            if self.view.borrow_mut().cache.set_width(width) {
                self.scroll.rn = 0;
            }
        }
        self.refresh();
    }

    /// Swap the measurement metrics; all runs are recomputed.
    pub fn set_metrics(&mut self, metrics: Box<dyn TextMeasure>) {
        self.sync();
        self.metrics = metrics;
        self.view.borrow_mut().cache.invalidate_all();
        self.scroll.rn = 0;
        self.last_x = -1;
        let (width, height) = (self.options.width, self.options.height);
        self.options.width = 0;
        self.set_viewport(width, height);
    }

    /// Apply one queued command.
    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::Key(key) => self.key_pressed(key),
            Command::Text(text) => self.paste(&text),
            Command::MouseDown {
                button,
                x,
                y,
                modifiers,
            } => self.mouse_down(button, x, y, modifiers),
            Command::MouseUp { button } => self.mouse_up(button),
            Command::MouseMove { x, y } => self.mouse_move(x, y),
            Command::DoubleClick { x, y } => self.double_click(x, y),
            Command::Wheel { dy } => self.mouse_wheel(dy),
            Command::Resize { width, height } => self.set_viewport(width, height),
        }
    }

    /// Start a fuzz worker seeded with `seed` (odd), replacing any running
    /// one. Commands are applied only by [`Editor::next_fuzz`] and
    /// [`Editor::pump_fuzz`].
    pub fn start_fuzzing(&mut self, seed: u32) -> Result<()> {
        self.stop_fuzzing()?;
        self.fuzzer = Some(Fuzzer::start(
            seed,
            self.options.fuzz_interval,
            self.options.fuzz_queue,
        )?);
        Ok(())
    }

    /// Stop and join the fuzz worker. Returns the number of commands it
    /// generated, 0 when none was running.
    pub fn stop_fuzzing(&mut self) -> Result<u64> {
        match self.fuzzer.take() {
            Some(fuzzer) => fuzzer.stop(),
            None => Ok(0),
        }
    }

    #[must_use]
    pub fn is_fuzzing(&self) -> bool {
        self.fuzzer.is_some()
    }

    #[must_use]
    pub fn fuzzer(&self) -> Option<&Fuzzer> {
        self.fuzzer.as_ref()
    }

    /// Apply one queued fuzz command if available.
    pub fn next_fuzz(&mut self) -> bool {
        let Some(command) = self.fuzzer.as_mut().and_then(Fuzzer::try_next) else {
            return false;
        };
        self.dispatch(command);
        true
    }

    /// Apply up to `max` fuzz commands, waiting up to `timeout` for each.
    /// Returns how many were applied.
    pub fn pump_fuzz(&mut self, max: usize, timeout: Duration) -> usize {
        let mut applied = 0;
        while applied < max {
            let next = self
                .fuzzer
                .as_mut()
                .and_then(|f| f.next_timeout(timeout));
            let Some(command) = next else {
                break;
            };
            self.dispatch(command);
            applied += 1;
        }
        applied
    }

    /// Check the editor's structural invariants.
    ///
    /// # Panics
    ///
    /// Panics when the selection is not addressable, the layout cache does
    /// not match the paragraph count, or the scroll anchor names no run.
    pub fn assert_invariants(&mut self) {
        self.sync();
        let np = self.doc.np();
        for pg in [self.selection.from, self.selection.to] {
            assert!(
                self.doc.text().contains(pg) && (pg.pn as usize) < np,
                "selection endpoint {pg} outside the document"
            );
        }
        assert_eq!(
            self.view.borrow().cache.len(),
            np,
            "layout cache out of sync with document paragraphs"
        );
        let scroll = self.scroll;
        assert!(
            scroll.pn >= 0 && (scroll.pn as usize) < np,
            "scroll anchor {scroll:?} outside the document"
        );
        let to = self.selection.to;
        self.mapper(|m| {
            let runs = m.run_count(scroll.pn) as i32;
            assert!(
                scroll.rn >= 0 && scroll.rn < runs,
                "scroll anchor {scroll:?} names no run"
            );
            m.pg_to_pr(to);
        });
    }
}

impl Drop for Editor<'_> {
    fn drop(&mut self) {
        self.doc.unsubscribe(self.subscription);
    }
}

impl fmt::Debug for Editor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("doc", &self.doc)
            .field("selection", &self.selection)
            .field("scroll", &self.scroll)
            .field("caret", &self.caret)
            .field("options", &self.options)
            .field("fuzzer", &self.fuzzer)
            .finish_non_exhaustive()
    }
}
