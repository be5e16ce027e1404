//! Per-paragraph run cache.

use super::Run;
use super::metrics::TextMeasure;
use super::wrap::paragraph_runs;
use crate::text::{Change, Text};

/// Lazily computed runs for every paragraph of a text, at one wrap width.
///
/// Slots are kept 1:1 with the paragraphs of the observed text. A `None`
/// slot is recomputed on the next query.
#[derive(Clone, Debug, Default)]
pub struct LayoutCache {
    paragraphs: Vec<Option<Vec<Run>>>,
    width: i32,
}

impl LayoutCache {
    /// Empty cache for `np` paragraphs wrapped at `width` pixels.
    #[must_use]
    pub fn new(np: usize, width: i32) -> Self {
        Self {
            paragraphs: vec![None; np],
            width,
        }
    }

    /// Number of paragraph slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Wrap width in pixels.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Change the wrap width. Returns `true` and drops all runs when it
    /// differs from the current one.
    pub fn set_width(&mut self, width: i32) -> bool {
        if width == self.width {
            return false;
        }
        self.width = width;
        self.invalidate_all();
        true
    }

    /// Drop runs for every paragraph.
    pub fn invalidate_all(&mut self) {
        self.paragraphs.iter_mut().for_each(|p| *p = None);
    }

    /// Drop runs for paragraph `pn`.
    pub fn invalidate(&mut self, pn: usize) {
        if let Some(slot) = self.paragraphs.get_mut(pn) {
            *slot = None;
        }
    }

    #[must_use]
    pub fn is_cached(&self, pn: usize) -> bool {
        self.paragraphs.get(pn).is_some_and(Option::is_some)
    }

    /// Shift slots to follow a document splice: `deleted` slots after
    /// `change.first` are removed, `inserted` empty slots are added in their
    /// place and the first paragraph is invalidated.
    pub fn apply_change(&mut self, change: &Change<'_>) {
        if !change.ok {
            return;
        }
        let first = change.first as usize;
        let deleted = change.deleted as usize;
        let inserted = change.inserted as usize;
        self.paragraphs.splice(
            first + 1..first + 1 + deleted,
            std::iter::repeat_n(None, inserted),
        );
        self.invalidate(first);
    }

    /// Runs of paragraph `pn`, computed on demand.
    pub fn runs(&mut self, pn: usize, text: &Text<'_>, metrics: &dyn TextMeasure) -> &[Run] {
        assert_eq!(
            self.paragraphs.len(),
            text.np(),
            "layout cache out of sync with document paragraphs"
        );
        let width = self.width;
        self.paragraphs[pn].get_or_insert_with(|| paragraph_runs(text.paragraph(pn), width, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceMetrics;
    use crate::text::{Pg, Range};

    fn change(first: i32, deleted: i32, inserted: i32) -> Change<'static> {
        let pg = Pg::new(first, 0);
        Change {
            ok: true,
            range: Range::caret(pg),
            extended: Range::caret(pg),
            text: None,
            first,
            last: first + inserted,
            deleted,
            inserted,
        }
    }

    fn warm(cache: &mut LayoutCache, text: &Text<'_>) {
        let m = MonospaceMetrics::new(1, 1);
        for pn in 0..text.np() {
            let _ = cache.runs(pn, text, &m);
        }
    }

    #[test]
    fn test_runs_are_cached() {
        let text = Text::from_str("aaaa bbbb\ncc");
        let m = MonospaceMetrics::new(1, 1);
        let mut cache = LayoutCache::new(text.np(), 5);
        assert!(!cache.is_cached(0));
        assert_eq!(cache.runs(0, &text, &m).len(), 2);
        assert!(cache.is_cached(0));
        assert!(!cache.is_cached(1));
    }

    #[test]
    fn test_width_change_invalidates() {
        let text = Text::from_str("a\nb");
        let mut cache = LayoutCache::new(2, 5);
        warm(&mut cache, &text);
        assert!(!cache.set_width(5));
        assert!(cache.is_cached(1));
        assert!(cache.set_width(6));
        assert!(!cache.is_cached(0));
        assert!(!cache.is_cached(1));
    }

    #[test]
    fn test_apply_change_grow() {
        let before = Text::from_str("a\nb\nc");
        let mut cache = LayoutCache::new(3, 5);
        warm(&mut cache, &before);
        cache.apply_change(&change(1, 0, 2));
        assert_eq!(cache.len(), 5);
        assert!(cache.is_cached(0));
        assert!(!cache.is_cached(1));
        assert!(!cache.is_cached(2));
        assert!(!cache.is_cached(3));
        assert!(cache.is_cached(4));
    }

    #[test]
    fn test_apply_change_shrink() {
        let before = Text::from_str("a\nb\nc\nd");
        let mut cache = LayoutCache::new(4, 5);
        warm(&mut cache, &before);
        cache.apply_change(&change(0, 2, 0));
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_cached(0));
        assert!(cache.is_cached(1));
    }

    #[test]
    fn test_apply_change_same_count_replaced_paragraphs() {
        let before = Text::from_str("a\nb\nc\nd");
        let mut cache = LayoutCache::new(4, 5);
        warm(&mut cache, &before);
        cache.apply_change(&change(1, 2, 2));
        assert_eq!(cache.len(), 4);
        assert!(cache.is_cached(0));
        assert!(!cache.is_cached(1));
        assert!(!cache.is_cached(2));
        assert!(!cache.is_cached(3));
    }

    #[test]
    #[should_panic(expected = "out of sync")]
    fn test_desync_is_detected() {
        let text = Text::from_str("a\nb");
        let mut cache = LayoutCache::new(1, 5);
        let _ = cache.runs(0, &text, &MonospaceMetrics::default());
    }
}
