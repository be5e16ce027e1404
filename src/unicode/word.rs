//! Word boundaries for word-wise caret movement.

use unicode_segmentation::UnicodeSegmentation;

/// Characters that belong to a word.
#[inline]
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word(segment: &str) -> bool {
    segment.chars().any(is_word_char)
}

/// Byte offset of the end of the first word ending after `byte`, or
/// `s.len()` when there is none.
#[must_use]
pub fn next_word_boundary(s: &str, byte: usize) -> usize {
    s.split_word_bound_indices()
        .filter(|(_, w)| is_word(w))
        .map(|(i, w)| i + w.len())
        .find(|&end| end > byte)
        .unwrap_or(s.len())
}

/// Byte offset of the start of the last word starting before `byte`, or 0.
#[must_use]
pub fn prev_word_boundary(s: &str, byte: usize) -> usize {
    s.split_word_bound_indices()
        .filter(|(i, w)| *i < byte && is_word(w))
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0)
}
