//! Glyph-indexed paragraph strings.

use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};
use crate::unicode::{glyph_count, glyph_offsets};

/// One paragraph: UTF-8 bytes plus a glyph-to-byte offset table.
///
/// `g2b` has `glyph_count + 1` entries, starts at 0 and ends at the byte
/// length. The bytes are either borrowed from the buffer the document was
/// created from or owned after a mutation; a paragraph is never edited in
/// place, only replaced.
#[derive(Clone, PartialEq, Eq)]
pub struct GlyphString<'a> {
    text: Cow<'a, str>,
    g2b: Vec<usize>,
}

impl<'a> GlyphString<'a> {
    /// Build from validated text.
    #[must_use]
    pub fn new(text: impl Into<Cow<'a, str>>) -> Self {
        let text = text.into();
        let g2b = glyph_offsets(&text);
        Self { text, g2b }
    }

    /// Validate `bytes` as UTF-8 and borrow them.
    pub fn from_utf8(bytes: &'a [u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::InvalidEncoding {
            offset: e.valid_up_to(),
        })?;
        Ok(Self::new(text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Byte length.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.text.len()
    }

    /// Number of glyphs.
    #[must_use]
    pub fn glyphs(&self) -> usize {
        self.g2b.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of glyph `gi`. Panics if `gi > glyphs()`.
    #[must_use]
    pub fn byte_offset(&self, gi: usize) -> usize {
        self.g2b[gi]
    }

    /// The glyph-to-byte table.
    #[must_use]
    pub fn g2b(&self) -> &[usize] {
        &self.g2b
    }

    /// Text of glyphs `from..to`.
    #[must_use]
    pub fn slice(&self, from: usize, to: usize) -> &str {
        &self.text[self.g2b[from]..self.g2b[to]]
    }

    /// Glyph `gi` as a `char`.
    #[must_use]
    pub fn glyph(&self, gi: usize) -> Option<char> {
        if gi >= self.glyphs() {
            return None;
        }
        self.slice(gi, gi + 1).chars().next()
    }

    /// Whether the bytes are still borrowed from the source buffer.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.text, Cow::Borrowed(_))
    }

    /// Owned copy of `s`, reporting allocation failure instead of aborting.
    pub fn try_owned(s: &str) -> Result<GlyphString<'static>> {
        let mut text = String::new();
        text.try_reserve_exact(s.len())?;
        text.push_str(s);
        GlyphString::try_from_string(text)
    }

    /// Take ownership of `text`, building the glyph table with a fallible
    /// allocation.
    pub(crate) fn try_from_string(text: String) -> Result<GlyphString<'static>> {
        let mut g2b = Vec::new();
        g2b.try_reserve_exact(glyph_count(&text) + 1)?;
        g2b.extend(text.char_indices().map(|(b, _)| b));
        g2b.push(text.len());
        Ok(GlyphString {
            text: Cow::Owned(text),
            g2b,
        })
    }

    /// Detach from the source buffer.
    #[must_use]
    pub fn into_owned(self) -> GlyphString<'static> {
        GlyphString {
            text: Cow::Owned(self.text.into_owned()),
            g2b: self.g2b,
        }
    }
}

impl fmt::Debug for GlyphString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphString")
            .field("text", &self.text)
            .field("glyphs", &self.glyphs())
            .finish()
    }
}

impl fmt::Display for GlyphString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_g2b_table() {
        let s = GlyphString::new("añb");
        assert_eq!(s.glyphs(), 3);
        assert_eq!(s.bytes(), 4);
        assert_eq!(s.g2b(), &[0, 1, 3, 4]);
        assert_eq!(s.slice(1, 3), "ñb");
        assert_eq!(s.glyph(1), Some('ñ'));
        assert_eq!(s.glyph(3), None);
    }

    #[test]
    fn test_empty() {
        let s = GlyphString::new("");
        assert!(s.is_empty());
        assert_eq!(s.glyphs(), 0);
        assert_eq!(s.g2b(), &[0]);
    }

    #[test]
    fn test_borrowed_until_owned() {
        let src = b"hello".to_vec();
        let s = GlyphString::from_utf8(&src).unwrap();
        assert!(s.is_borrowed());
        let owned = s.into_owned();
        assert!(!owned.is_borrowed());
        assert_eq!(owned.as_str(), "hello");
    }

    #[test]
    fn test_try_owned_matches_new() {
        let owned = GlyphString::try_owned("a漢😀").unwrap();
        assert!(!owned.is_borrowed());
        assert_eq!(owned, GlyphString::new("a漢😀"));
        assert_eq!(owned.g2b(), &[0, 1, 4, 8]);
        assert_eq!(GlyphString::try_owned("").unwrap().g2b(), &[0]);
    }

    #[test]
    fn test_invalid_utf8_offset() {
        let err = GlyphString::from_utf8(b"ab\xFFc").unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding { offset: 2 }));
    }
}
