//! Paragraph storage.
//!
//! A [`Text`] is an ordered list of [`GlyphString`] paragraphs. Input bytes
//! are split on `\n`, so there is always at least one paragraph and
//! `"a\n"` yields `["a", ""]`. Joining paragraphs with `\n` reproduces the
//! input exactly.

use std::fmt;

use super::position::{Pg, Range};
use super::string::GlyphString;
use crate::error::{Error, Result};

/// Paragraph sequence backing a document.
#[derive(Clone, PartialEq, Eq)]
pub struct Text<'a> {
    paragraphs: Vec<GlyphString<'a>>,
}

impl Default for Text<'_> {
    fn default() -> Self {
        Self {
            paragraphs: vec![GlyphString::new("")],
        }
    }
}

impl<'a> Text<'a> {
    /// Parse `bytes` without copying. Paragraphs borrow from `bytes` until
    /// they are first replaced.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut paragraphs = Vec::new();
        paragraphs.try_reserve(bytes.iter().filter(|&&b| b == b'\n').count() + 1)?;
        let mut start = 0;
        for line in bytes.split(|&b| b == b'\n') {
            let para = GlyphString::from_utf8(line).map_err(|e| match e {
                Error::InvalidEncoding { offset } => Error::InvalidEncoding {
                    offset: start + offset,
                },
                other => other,
            })?;
            paragraphs.push(para);
            start += line.len() + 1;
        }
        Ok(Self { paragraphs })
    }

    /// Build from text that is already known to be valid UTF-8.
    #[must_use]
    pub fn from_str(s: &'a str) -> Self {
        Self {
            paragraphs: s.split('\n').map(GlyphString::new).collect(),
        }
    }

    /// Number of paragraphs, always at least one.
    #[must_use]
    pub fn np(&self) -> usize {
        self.paragraphs.len()
    }

    #[must_use]
    pub fn paragraphs(&self) -> &[GlyphString<'a>] {
        &self.paragraphs
    }

    /// Paragraph `pn`. Panics when out of range.
    #[must_use]
    pub fn paragraph(&self, pn: usize) -> &GlyphString<'a> {
        &self.paragraphs[pn]
    }

    /// Glyph count of paragraph `pn`.
    #[must_use]
    pub fn glyphs(&self, pn: usize) -> usize {
        self.paragraphs[pn].glyphs()
    }

    /// Position after the last glyph of the last paragraph.
    #[must_use]
    pub fn end(&self) -> Pg {
        let last = self.np() - 1;
        Pg::new(last as i32, self.glyphs(last) as i32)
    }

    /// Range covering the whole text.
    #[must_use]
    pub fn all(&self) -> Range {
        Range::new(Pg::ZERO, self.end())
    }

    /// Whether `pg` addresses a caret location. The past-the-end position
    /// `{np, 0}` is accepted.
    #[must_use]
    pub fn contains(&self, pg: Pg) -> bool {
        if pg.pn < 0 || pg.gp < 0 {
            return false;
        }
        let pn = pg.pn as usize;
        match pn.cmp(&self.np()) {
            std::cmp::Ordering::Less => pg.gp as usize <= self.glyphs(pn),
            std::cmp::Ordering::Equal => pg.gp == 0,
            std::cmp::Ordering::Greater => false,
        }
    }

    /// Validate `pg`, mapping `{np, 0}` to [`Text::end`].
    pub fn check(&self, pg: Pg) -> Result<Pg> {
        if !self.contains(pg) {
            return Err(Error::OutOfRange {
                pn: pg.pn,
                gp: pg.gp,
            });
        }
        if pg.pn as usize == self.np() {
            return Ok(self.end());
        }
        Ok(pg)
    }

    /// Nearest valid position inside an existing paragraph.
    #[must_use]
    pub fn clamp(&self, pg: Pg) -> Pg {
        let pn = pg.pn.clamp(0, self.np() as i32 - 1);
        let gp = pg.gp.clamp(0, self.glyphs(pn as usize) as i32);
        Pg::new(pn, gp)
    }

    /// UTF-8 byte count spanned by an ordered, valid range, counting one
    /// byte for each paragraph break crossed.
    #[must_use]
    pub fn byte_length(&self, range: Range) -> usize {
        let r = range.ordered();
        let (fp, tp) = (r.from.pn as usize, r.to.pn as usize);
        let first = &self.paragraphs[fp];
        if fp == tp {
            return first.byte_offset(r.to.gp as usize) - first.byte_offset(r.from.gp as usize);
        }
        let mut n = first.bytes() - first.byte_offset(r.from.gp as usize) + 1;
        n += self.paragraphs[fp + 1..tp]
            .iter()
            .map(|p| p.bytes() + 1)
            .sum::<usize>();
        n + self.paragraphs[tp].byte_offset(r.to.gp as usize)
    }

    /// Owned copy of the text inside an ordered, valid range.
    ///
    /// Fails with [`Error::OutOfMemory`] instead of aborting when the copy
    /// cannot be allocated.
    pub fn copy_range(&self, range: Range) -> Result<Text<'static>> {
        let r = range.ordered();
        let mut paragraphs = Vec::new();
        paragraphs.try_reserve_exact((r.to.pn - r.from.pn) as usize + 1)?;
        for pn in r.from.pn..=r.to.pn {
            let p = &self.paragraphs[pn as usize];
            let from = if pn == r.from.pn { r.from.gp as usize } else { 0 };
            let to = if pn == r.to.pn { r.to.gp as usize } else { p.glyphs() };
            paragraphs.push(GlyphString::try_owned(p.slice(from, to))?);
        }
        Ok(Text { paragraphs })
    }

    /// Append the text of an ordered, valid range to `out`.
    pub fn write_range(&self, range: Range, out: &mut String) {
        let r = range.ordered();
        for pn in r.from.pn..=r.to.pn {
            let p = &self.paragraphs[pn as usize];
            let from = if pn == r.from.pn { r.from.gp as usize } else { 0 };
            let to = if pn == r.to.pn { r.to.gp as usize } else { p.glyphs() };
            if pn != r.from.pn {
                out.push('\n');
            }
            out.push_str(p.slice(from, to));
        }
    }

    /// Detach every paragraph from the source buffer.
    #[must_use]
    pub fn into_owned(self) -> Text<'static> {
        Text {
            paragraphs: self
                .paragraphs
                .into_iter()
                .map(GlyphString::into_owned)
                .collect(),
        }
    }

    /// Replace the ordered, valid range `range` with `insert`, returning the
    /// position just after the inserted text.
    ///
    /// All allocation happens before the paragraph list is touched, so an
    /// `OutOfMemory` error leaves the text unchanged.
    pub(crate) fn splice(&mut self, range: Range, insert: &Text<'_>) -> Result<Pg> {
        let (fp, tp) = (range.from.pn as usize, range.to.pn as usize);
        let first = &self.paragraphs[fp];
        let last = &self.paragraphs[tp];
        let prefix = first.slice(0, range.from.gp as usize);
        let suffix = last.slice(range.to.gp as usize, last.glyphs());

        let n = insert.np();
        let mut fresh: Vec<GlyphString<'a>> = Vec::new();
        fresh.try_reserve_exact(n)?;
        for (i, p) in insert.paragraphs.iter().enumerate() {
            let head = if i == 0 { prefix } else { "" };
            let tail = if i + 1 == n { suffix } else { "" };
            let mut s = String::new();
            s.try_reserve_exact(head.len() + p.bytes() + tail.len())?;
            s.push_str(head);
            s.push_str(p.as_str());
            s.push_str(tail);
            fresh.push(GlyphString::try_from_string(s)?);
        }
        let end = end_of_insert(range.from, insert);
        self.paragraphs.try_reserve(n.saturating_sub(tp - fp + 1))?;
        self.paragraphs.splice(fp..=tp, fresh);
        Ok(end)
    }
}

/// Position just past `text` when it is inserted at `at`.
#[must_use]
pub fn end_of_insert(at: Pg, text: &Text<'_>) -> Pg {
    let tail = text.end();
    if tail.pn == 0 {
        Pg::new(at.pn, at.gp + tail.gp)
    } else {
        Pg::new(at.pn + tail.pn, tail.gp)
    }
}

impl<'a> From<&'a str> for Text<'a> {
    fn from(s: &'a str) -> Self {
        Self::from_str(s)
    }
}

impl fmt::Display for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(p.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.paragraphs.iter().map(GlyphString::as_str))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(a: (i32, i32), b: (i32, i32)) -> Range {
        Range::new(Pg::new(a.0, a.1), Pg::new(b.0, b.1))
    }

    #[test]
    fn test_parse_splits_paragraphs() {
        let t = Text::parse(b"ab\ncd\n").unwrap();
        assert_eq!(t.np(), 3);
        assert_eq!(t.paragraph(1).as_str(), "cd");
        assert!(t.paragraph(2).is_empty());
        assert!(t.paragraph(0).is_borrowed());
        assert_eq!(t.to_string(), "ab\ncd\n");
    }

    #[test]
    fn test_empty_input_has_one_paragraph() {
        let t = Text::parse(b"").unwrap();
        assert_eq!(t.np(), 1);
        assert_eq!(t.all(), r((0, 0), (0, 0)));
    }

    #[test]
    fn test_invalid_encoding_reports_absolute_offset() {
        let err = Text::parse(b"ok\nbad\xC3").unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding { offset: 6 }));
    }

    #[test]
    fn test_contains_and_check() {
        let t = Text::from_str("ab\ncd");
        assert!(t.contains(Pg::new(1, 2)));
        assert!(!t.contains(Pg::new(1, 3)));
        assert!(t.contains(Pg::new(2, 0)));
        assert!(!t.contains(Pg::new(2, 1)));
        assert!(!t.contains(Pg::new(-1, 0)));
        assert_eq!(t.check(Pg::new(2, 0)).unwrap(), Pg::new(1, 2));
        assert!(matches!(
            t.check(Pg::new(0, 9)),
            Err(Error::OutOfRange { pn: 0, gp: 9 })
        ));
    }

    #[test]
    fn test_byte_length_counts_breaks() {
        let t = Text::from_str("añb\ncd\nef");
        assert_eq!(t.byte_length(r((0, 1), (0, 2))), 2);
        assert_eq!(t.byte_length(r((0, 1), (2, 1))), 3 + 1 + 2 + 1 + 1);
        assert_eq!(t.byte_length(t.all()), t.to_string().len());
    }

    #[test]
    fn test_copy_and_write_range() {
        let t = Text::from_str("hello\nbig\nworld");
        let c = t.copy_range(r((0, 3), (2, 2))).unwrap();
        assert_eq!(c.to_string(), "lo\nbig\nwo");
        let mut s = String::new();
        t.write_range(r((2, 2), (0, 3)), &mut s);
        assert_eq!(s, "lo\nbig\nwo");
    }

    #[test]
    fn test_splice_inline() {
        let mut t = Text::from_str("ab\ncd");
        let end = t.splice(r((0, 1), (0, 1)), &Text::from_str("X")).unwrap();
        assert_eq!(t.to_string(), "aXb\ncd");
        assert_eq!(end, Pg::new(0, 2));
    }

    #[test]
    fn test_splice_across_paragraphs() {
        let mut t = Text::from_str("one\ntwo\nthree");
        let end = t
            .splice(r((0, 2), (2, 2)), &Text::from_str("A\nB"))
            .unwrap();
        assert_eq!(t.to_string(), "onA\nBree");
        assert_eq!(end, Pg::new(1, 1));
        assert!(!t.paragraph(0).is_borrowed());
    }

    #[test]
    fn test_end_of_insert() {
        let at = Pg::new(2, 4);
        assert_eq!(end_of_insert(at, &Text::from_str("xyz")), Pg::new(2, 7));
        assert_eq!(end_of_insert(at, &Text::from_str("x\nyz")), Pg::new(3, 2));
        assert_eq!(end_of_insert(at, &Text::from_str("")), at);
    }

    #[test]
    fn test_splice_end_agrees_with_end_of_insert() {
        for insert in ["", "ab", "a\nb", "\n\nxyz"] {
            let mut t = Text::from_str("hello\nworld");
            let ins = Text::from_str(insert);
            let end = t.splice(r((0, 2), (1, 3)), &ins).unwrap();
            assert_eq!(end, end_of_insert(Pg::new(0, 2), &ins), "insert {insert:?}");
        }
    }

    #[test]
    fn test_copy_range_detaches_from_source() {
        let src = b"alpha\nbeta\ngamma";
        let t = Text::parse(src).unwrap();
        assert!(t.paragraph(1).is_borrowed());
        let c = t.copy_range(r((0, 2), (2, 3))).unwrap();
        assert_eq!(c.to_string(), "pha\nbeta\ngam");
        for p in c.paragraphs() {
            assert!(!p.is_borrowed());
        }
        let caret = t.copy_range(r((1, 2), (1, 2))).unwrap();
        assert_eq!(caret.to_string(), "");
    }
}
