//! Positions and ranges addressed by paragraph and glyph index.

use std::cmp::Ordering;
use std::fmt;

/// A caret location: paragraph index and glyph index within the paragraph.
///
/// `gp` ranges over `0..=glyphs`; `gp == glyphs` is the position after the
/// last character. Positions order by paragraph first, then glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pg {
    pub pn: i32,
    pub gp: i32,
}

impl Pg {
    /// Start of the document.
    pub const ZERO: Self = Self { pn: 0, gp: 0 };
    /// Position that addresses nothing.
    pub const INVALID: Self = Self { pn: -1, gp: -1 };

    #[must_use]
    pub const fn new(pn: i32, gp: i32) -> Self {
        Self { pn, gp }
    }

    /// Whether both indices are non-negative. Says nothing about whether the
    /// position exists in a particular text.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.pn >= 0 && self.gp >= 0
    }

    /// Total-order key equivalent to comparing `(pn, gp)`.
    #[must_use]
    pub const fn key(self) -> u64 {
        ((self.pn as u32 as u64) << 32) | (self.gp as u32 as u64)
    }
}

impl Ord for Pg {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pn.cmp(&other.pn).then(self.gp.cmp(&other.gp))
    }
}

impl PartialOrd for Pg {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Pg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.pn, self.gp)
    }
}

/// A visual run address: paragraph index and run index within it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pr {
    pub pn: i32,
    pub rn: i32,
}

impl Pr {
    #[must_use]
    pub const fn new(pn: i32, rn: i32) -> Self {
        Self { pn, rn }
    }
}

/// A pair of positions. `from` is the anchor, `to` the live end.
///
/// A range is not necessarily ordered; most mutating calls order it first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub from: Pg,
    pub to: Pg,
}

impl Range {
    /// Range that addresses nothing.
    pub const INVALID: Self = Self {
        from: Pg::INVALID,
        to: Pg::INVALID,
    };

    #[must_use]
    pub const fn new(from: Pg, to: Pg) -> Self {
        Self { from, to }
    }

    /// Collapsed range at `pg`.
    #[must_use]
    pub const fn caret(pg: Pg) -> Self {
        Self { from: pg, to: pg }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.from.is_valid() && self.to.is_valid()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.from <= self.to
    }

    /// Swap the endpoints if needed so that `from <= to`.
    pub fn order(&mut self) {
        if self.from > self.to {
            std::mem::swap(&mut self.from, &mut self.to);
        }
    }

    /// Ordered copy of the range.
    #[must_use]
    pub fn ordered(mut self) -> Self {
        self.order();
        self
    }

    /// Whether `pg` lies within the range, both endpoints included,
    /// regardless of the range's orientation.
    #[must_use]
    pub fn inside(&self, pg: Pg) -> bool {
        let r = self.ordered();
        r.from <= pg && pg <= r.to
    }

    /// Overlap of two ranges, `None` when they are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let a = self.ordered();
        let b = other.ordered();
        let from = a.from.max(b.from);
        let to = a.to.min(b.to);
        (from <= to).then_some(Self { from, to })
    }

    /// Whether both endpoints lie within the same paragraph.
    #[must_use]
    pub fn is_single_paragraph(&self) -> bool {
        self.from.pn == self.to.pn
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}
