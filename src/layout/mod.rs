//! Word-wrapped layout and coordinate mapping.
//!
//! Paragraphs are wrapped into [`Run`]s no wider than the wrap width as
//! measured by a [`TextMeasure`]. Runs are cached per paragraph in a
//! [`LayoutCache`] and recomputed lazily after invalidation. The [`Mapper`]
//! converts between caret positions, run positions and pixels relative to
//! a scroll anchor.
//!
//! # Example
//!
//! ```
//! use paraedit::layout::{LayoutCache, Mapper, MonospaceMetrics, Point};
//! use paraedit::text::{Pg, Pr, Text};
//!
//! let text = Text::from_str("the quick brown fox");
//! let metrics = MonospaceMetrics::new(10, 20);
//! let mut cache = LayoutCache::new(text.np(), 100);
//! let mut scroll = Pr::default();
//! let mut mapper = Mapper::new(&text, &mut cache, &metrics, &mut scroll, 200);
//!
//! assert_eq!(mapper.run_count(0), 2);
//! assert_eq!(mapper.pg_to_xy(Pg::new(0, 12)), Some(Point::new(20, 20)));
//! assert_eq!(mapper.xy_to_pg(20, 25), Some(Pg::new(0, 12)));
//! ```

mod cache;
mod mapper;
mod metrics;
mod wrap;

pub use cache::LayoutCache;
pub use mapper::Mapper;
pub use metrics::{MonospaceMetrics, TextMeasure};
pub use wrap::{glyph_at_x, paragraph_runs, word_break};

/// A non-wrapping visual fragment of a paragraph.
///
/// Offsets are relative to the start of the paragraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Run {
    /// Byte offset.
    pub bp: usize,
    /// Glyph offset.
    pub gp: usize,
    /// Byte length.
    pub bytes: usize,
    /// Glyph length.
    pub glyphs: usize,
    /// Measured width in pixels.
    pub pixels: i32,
}

/// A pixel location relative to the top-left of the text area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
