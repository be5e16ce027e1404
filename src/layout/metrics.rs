//! Text measurement.
//!
//! Layout never inspects fonts directly. It asks a [`TextMeasure`] how wide a
//! piece of text is and how tall a line is; everything else is derived from
//! those two answers.

use crate::unicode::{WidthMethod, str_columns};

/// Pixel measurement oracle for one font.
///
/// Implementations must be deterministic: the same text always measures the
/// same width for a given instance.
pub trait TextMeasure {
    /// Width of `text` in pixels.
    fn measure_width(&self, text: &str) -> i32;

    /// Height of one line in pixels.
    fn line_height(&self) -> i32;

    /// Width of the letter "M", used as a tolerance for vertical movement.
    fn em_width(&self) -> i32 {
        self.measure_width("M").max(1)
    }
}

/// Fixed-pitch metrics: every display cell is `cell_width` pixels wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonospaceMetrics {
    cell_width: i32,
    line_height: i32,
    method: WidthMethod,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

impl MonospaceMetrics {
    /// Create metrics with the given cell size. Both dimensions are clamped
    /// to at least one pixel.
    #[must_use]
    pub fn new(cell_width: i32, line_height: i32) -> Self {
        Self {
            cell_width: cell_width.max(1),
            line_height: line_height.max(1),
            method: WidthMethod::WcWidth,
        }
    }

    /// Use `method` for East Asian ambiguous characters.
    #[must_use]
    pub fn width_method(mut self, method: WidthMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn cell_width(&self) -> i32 {
        self.cell_width
    }
}

impl TextMeasure for MonospaceMetrics {
    fn measure_width(&self, text: &str) -> i32 {
        str_columns(text, self.method) as i32 * self.cell_width
    }

    fn line_height(&self) -> i32 {
        self.line_height
    }

    fn em_width(&self) -> i32 {
        self.cell_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_measure() {
        let m = MonospaceMetrics::new(10, 20);
        assert_eq!(m.measure_width("abc"), 30);
        assert_eq!(m.measure_width("漢"), 20);
        assert_eq!(m.measure_width(""), 0);
        assert_eq!(m.line_height(), 20);
        assert_eq!(m.em_width(), 10);
    }

    #[test]
    fn test_ambiguous_width_method() {
        let m = MonospaceMetrics::new(1, 1).width_method(WidthMethod::Unicode);
        assert_eq!(m.measure_width("①"), 2);
    }

    #[test]
    fn test_clamped_dimensions() {
        let m = MonospaceMetrics::new(0, -3);
        assert_eq!(m.cell_width(), 1);
        assert_eq!(m.line_height(), 1);
    }
}
