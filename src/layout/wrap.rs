//! Word wrapping of a single paragraph into runs.

use super::Run;
use super::metrics::TextMeasure;
use crate::text::GlyphString;

/// Largest number of glyphs, starting at glyph `gp` and at most `limit`,
/// whose measured width does not exceed `width`.
///
/// Widths are probed at 1, 4, 16, ... glyphs until one overflows, then the
/// gap between the last fitting and first overflowing count is bisected.
/// Unless `allow_zero` is set the result is at least 1, so a single glyph
/// wider than `width` still makes progress.
#[must_use]
pub fn word_break(
    s: &GlyphString<'_>,
    gp: usize,
    limit: usize,
    width: i32,
    allow_zero: bool,
    metrics: &dyn TextMeasure,
) -> usize {
    if limit == 0 {
        return 0;
    }
    let text = s.as_str();
    let bp = s.byte_offset(gp);
    let fits = |k: usize| metrics.measure_width(&text[bp..s.byte_offset(gp + k)]) <= width;

    let mut good = 0;
    let mut probe = 1;
    let bad = loop {
        if !fits(probe) {
            break probe;
        }
        good = probe;
        if probe == limit {
            return probe;
        }
        probe = (probe * 4).min(limit);
    };
    let (mut lo, mut hi) = (good, bad);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    if lo == 0 && !allow_zero { 1 } else { lo }
}

/// Split a paragraph into runs no wider than `width`.
///
/// A run that would end inside a word is shortened to end after the last
/// space it contains, if any. An empty paragraph yields one empty run.
#[must_use]
pub fn paragraph_runs(s: &GlyphString<'_>, width: i32, metrics: &dyn TextMeasure) -> Vec<Run> {
    let glyphs = s.glyphs();
    if glyphs == 0 {
        return vec![Run::default()];
    }
    let text = s.as_str();
    let bytes = s.as_bytes();
    let mut runs = Vec::new();
    let mut gp = 0;
    while gp < glyphs {
        let mut count = word_break(s, gp, glyphs - gp, width, false, metrics);
        let bp = s.byte_offset(gp);
        let mut end = s.byte_offset(gp + count);
        if count > 1 && gp + count < glyphs && bytes[end - 1] != b' ' {
            if let Some(space) = bytes[bp..end].iter().rposition(|&b| b == b' ') {
                end = bp + space + 1;
                count = text[bp..end].chars().count();
            }
        }
        runs.push(Run {
            bp,
            gp,
            bytes: end - bp,
            glyphs: count,
            pixels: metrics.measure_width(&text[bp..end]),
        });
        gp += count;
    }
    runs
}

/// Glyph index within `run` closest to the horizontal offset `x`, snapping
/// to whichever neighbouring glyph boundary is nearer. The result never
/// exceeds `max` glyphs from the run start.
#[must_use]
pub fn glyph_at_x(
    s: &GlyphString<'_>,
    run: &Run,
    x: i32,
    max: usize,
    metrics: &dyn TextMeasure,
) -> usize {
    if x <= 0 || run.glyphs == 0 {
        return 0;
    }
    let k = word_break(s, run.gp, run.glyphs, x, true, metrics);
    if k >= max {
        return max;
    }
    let text = s.as_str();
    let bp = run.bp;
    let x0 = metrics.measure_width(&text[bp..s.byte_offset(run.gp + k)]);
    let x1 = metrics.measure_width(&text[bp..s.byte_offset(run.gp + k + 1)]);
    if x1 - x < x - x0 { k + 1 } else { k }
}
