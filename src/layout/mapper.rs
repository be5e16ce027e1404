//! Conversions between caret positions, runs and pixels.

use super::cache::LayoutCache;
use super::metrics::TextMeasure;
use super::wrap::glyph_at_x;
use super::{Point, Run};
use crate::text::{Pg, Pr, Text};

/// Coordinate mapping over a text, its layout cache and a scroll anchor.
///
/// Pixel coordinates are relative to the top-left corner of the viewport,
/// whose first row shows the run at `scroll`. All walks start at the scroll
/// anchor, so runs above it are never measured.
pub struct Mapper<'m, 't> {
    text: &'m Text<'t>,
    cache: &'m mut LayoutCache,
    metrics: &'m dyn TextMeasure,
    scroll: &'m mut Pr,
    height: i32,
}

impl<'m, 't> Mapper<'m, 't> {
    /// Mapper for a viewport `height` pixels tall.
    pub fn new(
        text: &'m Text<'t>,
        cache: &'m mut LayoutCache,
        metrics: &'m dyn TextMeasure,
        scroll: &'m mut Pr,
        height: i32,
    ) -> Self {
        Self {
            text,
            cache,
            metrics,
            scroll,
            height,
        }
    }

    #[must_use]
    pub fn text(&self) -> &Text<'t> {
        self.text
    }

    /// Current scroll anchor.
    #[must_use]
    pub fn scroll(&self) -> Pr {
        *self.scroll
    }

    pub fn set_scroll(&mut self, scroll: Pr) {
        *self.scroll = scroll;
    }

    fn np(&self) -> i32 {
        self.text.np() as i32
    }

    fn line_height(&self) -> i32 {
        self.metrics.line_height()
    }

    /// Number of whole runs that fit in the viewport, at least one.
    #[must_use]
    pub fn visible_runs(&self) -> usize {
        (self.height / self.line_height()).max(1) as usize
    }

    /// Runs of paragraph `pn`.
    pub fn runs(&mut self, pn: i32) -> &[Run] {
        self.cache.runs(pn as usize, self.text, self.metrics)
    }

    pub fn run_count(&mut self, pn: i32) -> usize {
        self.runs(pn).len()
    }

    pub fn run(&mut self, pn: i32, rn: i32) -> Run {
        self.runs(pn)[rn as usize]
    }

    /// Run containing `pg`. The position after the last glyph of a run
    /// belongs to the next run, except for the last run of a paragraph.
    ///
    /// Panics if no run matches, which means the layout cache was not
    /// invalidated after a document change.
    pub fn pg_to_pr(&mut self, pg: Pg) -> Pr {
        let runs = self.runs(pg.pn);
        let gp = pg.gp as usize;
        let last = runs.len() - 1;
        let rn = runs
            .iter()
            .enumerate()
            .position(|(rn, r)| r.gp <= gp && gp < r.gp + r.glyphs + usize::from(rn == last));
        match rn {
            Some(rn) => Pr::new(pg.pn, rn as i32),
            None => panic!("no run contains {pg}; layout cache out of sync"),
        }
    }

    /// Number of run transitions from `pg0` to `pg1`; requires `pg0 <= pg1`.
    pub fn runs_between(&mut self, pg0: Pg, pg1: Pg) -> usize {
        debug_assert!(pg0 <= pg1, "runs_between requires ordered positions");
        let rn0 = self.pg_to_pr(pg0).rn as usize;
        let rn1 = self.pg_to_pr(pg1).rn as usize;
        if pg0.pn == pg1.pn {
            return rn1.saturating_sub(rn0);
        }
        let mut n = self.run_count(pg0.pn) - rn0;
        for pn in pg0.pn + 1..pg1.pn {
            n += self.run_count(pn);
        }
        n + rn1
    }

    /// First glyph of the run at the scroll anchor.
    pub fn scroll_pg(&mut self) -> Pg {
        let scroll = *self.scroll;
        let runs = self.runs(scroll.pn);
        let rn = (scroll.rn.max(0) as usize).min(runs.len() - 1);
        Pg::new(scroll.pn, runs[rn].gp as i32)
    }

    /// Pixel location of `pg`, or `None` when it lies above the scroll
    /// anchor. Locations below the viewport are still reported.
    pub fn pg_to_xy(&mut self, pg: Pg) -> Option<Point> {
        let scroll = *self.scroll;
        let h = self.line_height();
        let mut y = 0;
        for pn in scroll.pn..self.np() {
            let first = if pn == scroll.pn { scroll.rn as usize } else { 0 };
            let count = self.run_count(pn);
            for rn in first..count {
                if pn == pg.pn {
                    let r = self.run(pn, rn as i32);
                    let gp = pg.gp as usize;
                    let end = r.gp + r.glyphs + usize::from(rn + 1 == count);
                    if r.gp <= gp && gp < end {
                        let s = self.text.paragraph(pn as usize);
                        let prefix = &s.as_str()[r.bp..s.byte_offset(gp)];
                        return Some(Point::new(self.metrics.measure_width(prefix), y));
                    }
                }
                y += h;
            }
            if pn >= pg.pn {
                break;
            }
        }
        None
    }

    /// Caret position at pixel `(x, y)`, or `None` when `y` is above the
    /// viewport or below the last run.
    pub fn xy_to_pg(&mut self, x: i32, y: i32) -> Option<Pg> {
        if y < 0 {
            return None;
        }
        let scroll = *self.scroll;
        let h = self.line_height();
        let mut py = 0;
        for pn in scroll.pn..self.np() {
            let first = if pn == scroll.pn { scroll.rn as usize } else { 0 };
            let count = self.run_count(pn);
            for rn in first..count {
                if py <= y && y < py + h {
                    let r = self.run(pn, rn as i32);
                    let last = usize::from(rn + 1 == count);
                    let max = (r.glyphs + last).saturating_sub(1);
                    let gp = if x >= r.pixels {
                        max
                    } else {
                        let s = self.text.paragraph(pn as usize);
                        glyph_at_x(s, &r, x, max, self.metrics)
                    };
                    return Some(Pg::new(pn, (r.gp + gp) as i32));
                }
                py += h;
            }
        }
        None
    }

    /// Move the anchor forward by up to `n` runs, stopping once the rest of
    /// the document fits in the viewport.
    pub fn scroll_up(&mut self, n: usize) {
        let end = self.text.end();
        let visible = self.visible_runs();
        for _ in 0..n {
            let top = self.scroll_pg();
            if self.runs_between(top, end) < visible {
                break;
            }
            let scroll = *self.scroll;
            if (scroll.rn as usize) + 1 < self.run_count(scroll.pn) {
                self.scroll.rn += 1;
            } else if scroll.pn + 1 < self.np() {
                *self.scroll = Pr::new(scroll.pn + 1, 0);
            } else {
                break;
            }
        }
    }

    /// Move the anchor back by up to `n` runs, stopping at the document start.
    pub fn scroll_down(&mut self, n: usize) {
        for _ in 0..n {
            let scroll = *self.scroll;
            if scroll.rn > 0 {
                self.scroll.rn -= 1;
            } else if scroll.pn > 0 {
                let pn = scroll.pn - 1;
                let rn = self.run_count(pn) as i32 - 1;
                *self.scroll = Pr::new(pn, rn);
            } else {
                break;
            }
        }
    }

    /// Adjust the anchor so that the run containing `pg` is fully visible.
    ///
    /// When the run is below the viewport it ends up on the last whole row.
    /// In single-line mode nothing scrolls while the first paragraph fits.
    pub fn scroll_into_view(&mut self, pg: Pg, single_line: bool) {
        let caret = self.pg_to_pr(pg);
        let scroll = *self.scroll;
        let h = self.line_height();
        let bottom = self.height;

        let mut last = scroll;
        let mut py = 0;
        'rows: for pn in scroll.pn..self.np() {
            let first = if pn == scroll.pn { scroll.rn } else { 0 };
            for rn in first..self.run_count(pn) as i32 {
                if py >= bottom {
                    break 'rows;
                }
                last = Pr::new(pn, rn);
                py += h;
            }
        }
        let end = self.text.end();
        if last == self.pg_to_pr(end) && py <= bottom - h {
            last = Pr::new(self.np(), 0);
        }
        if scroll <= caret && caret < last {
            return;
        }
        if caret < scroll {
            *self.scroll = caret;
            return;
        }
        if single_line && self.run_count(0) as i32 * h <= bottom {
            return;
        }
        *self.scroll = caret;
        while *self.scroll > Pr::default() {
            match self.pg_to_xy(pg) {
                Some(pt) if pt.y + h <= bottom - h => self.scroll_down(1),
                _ => break,
            }
        }
    }
}
