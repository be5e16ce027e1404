//! Display width in character cells, used by the monospace metrics.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width calculation method for ambiguous-width characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1.
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2.
    Unicode,
}

/// Cell width of a single character. Control characters occupy no cells.
#[inline]
#[must_use]
pub fn char_columns(c: char, method: WidthMethod) -> usize {
    if c.is_ascii() {
        return usize::from(!c.is_ascii_control());
    }
    match method {
        WidthMethod::WcWidth => UnicodeWidthChar::width(c).unwrap_or(0),
        WidthMethod::Unicode => UnicodeWidthChar::width_cjk(c).unwrap_or(0),
    }
}

/// Cell width of a string.
#[must_use]
pub fn str_columns(s: &str, method: WidthMethod) -> usize {
    if s.bytes().all(|b| (0x20..0x7F).contains(&b)) {
        return s.len();
    }
    if s.chars().any(|c| c.is_control()) {
        return s.chars().map(|c| char_columns(c, method)).sum();
    }
    match method {
        WidthMethod::WcWidth => UnicodeWidthStr::width(s),
        WidthMethod::Unicode => UnicodeWidthStr::width_cjk(s),
    }
}
