//! UTF-8 sequence primitives.
//!
//! A glyph here is one decoded codepoint. These functions are pure and carry
//! no state; paragraph storage builds its glyph-to-byte table from them.

use crate::error::{Error, Result};

#[inline]
const fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Length of the UTF-8 sequence starting at `bytes[0]`.
///
/// Fails with [`Error::InvalidEncoding`] when the leading byte cannot start a
/// 1-4 byte sequence, when a continuation byte is malformed, or when the
/// sequence runs past the end of `bytes`. Overlong forms, UTF-16 surrogates
/// and codepoints above U+10FFFF are rejected at the second byte, which keeps
/// the result in agreement with [`std::str::from_utf8`].
///
/// # Example
///
/// ```
/// use paraedit::unicode::utf8_sequence_length;
///
/// assert_eq!(utf8_sequence_length(b"a").unwrap(), 1);
/// assert_eq!(utf8_sequence_length("é".as_bytes()).unwrap(), 2);
/// assert!(utf8_sequence_length(&[0xE2, 0x82]).is_err());
/// assert!(utf8_sequence_length(&[0xED, 0xA0, 0x80]).is_err());
/// ```
pub fn utf8_sequence_length(bytes: &[u8]) -> Result<usize> {
    let Some(&lead) = bytes.first() else {
        return Err(Error::InvalidEncoding { offset: 0 });
    };
    let (len, second) = match lead {
        0x00..=0x7F => return Ok(1),
        0xC2..=0xDF => (2, 0x80..=0xBF),
        0xE0 => (3, 0xA0..=0xBF),
        0xED => (3, 0x80..=0x9F),
        0xE1..=0xEF => (3, 0x80..=0xBF),
        0xF0 => (4, 0x90..=0xBF),
        0xF4 => (4, 0x80..=0x8F),
        0xF1..=0xF3 => (4, 0x80..=0xBF),
        _ => return Err(Error::InvalidEncoding { offset: 0 }),
    };
    for i in 1..len {
        let Some(&b) = bytes.get(i) else {
            return Err(Error::InvalidEncoding { offset: bytes.len() });
        };
        let ok = if i == 1 {
            second.contains(&b)
        } else {
            is_continuation(b)
        };
        if !ok {
            return Err(Error::InvalidEncoding { offset: i });
        }
    }
    Ok(len)
}

/// Number of glyphs (codepoints) in `s`.
#[inline]
#[must_use]
pub fn glyph_count(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of glyph `gi` in `s`; `gi == glyph_count(s)` maps to `s.len()`.
#[must_use]
pub fn glyph_to_byte_offset(s: &str, gi: usize) -> Option<usize> {
    s.char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(s.len()))
        .nth(gi)
}

/// Glyph-to-byte table for `s`: `g2b[0] == 0`, `g2b[glyph_count] == s.len()`.
#[must_use]
pub fn glyph_offsets(s: &str) -> Vec<usize> {
    let mut g2b = Vec::with_capacity(s.len() + 1);
    g2b.extend(s.char_indices().map(|(b, _)| b));
    g2b.push(s.len());
    g2b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_lengths() {
        assert_eq!(utf8_sequence_length(b"abc").unwrap(), 1);
        assert_eq!(utf8_sequence_length("ü".as_bytes()).unwrap(), 2);
        assert_eq!(utf8_sequence_length("漢".as_bytes()).unwrap(), 3);
        assert_eq!(utf8_sequence_length("😀".as_bytes()).unwrap(), 4);
    }

    #[test]
    fn test_invalid_lead_bytes() {
        assert!(utf8_sequence_length(&[]).is_err());
        assert!(utf8_sequence_length(&[0x80]).is_err());
        assert!(utf8_sequence_length(&[0xC0, 0x80]).is_err());
        assert!(utf8_sequence_length(&[0xFF]).is_err());
    }

    #[test]
    fn test_truncated_and_bad_continuation() {
        assert!(matches!(
            utf8_sequence_length(&[0xF0, 0x9F, 0x98]),
            Err(Error::InvalidEncoding { offset: 3 })
        ));
        assert!(matches!(
            utf8_sequence_length(&[0xE2, 0x41, 0x82]),
            Err(Error::InvalidEncoding { offset: 1 })
        ));
    }

    #[test]
    fn test_rejects_surrogates_overlongs_and_out_of_range() {
        let cases: [&[u8]; 6] = [
            &[0xED, 0xA0, 0x80],
            &[0xED, 0xBF, 0xBF],
            &[0xE0, 0x80, 0x80],
            &[0xE0, 0x9F, 0xBF],
            &[0xF0, 0x80, 0x80, 0x80],
            &[0xF4, 0x90, 0x80, 0x80],
        ];
        for bytes in cases {
            assert!(
                matches!(
                    utf8_sequence_length(bytes),
                    Err(Error::InvalidEncoding { offset: 1 })
                ),
                "{bytes:02X?}"
            );
            assert!(std::str::from_utf8(bytes).is_err());
        }
        assert_eq!(utf8_sequence_length(&[0xED, 0x9F, 0xBF]).unwrap(), 3);
        assert_eq!(utf8_sequence_length(&[0xE0, 0xA0, 0x80]).unwrap(), 3);
        assert_eq!(utf8_sequence_length(&[0xF0, 0x90, 0x80, 0x80]).unwrap(), 4);
        assert_eq!(utf8_sequence_length(&[0xF4, 0x8F, 0xBF, 0xBF]).unwrap(), 4);
    }

    #[test]
    fn test_agrees_with_std_on_every_lead_and_second_byte() {
        for lead in 0u8..=0xFF {
            for second in 0u8..=0xFF {
                let bytes = [lead, second, 0x80, 0x80];
                let ours = utf8_sequence_length(&bytes);
                let first = match std::str::from_utf8(&bytes) {
                    Ok(s) => s.chars().next().map(char::len_utf8),
                    Err(e) if e.valid_up_to() > 0 => {
                        std::str::from_utf8(&bytes[..e.valid_up_to()])
                            .ok()
                            .and_then(|s| s.chars().next())
                            .map(char::len_utf8)
                    }
                    Err(_) => None,
                };
                assert_eq!(ours.ok(), first, "{lead:02X} {second:02X}");
            }
        }
    }

    #[test]
    fn test_glyph_offsets() {
        let s = "aé漢";
        assert_eq!(glyph_count(s), 3);
        assert_eq!(glyph_offsets(s), vec![0, 1, 3, 6]);
        assert_eq!(glyph_to_byte_offset(s, 2), Some(3));
        assert_eq!(glyph_to_byte_offset(s, 3), Some(6));
        assert_eq!(glyph_to_byte_offset(s, 4), None);
        assert_eq!(glyph_offsets(""), vec![0]);
    }
}
