//! Unicode utilities: UTF-8 sequence decoding, display width and word
//! boundaries.

mod utf8;
mod width;
mod word;

pub use utf8::{glyph_count, glyph_offsets, glyph_to_byte_offset, utf8_sequence_length};
pub use width::{WidthMethod, char_columns, str_columns};
pub use word::{is_word_char, next_word_boundary, prev_word_boundary};
