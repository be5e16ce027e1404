//! Clipboard interface.

use crate::error::{Error, Result};

/// Platform clipboard.
///
/// `get_text` follows a query-then-fill protocol: with `None` it reports the
/// required size (text plus a NUL terminator) as [`Error::MoreData`]; with a
/// buffer it copies the text and terminator and returns the byte count.
/// An empty clipboard returns `Ok(0)` for both calls.
pub trait Clipboard {
    fn put_text(&mut self, text: &str);
    fn get_text(&self, buf: Option<&mut [u8]>) -> Result<usize>;
}

/// Process-local clipboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn put_text(&mut self, text: &str) {
        self.text = Some(text.to_owned());
    }

    fn get_text(&self, buf: Option<&mut [u8]>) -> Result<usize> {
        let Some(text) = self.text.as_deref() else {
            return Ok(0);
        };
        let required = text.len() + 1;
        let Some(buf) = buf else {
            return Err(Error::MoreData { required });
        };
        if buf.len() < required {
            return Err(Error::InsufficientBuffer {
                required,
                provided: buf.len(),
            });
        }
        buf[..text.len()].copy_from_slice(text.as_bytes());
        buf[text.len()] = 0;
        Ok(required)
    }
}

/// Read the clipboard contents with a size query followed by a fill.
///
/// Returns `Ok(None)` when the clipboard holds no text.
pub fn read_clipboard(clipboard: &dyn Clipboard) -> Result<Option<String>> {
    let required = match clipboard.get_text(None) {
        Ok(0) => return Ok(None),
        Ok(n) | Err(Error::MoreData { required: n }) => n,
        Err(e) => return Err(e),
    };
    let mut buf = vec![0u8; required];
    let n = clipboard.get_text(Some(&mut buf))?;
    buf.truncate(n);
    if buf.last() == Some(&0) {
        buf.pop();
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| Error::InvalidEncoding {
            offset: e.utf8_error().valid_up_to(),
        })
}
