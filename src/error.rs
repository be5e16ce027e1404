//! Error types for paraedit.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

/// Result type alias for paraedit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for paraedit operations.
#[derive(Debug)]
pub enum Error {
    /// Malformed UTF-8 at the given byte offset of the input.
    InvalidEncoding { offset: usize },
    /// Position outside the current paragraph/glyph bounds.
    OutOfRange { pn: i32, gp: i32 },
    /// Allocation failed while splicing paragraphs.
    OutOfMemory,
    /// Caller supplied buffer cannot hold the result.
    InsufficientBuffer { required: usize, provided: usize },
    /// Size query: a buffer of `required` bytes is needed.
    MoreData { required: usize },
    /// Fuzz seeds must be odd.
    InvalidSeed(u32),
    /// Fuzz worker could not be started or terminated abnormally.
    Fuzzer(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding { offset } => {
                write!(f, "invalid UTF-8 sequence at byte {offset}")
            }
            Self::OutOfRange { pn, gp } => {
                write!(f, "position {{{pn}, {gp}}} out of range")
            }
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::InsufficientBuffer { required, provided } => {
                write!(
                    f,
                    "insufficient buffer: {required} bytes required, {provided} provided"
                )
            }
            Self::MoreData { required } => write!(f, "more data: {required} bytes required"),
            Self::InvalidSeed(seed) => write!(f, "fuzz seed {seed:#x} must be odd"),
            Self::Fuzzer(msg) => write!(f, "fuzzer: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Fuzzer(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidEncoding { offset: 7 };
        assert!(err.to_string().contains("byte 7"));

        let err = Error::OutOfRange { pn: 3, gp: -1 };
        assert_eq!(err.to_string(), "position {3, -1} out of range");

        let err = Error::InsufficientBuffer {
            required: 10,
            provided: 4,
        };
        assert!(err.to_string().contains("10 bytes required"));

        let err = Error::InvalidSeed(2);
        assert!(err.to_string().contains("0x2"));
    }

    #[test]
    fn test_try_reserve_maps_to_oom() {
        let mut v: Vec<u8> = Vec::new();
        let err: Error = v.try_reserve(usize::MAX).unwrap_err().into();
        assert!(matches!(err, Error::OutOfMemory));
    }
}
