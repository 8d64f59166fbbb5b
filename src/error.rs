//! Error types for s-bufio

use std::io;
use std::string::FromUtf8Error;

/// Result type for s-bufio operations
pub type Result<T> = std::result::Result<T, BufError>;

/// Error types that can occur while buffering a stream
#[derive(Debug)]
pub enum BufError {
    /// I/O error reported by the wrapped sink or source
    Io(io::Error),
    /// Request can never fit in the fixed-capacity buffer
    BufferTooSmall { requested: usize, capacity: usize },
    /// Source ended before the request could be satisfied.
    ///
    /// `partial` holds whatever bytes were staged when the stream ended.
    EndOfStream { partial: Vec<u8> },
    /// Buffer capacity must be positive
    InvalidCapacity(usize),
    /// Scanner token exceeded the configured limit
    TokenTooLong { limit: usize },
    /// Scanner token is not valid UTF-8
    InvalidUtf8(FromUtf8Error),
}

impl BufError {
    /// True for `EndOfStream`, whatever partial data it carries
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, BufError::EndOfStream { .. })
    }
}

impl std::fmt::Display for BufError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufError::Io(e) => write!(f, "I/O error: {}", e),
            BufError::BufferTooSmall {
                requested,
                capacity,
            } => write!(
                f,
                "Buffer too small: requested {} bytes, capacity is {}",
                requested, capacity
            ),
            BufError::EndOfStream { partial } => {
                write!(f, "End of stream ({} bytes available)", partial.len())
            }
            BufError::InvalidCapacity(capacity) => {
                write!(f, "Invalid buffer capacity: {}", capacity)
            }
            BufError::TokenTooLong { limit } => {
                write!(f, "Token too long: limit is {} bytes", limit)
            }
            BufError::InvalidUtf8(e) => write!(f, "Invalid UTF-8 in token: {}", e),
        }
    }
}

impl std::error::Error for BufError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufError::Io(e) => Some(e),
            BufError::InvalidUtf8(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BufError {
    fn from(err: io::Error) -> Self {
        BufError::Io(err)
    }
}

impl From<FromUtf8Error> for BufError {
    fn from(err: FromUtf8Error) -> Self {
        BufError::InvalidUtf8(err)
    }
}

impl From<BufError> for io::Error {
    fn from(err: BufError) -> Self {
        match err {
            BufError::Io(e) => e,
            BufError::EndOfStream { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            BufError::InvalidUtf8(_) => io::Error::new(io::ErrorKind::InvalidData, err),
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}
