//! Buffer sizing shared by the reader and writer

use crate::error::{BufError, Result};

/// Capacity used by `new()` constructors
pub const DEFAULT_CAPACITY: usize = 4096;

/// Pick a buffer capacity from the expected stream size
///
/// - Tiny streams (<10KB): 4KB
/// - Small streams (<100KB): 16KB
/// - Medium streams (<1MB): 64KB
/// - Large streams (<10MB): 256KB
/// - Anything bigger: 1MB
///
/// Without a hint the default capacity is used.
pub fn capacity_for_hint(size_hint: Option<u64>) -> usize {
    match size_hint {
        Some(size) if size < 10_000 => 4 * 1024,
        Some(size) if size < 100_000 => 16 * 1024,
        Some(size) if size < 1_000_000 => 64 * 1024,
        Some(size) if size < 10_000_000 => 256 * 1024,
        Some(_) => 1024 * 1024,
        None => DEFAULT_CAPACITY,
    }
}

pub(crate) fn validate(capacity: usize) -> Result<usize> {
    if capacity == 0 {
        return Err(BufError::InvalidCapacity(capacity));
    }
    Ok(capacity)
}
