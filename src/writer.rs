//! Buffered writer that batches small writes before handing them to a sink
//!
//! Three situations drive the buffer:
//! - The buffer fills up: bytes stay staged until the next write no longer fits
//! - The buffer has slack: nothing reaches the sink until `flush()`
//! - A single write is larger than the capacity: the buffer is skipped entirely
//!
//! Dropping a `BufferedWriter` does not flush. Call `flush()` or `into_inner()`
//! before letting it go, or the staged bytes are lost.

use crate::capacity::{self, DEFAULT_CAPACITY};
use crate::error::Result;
use crc32fast::Hasher as Crc32;
use std::io::{self, Write};
use tracing::debug;

/// Snapshot of what a writer has done so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteStats {
    /// Number of times staged bytes were handed to the sink
    pub flushes: u64,
    /// Number of oversized writes that skipped the buffer
    pub direct_writes: u64,
    /// Bytes accepted from callers
    pub bytes_accepted: u64,
    /// Bytes the sink has accepted
    pub bytes_delivered: u64,
    /// CRC-32 of every byte delivered to the sink, in order
    pub crc32: u32,
}

/// Tracks byte counts and the checksum of the delivered stream
struct DeliveryCounter {
    crc: Crc32,
    flushes: u64,
    direct_writes: u64,
    bytes_accepted: u64,
    bytes_delivered: u64,
}

impl DeliveryCounter {
    fn new() -> Self {
        Self {
            crc: Crc32::new(),
            flushes: 0,
            direct_writes: 0,
            bytes_accepted: 0,
            bytes_delivered: 0,
        }
    }

    fn accept(&mut self, count: usize) {
        self.bytes_accepted += count as u64;
    }

    fn deliver(&mut self, data: &[u8]) {
        self.crc.update(data);
        self.bytes_delivered += data.len() as u64;
    }

    fn snapshot(&self) -> WriteStats {
        WriteStats {
            flushes: self.flushes,
            direct_writes: self.direct_writes,
            bytes_accepted: self.bytes_accepted,
            bytes_delivered: self.bytes_delivered,
            crc32: self.crc.clone().finalize(),
        }
    }
}

/// Buffered writer over any `Write` sink with a fixed capacity
pub struct BufferedWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
    capacity: usize,
    counter: DeliveryCounter,
}

impl<W: Write> BufferedWriter<W> {
    /// Create a writer with the default capacity (4096 bytes)
    pub fn new(inner: W) -> Self {
        Self::build(inner, DEFAULT_CAPACITY)
    }

    /// Create a writer with an explicit capacity
    ///
    /// Fails with `InvalidCapacity` when `capacity` is zero.
    pub fn with_capacity(capacity: usize, inner: W) -> Result<Self> {
        let capacity = capacity::validate(capacity)?;
        Ok(Self::build(inner, capacity))
    }

    /// Create a writer whose capacity is chosen from the expected output size
    ///
    /// # Example
    /// ```
    /// use s_bufio::BufferedWriter;
    ///
    /// let writer = BufferedWriter::with_size_hint(Vec::<u8>::new(), Some(500_000));
    /// assert_eq!(writer.capacity(), 64 * 1024);
    /// ```
    pub fn with_size_hint(inner: W, size_hint: Option<u64>) -> Self {
        Self::build(inner, capacity::capacity_for_hint(size_hint))
    }

    fn build(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(capacity),
            capacity,
            counter: DeliveryCounter::new(),
        }
    }

    /// Stage `data`, flushing first when it would overflow the buffer
    ///
    /// Returns `data.len()`; the writer never reports a short write. A block
    /// larger than the capacity goes straight to the sink once the staged bytes
    /// have been flushed.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.pending.len() + data.len() > self.capacity {
            self.flush_pending()?;

            if data.len() > self.capacity {
                debug!(
                    len = data.len(),
                    capacity = self.capacity,
                    "write exceeds capacity, bypassing buffer"
                );
                let (written, outcome) =
                    write_counted(&mut self.inner, &mut self.counter, data);
                if let Err(e) = outcome {
                    debug!(delivered = written, error = %e, "direct write failed");
                    return Err(e.into());
                }
                self.counter.direct_writes += 1;
                self.counter.accept(data.len());
                return Ok(data.len());
            }
        }

        self.pending.extend_from_slice(data);
        self.counter.accept(data.len());
        Ok(data.len())
    }

    /// Write a string slice
    pub fn write_str(&mut self, s: &str) -> Result<usize> {
        self.write(s.as_bytes())
    }

    /// Write a single code point as UTF-8, returning its encoded length
    pub fn write_char(&mut self, c: char) -> Result<usize> {
        let mut encoded = [0u8; 4];
        self.write(c.encode_utf8(&mut encoded).as_bytes())
    }

    /// Write a single byte
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write(&[byte])?;
        Ok(())
    }

    /// Hand every staged byte to the sink and flush the sink itself
    pub fn flush(&mut self) -> Result<()> {
        self.flush_pending()?;
        self.inner.flush()?;
        Ok(())
    }

    /// Write staged bytes to the sink.
    ///
    /// On failure the bytes the sink already took are dropped from `pending`,
    /// the rest stay staged.
    fn flush_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let (written, outcome) =
            write_counted(&mut self.inner, &mut self.counter, &self.pending);
        self.pending.drain(..written);

        match outcome {
            Ok(()) => {
                self.counter.flushes += 1;
                debug!(bytes = written, "flushed buffered bytes");
                Ok(())
            }
            Err(e) => {
                debug!(
                    delivered = written,
                    remaining = self.pending.len(),
                    error = %e,
                    "flush failed"
                );
                Err(e.into())
            }
        }
    }

    /// Free space left in the buffer
    pub fn available(&self) -> usize {
        self.capacity - self.pending.len()
    }

    /// Number of staged bytes not yet handed to the sink
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Fixed buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Counters for this writer
    pub fn stats(&self) -> WriteStats {
        self.counter.snapshot()
    }

    /// Borrow the sink
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the sink.
    ///
    /// Writing to it directly bypasses any staged bytes.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Drop staged bytes and start writing to `inner`, returning the old sink
    pub fn reset(&mut self, inner: W) -> W {
        if !self.pending.is_empty() {
            debug!(discarded = self.pending.len(), "reset discarded staged bytes");
        }
        self.pending.clear();
        self.counter = DeliveryCounter::new();
        std::mem::replace(&mut self.inner, inner)
    }

    /// Flush and return the sink
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    /// Return the sink and the staged bytes without writing them
    pub fn into_parts(self) -> (W, Vec<u8>) {
        (self.inner, self.pending)
    }
}

/// Write `data` to `sink` until done or failed, recording what the sink took.
///
/// Returns how many bytes were delivered alongside the outcome, so a failed
/// write still reports its partial progress.
fn write_counted<W: Write>(
    sink: &mut W,
    counter: &mut DeliveryCounter,
    data: &[u8],
) -> (usize, io::Result<()>) {
    let mut written = 0;
    let mut outcome = Ok(());
    while written < data.len() {
        match sink.write(&data[written..]) {
            Ok(0) => {
                outcome = Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "sink accepted no bytes",
                ));
                break;
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }
    counter.deliver(&data[..written]);
    (written, outcome)
}

impl<W: Write> Write for BufferedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(BufferedWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(BufferedWriter::flush(self)?)
    }
}

impl<W: Write + std::fmt::Debug> std::fmt::Debug for BufferedWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedWriter")
            .field("inner", &self.inner)
            .field("buffered", &self.pending.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
