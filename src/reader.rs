//! Buffered reader with bounded lookahead
//!
//! Bytes are pulled from the source into a fixed-capacity buffer. `peek` looks
//! at staged bytes without consuming them, `read_until` and `read_line` consume
//! delimited tokens of any length.

use crate::capacity::{self, DEFAULT_CAPACITY};
use crate::error::{BufError, Result};
use std::io::{self, BufRead, Read};
use tracing::{debug, trace};

/// Where a reader is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Ready for the next request
    Idle,
    /// Pulling bytes from the source to satisfy a request
    Filling,
    /// Source ended and nothing is left to consume; sticky until `reset`
    Exhausted,
}

/// Bytes consumed by `read_until`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Consumed bytes, delimiter included when found
    pub bytes: Vec<u8>,
    /// Whether the token ended on the delimiter rather than end of stream
    pub found: bool,
}

/// Line consumed by `read_line`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line content without `\n` or `\r\n`
    pub text: Vec<u8>,
    /// Whether a terminator was seen rather than end of stream
    pub had_newline: bool,
}

/// Buffered reader over any `Read` source with a fixed capacity
pub struct BufferedReader<R: Read> {
    inner: R,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    // Bytes handed back after a failed pull; read before `buf`.
    // Only non-empty while `buf` holds nothing unconsumed.
    carry: Vec<u8>,
    eof: bool,
    state: ReaderState,
}

impl<R: Read> BufferedReader<R> {
    /// Create a reader with the default capacity (4096 bytes)
    pub fn new(inner: R) -> Self {
        Self::build(inner, DEFAULT_CAPACITY)
    }

    /// Create a reader with an explicit capacity
    ///
    /// Fails with `InvalidCapacity` when `capacity` is zero.
    pub fn with_capacity(capacity: usize, inner: R) -> Result<Self> {
        let capacity = capacity::validate(capacity)?;
        Ok(Self::build(inner, capacity))
    }

    /// Create a reader whose capacity is chosen from the expected input size
    pub fn with_size_hint(inner: R, size_hint: Option<u64>) -> Self {
        Self::build(inner, capacity::capacity_for_hint(size_hint))
    }

    fn build(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            filled: 0,
            carry: Vec::new(),
            eof: false,
            state: ReaderState::Idle,
        }
    }

    /// Look at the next `n` bytes without consuming them
    ///
    /// # Example
    /// ```
    /// use s_bufio::{BufError, BufferedReader};
    ///
    /// let text = "I'd love to have some coffee right about now";
    /// let mut reader = BufferedReader::with_capacity(25, text.as_bytes())?;
    ///
    /// assert_eq!(reader.peek(3)?, b"I'd");
    /// assert!(matches!(reader.peek(30), Err(BufError::BufferTooSmall { .. })));
    /// # Ok::<(), s_bufio::BufError>(())
    /// ```
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.buf.len() {
            debug!(
                requested = n,
                capacity = self.buf.len(),
                "peek exceeds buffer capacity"
            );
            return Err(BufError::BufferTooSmall {
                requested: n,
                capacity: self.buf.len(),
            });
        }

        if !self.carry.is_empty() {
            if self.carry.len() >= n {
                self.state = ReaderState::Idle;
                return Ok(&self.carry[..n]);
            }
            // n fits the buffer, and the buffer is empty while carry is not
            let len = self.carry.len();
            self.buf[..len].copy_from_slice(&self.carry);
            self.pos = 0;
            self.filled = len;
            self.carry.clear();
        }

        while self.filled - self.pos < n && !self.eof {
            self.state = ReaderState::Filling;
            if let Err(e) = self.fill() {
                self.settle();
                return Err(e);
            }
        }
        self.settle();

        if self.filled - self.pos < n {
            return Err(BufError::EndOfStream {
                partial: self.buf[self.pos..self.filled].to_vec(),
            });
        }
        Ok(&self.buf[self.pos..self.pos + n])
    }

    /// Consume bytes up to and including the first `delimiter`
    ///
    /// If the source ends first, everything left is returned with
    /// `found == false`. Once nothing is left at all the call fails with
    /// `EndOfStream`. When the source fails mid-token, the bytes scanned so
    /// far are kept and returned by the next call.
    pub fn read_until(&mut self, delimiter: u8) -> Result<Token> {
        let mut bytes = std::mem::take(&mut self.carry);
        if let Some(i) = bytes.iter().position(|&b| b == delimiter) {
            self.carry = bytes.split_off(i + 1);
            self.settle();
            return Ok(Token { bytes, found: true });
        }

        loop {
            let staged = &self.buf[self.pos..self.filled];
            if let Some(i) = staged.iter().position(|&b| b == delimiter) {
                bytes.extend_from_slice(&staged[..=i]);
                self.pos += i + 1;
                self.settle();
                return Ok(Token { bytes, found: true });
            }
            bytes.extend_from_slice(staged);
            self.pos = self.filled;

            if self.eof {
                self.settle();
                if bytes.is_empty() {
                    return Err(BufError::EndOfStream {
                        partial: Vec::new(),
                    });
                }
                return Ok(Token {
                    bytes,
                    found: false,
                });
            }

            self.state = ReaderState::Filling;
            if let Err(e) = self.fill() {
                self.restore(bytes);
                return Err(e);
            }
        }
    }

    /// Consume one line, stripping the `\n` or `\r\n` terminator
    pub fn read_line(&mut self) -> Result<Line> {
        let Token { mut bytes, found } = self.read_until(b'\n')?;
        if found {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        Ok(Line {
            text: bytes,
            had_newline: found,
        })
    }

    /// Consume a single byte, `None` at end of stream
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        match self.peek(1) {
            Ok(bytes) => {
                let byte = bytes[0];
                self.consume(1);
                Ok(Some(byte))
            }
            Err(BufError::EndOfStream { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Drop the lookahead and start reading from `inner`, returning the old source
    pub fn reset(&mut self, inner: R) -> R {
        debug!(
            discarded = self.buffered(),
            "reader reset to new source"
        );
        self.pos = 0;
        self.filled = 0;
        self.carry.clear();
        self.eof = false;
        self.state = ReaderState::Idle;
        std::mem::replace(&mut self.inner, inner)
    }

    /// Bytes staged but not yet consumed
    pub fn buffered(&self) -> usize {
        self.carry.len() + self.filled - self.pos
    }

    /// Fixed buffer capacity
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Borrow the source
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the source.
    ///
    /// Reading from it directly skips over the staged lookahead.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Return the source, discarding the lookahead
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Pull more bytes from the source into the free tail of the buffer
    fn fill(&mut self) -> Result<()> {
        if self.pos > 0 {
            self.buf.copy_within(self.pos..self.filled, 0);
            self.filled -= self.pos;
            self.pos = 0;
        }
        if self.filled == self.buf.len() {
            return Ok(());
        }

        loop {
            match self.inner.read(&mut self.buf[self.filled..]) {
                Ok(0) => {
                    self.eof = true;
                    trace!("source reported end of stream");
                    return Ok(());
                }
                Ok(n) => {
                    trace!(bytes = n, "pulled from source");
                    self.filled += n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Put back bytes that were taken off the stream but never returned.
    ///
    /// Only valid while nothing is staged in `buf`, which holds whenever a
    /// pull from the source has just failed.
    pub(crate) fn restore(&mut self, mut bytes: Vec<u8>) {
        debug_assert_eq!(self.pos, self.filled);
        if !bytes.is_empty() {
            debug!(bytes = bytes.len(), "kept partial token after source error");
            bytes.append(&mut self.carry);
            self.carry = bytes;
        }
        self.settle();
    }

    fn settle(&mut self) {
        if self.eof && self.pos == self.filled && self.carry.is_empty() {
            if self.state != ReaderState::Exhausted {
                debug!("reader exhausted");
            }
            self.state = ReaderState::Exhausted;
        } else {
            self.state = ReaderState::Idle;
        }
    }
}

impl<R: Read> Read for BufferedReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        // Nothing staged and the caller wants at least a full buffer: skip staging
        if self.carry.is_empty()
            && self.pos == self.filled
            && out.len() >= self.buf.len()
            && !self.eof
        {
            self.state = ReaderState::Filling;
            let result = loop {
                match self.inner.read(out) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    other => break other,
                }
            };
            if let Ok(0) = result {
                self.eof = true;
            }
            self.settle();
            return result;
        }

        let staged = self.fill_buf()?;
        let n = staged.len().min(out.len());
        out[..n].copy_from_slice(&staged[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for BufferedReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if !self.carry.is_empty() {
            self.state = ReaderState::Idle;
            return Ok(&self.carry);
        }
        if self.pos == self.filled && !self.eof {
            self.state = ReaderState::Filling;
            if let Err(e) = self.fill() {
                self.settle();
                return Err(e.into());
            }
        }
        self.settle();
        Ok(&self.buf[self.pos..self.filled])
    }

    fn consume(&mut self, amt: usize) {
        if !self.carry.is_empty() {
            let amt = amt.min(self.carry.len());
            self.carry.drain(..amt);
        } else {
            self.pos = (self.pos + amt).min(self.filled);
        }
        self.settle();
    }
}

impl<R: Read + std::fmt::Debug> std::fmt::Debug for BufferedReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedReader")
            .field("inner", &self.inner)
            .field("buffered", &self.buffered())
            .field("capacity", &self.buf.len())
            .field("state", &self.state)
            .finish()
    }
}
