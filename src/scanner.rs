//! Token scanner built on `BufferedReader`
//!
//! Splits a source into lines, whitespace-separated words or single bytes.

use crate::error::{BufError, Result};
use crate::reader::BufferedReader;
use std::io::{BufRead, Read};

/// Largest token a scanner accepts unless configured otherwise
pub const MAX_TOKEN_SIZE: usize = 64 * 1024;

/// How a scanner cuts the stream into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// One token per line, `\n` / `\r\n` stripped; no trailing empty line
    Lines,
    /// Runs of non-whitespace bytes; ASCII whitespace separates them
    Words,
    /// Every byte is its own token
    Bytes,
}

/// Iterates over the tokens of a source
///
/// # Example
/// ```
/// use s_bufio::{Scanner, SplitMode};
///
/// let data = "A foggy mountain.\nAn old falcon.";
/// let words = Scanner::new(data.as_bytes())
///     .split(SplitMode::Words)
///     .collect::<Result<Vec<_>, _>>()?;
///
/// assert_eq!(words, ["A", "foggy", "mountain.", "An", "old", "falcon."]);
/// # Ok::<(), s_bufio::BufError>(())
/// ```
pub struct Scanner<R: Read> {
    reader: BufferedReader<R>,
    mode: SplitMode,
    max_token_size: usize,
    done: bool,
}

impl<R: Read> Scanner<R> {
    /// Scan lines from `source` with a default-capacity reader
    pub fn new(source: R) -> Self {
        Self::from_reader(BufferedReader::new(source))
    }

    /// Scan from an existing reader, keeping its lookahead
    pub fn from_reader(reader: BufferedReader<R>) -> Self {
        Self {
            reader,
            mode: SplitMode::Lines,
            max_token_size: MAX_TOKEN_SIZE,
            done: false,
        }
    }

    /// Set the split mode
    pub fn split(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the largest token accepted before failing with `TokenTooLong`
    pub fn max_token_size(mut self, limit: usize) -> Self {
        self.max_token_size = limit;
        self
    }

    /// Next raw token, `None` once the source is used up
    pub fn next_token(&mut self) -> Result<Option<Vec<u8>>> {
        let token = match self.mode {
            SplitMode::Lines => self.next_line()?,
            SplitMode::Words => self.next_word()?,
            SplitMode::Bytes => self.reader.read_byte()?.map(|b| vec![b]),
        };

        if let Some(ref bytes) = token {
            self.check_limit(bytes.len())?;
        }
        Ok(token)
    }

    fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        loop {
            let staged = match self.reader.fill_buf() {
                Ok(staged) => staged,
                Err(e) => {
                    self.reader.restore(line);
                    return Err(e.into());
                }
            };
            if staged.is_empty() {
                break;
            }

            if let Some(i) = staged.iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&staged[..i]);
                self.reader.consume(i + 1);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                self.check_limit(line.len())?;
                return Ok(Some(line));
            }

            let n = staged.len();
            line.extend_from_slice(staged);
            self.reader.consume(n);
            // a trailing '\r' may still turn out to be part of "\r\n"
            let body = line.len() - usize::from(line.last() == Some(&b'\r'));
            self.check_limit(body)?;
        }

        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    fn next_word(&mut self) -> Result<Option<Vec<u8>>> {
        // skip leading whitespace
        loop {
            let staged = self.reader.fill_buf()?;
            if staged.is_empty() {
                return Ok(None);
            }
            let skip = staged
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            let exhausted_run = skip == staged.len();
            self.reader.consume(skip);
            if !exhausted_run {
                break;
            }
        }

        let mut word = Vec::new();
        loop {
            let staged = match self.reader.fill_buf() {
                Ok(staged) => staged,
                Err(e) => {
                    self.reader.restore(word);
                    return Err(e.into());
                }
            };
            if staged.is_empty() {
                break;
            }
            let take = staged
                .iter()
                .take_while(|b| !b.is_ascii_whitespace())
                .count();
            word.extend_from_slice(&staged[..take]);
            let ended = take < staged.len();
            self.reader.consume(take);
            if ended {
                break;
            }
            self.check_limit(word.len())?;
        }
        Ok(Some(word))
    }

    fn check_limit(&self, len: usize) -> Result<()> {
        if len > self.max_token_size {
            return Err(BufError::TokenTooLong {
                limit: self.max_token_size,
            });
        }
        Ok(())
    }

    /// Borrow the underlying reader
    pub fn get_ref(&self) -> &BufferedReader<R> {
        &self.reader
    }

    /// Return the underlying reader with whatever lookahead it holds
    pub fn into_inner(self) -> BufferedReader<R> {
        self.reader
    }
}

impl<R: Read> Iterator for Scanner<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => Some(Ok(text)),
                Err(e) => {
                    self.done = true;
                    Some(Err(e.into()))
                }
            },
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
