//! # s-bufio: Buffered Stream Adapters
//!
//! `s-bufio` wraps any byte sink or byte source with a fixed-capacity staging
//! buffer. Writers batch small writes and hand them to the sink only when the
//! buffer cannot take more (or on `flush()`); readers pull ahead so callers can
//! peek without consuming and split the stream on delimiters.
//!
//! ## Features
//!
//! - **Delayed Writes**: Small writes are batched, oversized writes skip the buffer
//! - **Bounded Lookahead**: `peek(n)` never stages more than the fixed capacity
//! - **Tokenization**: `read_until`, `read_line` and a `Scanner` for lines and words
//! - **Plain std I/O**: Any `Read`/`Write` works as a source or sink
//!
//! ## Quick Start
//!
//! ### Writing
//!
//! ```
//! use s_bufio::BufferedWriter;
//!
//! let mut writer = BufferedWriter::with_capacity(4, Vec::new())?;
//!
//! for byte in b"1234" {
//!     writer.write(&[*byte])?;
//! }
//! assert_eq!(writer.available(), 0);
//! assert!(writer.get_ref().is_empty());
//!
//! // '5' no longer fits: "1234" is flushed and '5' is staged alone
//! writer.write(b"5")?;
//! assert_eq!(writer.available(), 3);
//! assert_eq!(writer.get_ref(), b"1234");
//!
//! let sink = writer.into_inner()?;
//! assert_eq!(sink, b"12345");
//! # Ok::<(), s_bufio::BufError>(())
//! ```
//!
//! ### Reading
//!
//! ```
//! use s_bufio::BufferedReader;
//!
//! let mut reader = BufferedReader::new("Reading is my...\r\n favourite".as_bytes());
//!
//! let line = reader.read_line()?;
//! assert_eq!(line.text, b"Reading is my...");
//! assert!(line.had_newline);
//!
//! let line = reader.read_line()?;
//! assert_eq!(line.text, b" favourite");
//! assert!(!line.had_newline);
//! # Ok::<(), s_bufio::BufError>(())
//! ```
//!
//! Writers do not flush when dropped. Use `flush()` or `into_inner()` before
//! discarding one.

pub mod capacity;
pub mod error;
pub mod reader;
pub mod scanner;
pub mod writer;

pub use capacity::{capacity_for_hint, DEFAULT_CAPACITY};
pub use error::{BufError, Result};
pub use reader::{BufferedReader, Line, ReaderState, Token};
pub use scanner::{Scanner, SplitMode, MAX_TOKEN_SIZE};
pub use writer::{BufferedWriter, WriteStats};
