//! Tests for the token scanner

use s_bufio::{BufError, BufferedReader, Result, Scanner, SplitMode};
use std::collections::VecDeque;
use std::io::{self, Read};

/// Endless run of one byte, counting how much was handed out
struct CountingSource {
    byte: u8,
    pulled: usize,
}

impl Read for CountingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        buf.fill(self.byte);
        self.pulled += buf.len();
        Ok(buf.len())
    }
}

/// Plays back chunks and errors in order, then ends
struct ScriptedSource {
    steps: VecDeque<io::Result<Vec<u8>>>,
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            None => Ok(0),
            Some(Err(e)) => Err(e),
            Some(Ok(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.steps.push_front(Ok(chunk.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

#[test]
fn test_scan_lines() -> Result<()> {
    let lines = Scanner::new("Reading is my...\r\n favourite".as_bytes())
        .collect::<Result<Vec<_>>>()?;

    assert_eq!(lines, ["Reading is my...", " favourite"]);

    Ok(())
}

#[test]
fn test_scan_lines_no_trailing_empty_token() -> Result<()> {
    let data = "an old falcon\nmisty mountains\na wise man\na rainy morning\n";
    let lines = Scanner::new(data.as_bytes()).collect::<Result<Vec<_>>>()?;

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3], "a rainy morning");

    Ok(())
}

#[test]
fn test_scan_words() -> Result<()> {
    let data = "A foggy mountain.\nAn old falcon.\nA wise man.";
    let words = Scanner::new(data.as_bytes())
        .split(SplitMode::Words)
        .collect::<Result<Vec<_>>>()?;

    assert_eq!(words.len(), 9);
    assert_eq!(
        words,
        ["A", "foggy", "mountain.", "An", "old", "falcon.", "A", "wise", "man."]
    );

    Ok(())
}

#[test]
fn test_scan_words_across_small_buffer() -> Result<()> {
    let reader = BufferedReader::with_capacity(3, "  alpha\t\tbeta  gamma   ".as_bytes())?;
    let words = Scanner::from_reader(reader)
        .split(SplitMode::Words)
        .collect::<Result<Vec<_>>>()?;

    assert_eq!(words, ["alpha", "beta", "gamma"]);

    Ok(())
}

#[test]
fn test_scan_words_only_whitespace() -> Result<()> {
    let mut scanner = Scanner::new(" \n\t ".as_bytes()).split(SplitMode::Words);
    assert_eq!(scanner.next_token()?, None);

    Ok(())
}

#[test]
fn test_scan_bytes() -> Result<()> {
    let mut scanner = Scanner::new("ab".as_bytes()).split(SplitMode::Bytes);

    assert_eq!(scanner.next_token()?, Some(vec![b'a']));
    assert_eq!(scanner.next_token()?, Some(vec![b'b']));
    assert_eq!(scanner.next_token()?, None);

    Ok(())
}

#[test]
fn test_token_too_long_stops_iteration() {
    let data = "short\nthis line is far too long\nnever reached\n";
    let mut scanner = Scanner::new(data.as_bytes()).max_token_size(10);

    assert_eq!(scanner.next().unwrap().unwrap(), "short");
    assert!(matches!(
        scanner.next(),
        Some(Err(BufError::TokenTooLong { limit: 10 }))
    ));
    assert!(scanner.next().is_none());
}

#[test]
fn test_invalid_utf8_is_reported() {
    let data: &[u8] = &[0xff, 0xfe, b'\n'];
    let mut scanner = Scanner::new(data);

    assert!(matches!(scanner.next(), Some(Err(BufError::InvalidUtf8(_)))));
    assert!(scanner.next().is_none());
}

#[test]
fn test_scanner_hands_back_reader() -> Result<()> {
    let mut scanner = Scanner::new("first\nsecond\n".as_bytes());
    assert_eq!(scanner.next().transpose()?, Some("first".to_string()));

    let mut reader = scanner.into_inner();
    assert_eq!(reader.read_line()?.text, b"second");

    Ok(())
}

#[test]
fn test_overlong_line_stops_pulling_early() -> Result<()> {
    let source = CountingSource {
        byte: b'x',
        pulled: 0,
    };
    let reader = BufferedReader::with_capacity(64, source)?;
    let mut scanner = Scanner::from_reader(reader).max_token_size(10);

    assert!(matches!(
        scanner.next_token(),
        Err(BufError::TokenTooLong { limit: 10 })
    ));
    assert!(scanner.get_ref().get_ref().pulled <= 64);

    Ok(())
}

#[test]
fn test_line_at_limit_with_crlf_split_across_fills() -> Result<()> {
    let reader = BufferedReader::with_capacity(5, "abcd\r\nef".as_bytes())?;
    let mut scanner = Scanner::from_reader(reader).max_token_size(4);

    assert_eq!(scanner.next_token()?, Some(b"abcd".to_vec()));
    assert_eq!(scanner.next_token()?, Some(b"ef".to_vec()));
    assert_eq!(scanner.next_token()?, None);

    Ok(())
}

#[test]
fn test_source_error_mid_line_keeps_partial() -> Result<()> {
    let source = ScriptedSource {
        steps: VecDeque::from(vec![
            Ok(b"hel".to_vec()),
            Err(io::Error::new(io::ErrorKind::TimedOut, "slow")),
            Ok(b"lo\nworld".to_vec()),
        ]),
    };
    let reader = BufferedReader::with_capacity(8, source)?;
    let mut scanner = Scanner::from_reader(reader);

    assert!(matches!(scanner.next_token(), Err(BufError::Io(_))));
    assert_eq!(scanner.next_token()?, Some(b"hello".to_vec()));
    assert_eq!(scanner.next_token()?, Some(b"world".to_vec()));
    assert_eq!(scanner.next_token()?, None);

    Ok(())
}
