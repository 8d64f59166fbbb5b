//! Walkthrough of the buffered writer, reader and scanner

use s_bufio::{BufError, BufferedReader, BufferedWriter, Scanner, SplitMode};
use std::io::{self, Write};

/// Sink that prints every write it receives
struct PrintingSink;

impl Write for PrintingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        println!("  Writing: {}", String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writing() -> Result<(), BufError> {
    println!("--- Writer (capacity 4) ---");
    let mut writer = BufferedWriter::with_capacity(4, PrintingSink)?;

    // Case 1: fill the buffer
    for byte in *b"1234" {
        writer.write_byte(byte)?;
    }
    println!("  available after 1234: {}", writer.available());

    // Case 2: buffer has slack after the write
    writer.write(b"5")?;
    println!("  available after 5: {}", writer.available());
    writer.flush()?;

    // Case 3: write larger than the buffer goes straight through
    writer.write(b"12345")?;
    println!("  buffered after oversized write: {}", writer.buffered());

    Ok(())
}

fn reading() -> Result<(), BufError> {
    const SINGLE_LINE: &str = "I'd love to have some coffee right about now";
    const MULTI_LINE: &str = "Reading is my...\r\n favourite";

    println!("\n--- Peek ---");
    println!("  input length: {}", SINGLE_LINE.len());
    let mut reader = BufferedReader::with_capacity(25, SINGLE_LINE.as_bytes())?;
    println!("  peek(3): {:?}", String::from_utf8_lossy(reader.peek(3)?));
    if let Err(e) = reader.peek(30) {
        println!("  peek(30): {}", e);
    }
    let mut large = BufferedReader::with_capacity(50, SINGLE_LINE.as_bytes())?;
    if let Err(e) = large.peek(50) {
        println!("  peek(50): {}", e);
    }

    println!("\n--- read_until('.') ---");
    let mut reader = BufferedReader::new(MULTI_LINE.as_bytes());
    loop {
        match reader.read_until(b'.') {
            Ok(token) => println!(
                "  token: {:?} (delimiter found: {})",
                String::from_utf8_lossy(&token.bytes),
                token.found
            ),
            Err(e) if e.is_end_of_stream() => {
                println!("  stopped: {}", e);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    println!("\n--- read_line ---");
    reader.reset(MULTI_LINE.as_bytes());
    loop {
        match reader.read_line() {
            Ok(line) => println!(
                "  line: {:?} (newline: {})",
                String::from_utf8_lossy(&line.text),
                line.had_newline
            ),
            Err(e) if e.is_end_of_stream() => {
                println!("  stopped: {}", e);
                break;
            }
            Err(e) => return Err(e),
        }
    }

    println!("\n--- Scanner (words) ---");
    let data = "A foggy mountain.\nAn old falcon.\nA wise man.";
    let words = Scanner::new(data.as_bytes())
        .split(SplitMode::Words)
        .collect::<Result<Vec<_>, _>>()?;
    println!("  # of words: {}", words.len());
    for word in words {
        println!("  {}", word);
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== s-bufio Tour ===\n");
    writing()?;
    reading()?;
    println!("\n✓ All done!");

    Ok(())
}
