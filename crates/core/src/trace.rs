//! Trace file reading and tokenizing.
//!
//! A trace is a plain-text sequence of requests, one per line:
//!
//! ```text
//! r ffe04540
//! w 400341a0
//! ```
//!
//! The operation symbol is one of `r`, `R`, `w`, `W`; the address is
//! hexadecimal, with or without a `0x` prefix. Blank lines are skipped.
//! Anything else is a fatal input error: the reader yields it once and the
//! driver stops at the first error, processing no further entries.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::cache::Op;

/// One trace request: an operation kind and a 32-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    /// Read or write.
    pub op: Op,
    /// The request address, as issued by the traced program.
    pub addr: u32,
}

/// Fatal trace input errors.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The operation symbol was not one of `r`, `R`, `w`, `W`.
    #[error("unknown request type '{symbol}' on line {line}")]
    UnknownOp {
        /// The offending symbol.
        symbol: String,
        /// 1-based line number.
        line: usize,
    },

    /// A request line had an operation symbol but no address token.
    #[error("missing address on line {line}")]
    MissingAddress {
        /// 1-based line number.
        line: usize,
    },

    /// The address token was not valid hexadecimal.
    #[error("invalid address '{text}' on line {line}")]
    BadAddress {
        /// The offending token.
        text: String,
        /// 1-based line number.
        line: usize,
    },

    /// A request line carried extra tokens after the address.
    #[error("unexpected token '{text}' after address on line {line}")]
    TrailingTokens {
        /// The first extra token.
        text: String,
        /// 1-based line number.
        line: usize,
    },

    /// The underlying reader failed.
    #[error("trace read failed: {0}")]
    Io(#[from] io::Error),
}

/// Streaming trace reader over any buffered source.
///
/// Yields `Result<TraceEntry, TraceError>` so the driver can halt on the
/// first malformed entry without buffering the whole trace.
#[derive(Debug)]
pub struct TraceReader<R> {
    reader: R,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered source.
    pub fn new(reader: R) -> Self {
        Self { reader, line: 0 }
    }

    fn parse_line(&self, text: &str) -> Option<Result<TraceEntry, TraceError>> {
        let mut tokens = text.split_whitespace();
        let op_token = tokens.next()?;

        let op = match op_token {
            "r" | "R" => Op::Read,
            "w" | "W" => Op::Write,
            _ => {
                return Some(Err(TraceError::UnknownOp {
                    symbol: op_token.to_string(),
                    line: self.line,
                }));
            }
        };

        let Some(addr_token) = tokens.next() else {
            return Some(Err(TraceError::MissingAddress { line: self.line }));
        };
        let digits = addr_token
            .strip_prefix("0x")
            .or_else(|| addr_token.strip_prefix("0X"))
            .unwrap_or(addr_token);
        let Ok(addr) = u32::from_str_radix(digits, 16) else {
            return Some(Err(TraceError::BadAddress {
                text: addr_token.to_string(),
                line: self.line,
            }));
        };

        // One request per line: a second request crammed onto the same line
        // would otherwise be dropped silently.
        if let Some(extra) = tokens.next() {
            return Some(Err(TraceError::TrailingTokens {
                text: extra.to_string(),
                line: self.line,
            }));
        }

        Some(Ok(TraceEntry { op, addr }))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEntry, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut text = String::new();
            match self.reader.read_line(&mut text) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(TraceError::Io(e))),
            }
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return self.parse_line(&text);
        }
    }
}

/// Opens a trace file for streaming.
///
/// # Errors
///
/// Returns an I/O error when the file cannot be opened.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<TraceReader<BufReader<File>>> {
    Ok(TraceReader::new(BufReader::new(File::open(path)?)))
}
