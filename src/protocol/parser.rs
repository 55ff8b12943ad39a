//! Incremental RESP Parser
//!
//! The parser never blocks and never consumes bytes it cannot use. Every call
//! returns one of:
//!
//! - `Ok(Some((value, consumed)))` - a complete frame was decoded from the
//!   first `consumed` bytes of the buffer
//! - `Ok(None)` - the frame is incomplete; append more bytes and try again
//! - `Err(ParseError)` - the bytes can never become a valid frame
//!
//! Request frames are stricter than general values: a client must send an
//! array of bulk strings. [`parse_command`] enforces that and hands back a
//! [`Command`] directly.

use crate::protocol::command::Command;
use crate::protocol::types::{prefix, RespValue, CRLF};
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during RESP parsing.
///
/// All of them are fatal to the connection that produced the bytes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Unknown type prefix byte
    #[error("unknown type prefix: {0:#04x}")]
    UnknownPrefix(u8),

    /// Request frame is not an array
    #[error("expected '*', got {0:#04x}")]
    ExpectedArray(u8),

    /// An element of a request frame is not a bulk string
    #[error("expected '$', got {0:#04x}")]
    ExpectedBulkString(u8),

    /// Invalid integer format in a length prefix or integer frame
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),

    /// Invalid UTF-8 in a simple string or error message
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Bulk string length is negative (but not -1 for null)
    #[error("invalid bulk length: {0}")]
    InvalidBulkLength(i64),

    /// Array length is negative (but not -1 for null) or too large
    #[error("invalid multibulk length: {0}")]
    InvalidArrayLength(i64),

    /// Missing CRLF terminator, nesting too deep, and similar violations
    #[error("{0}")]
    ProtocolError(String),

    /// The message exceeds maximum allowed size
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum number of elements in one array frame
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Maximum array nesting depth (prevent stack overflow)
pub const MAX_NESTING_DEPTH: usize = 32;

/// Upper bound on elements preallocated from an untrusted length prefix
const PREALLOC_LIMIT: usize = 1024;

/// A RESP value parser.
///
/// # Example
///
/// ```
/// use quartzkv::protocol::{RespParser, RespValue};
///
/// let mut parser = RespParser::new();
/// let (value, consumed) = parser.parse(b":42\r\n").unwrap().unwrap();
/// assert_eq!(value, RespValue::Integer(42));
/// assert_eq!(consumed, 5);
/// ```
#[derive(Debug, Default)]
pub struct RespParser {
    /// Current nesting depth (for array parsing)
    depth: usize,
}

impl RespParser {
    pub fn new() -> Self {
        Self { depth: 0 }
    }

    /// Attempts to parse one RESP value of any kind from the start of `buf`.
    pub fn parse(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        self.depth = 0;
        self.parse_value(buf)
    }

    fn parse_value(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        let Some(&marker) = buf.first() else {
            return Ok(None);
        };

        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::ProtocolError(format!(
                "maximum nesting depth exceeded: {}",
                MAX_NESTING_DEPTH
            )));
        }

        match marker {
            prefix::SIMPLE_STRING => Ok(parse_text_line(buf)?
                .map(|(s, consumed)| (RespValue::SimpleString(s), consumed))),
            prefix::ERROR => {
                Ok(parse_text_line(buf)?.map(|(s, consumed)| (RespValue::Error(s), consumed)))
            }
            prefix::INTEGER => {
                Ok(read_number(buf)?.map(|(n, consumed)| (RespValue::Integer(n), consumed)))
            }
            prefix::BULK_STRING => Ok(parse_bulk(buf)?.map(|(data, consumed)| {
                (data.map_or(RespValue::Null, RespValue::BulkString), consumed)
            })),
            prefix::ARRAY => self.parse_array(buf),
            other => Err(ParseError::UnknownPrefix(other)),
        }
    }

    /// Parses an array: `*<count>\r\n<elements...>`
    fn parse_array(&mut self, buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
        let Some((count, mut consumed)) = read_array_len(buf)? else {
            return Ok(None);
        };
        let Some(count) = count else {
            return Ok(Some((RespValue::NullArray, consumed)));
        };

        let mut elements = Vec::with_capacity(count.min(PREALLOC_LIMIT));
        self.depth += 1;
        for _ in 0..count {
            match self.parse_value(&buf[consumed..])? {
                Some((value, used)) => {
                    elements.push(value);
                    consumed += used;
                }
                None => return Ok(None),
            }
        }
        self.depth -= 1;

        Ok(Some((RespValue::Array(elements), consumed)))
    }
}

/// Parses one request frame: an array of bulk strings.
///
/// Returns `Ok(Some((None, consumed)))` for an empty array, which carries no
/// command and gets no reply.
///
/// # Example
///
/// ```
/// use quartzkv::protocol::parse_command;
///
/// let (command, consumed) = parse_command(b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n")
///     .unwrap()
///     .unwrap();
/// let command = command.unwrap();
/// assert_eq!(&command.name[..], b"GET");
/// assert_eq!(consumed, 20);
/// ```
pub fn parse_command(buf: &[u8]) -> ParseResult<Option<(Option<Command>, usize)>> {
    match buf.first() {
        None => return Ok(None),
        Some(&prefix::ARRAY) => {}
        Some(&other) => return Err(ParseError::ExpectedArray(other)),
    }

    let Some((count, mut consumed)) = read_array_len(buf)? else {
        return Ok(None);
    };
    let count = match count {
        Some(0) | None => return Ok(Some((None, consumed))),
        Some(count) => count,
    };

    let mut parts = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    for _ in 0..count {
        let rest = &buf[consumed..];
        match rest.first() {
            None => return Ok(None),
            Some(&prefix::BULK_STRING) => {}
            Some(&other) => return Err(ParseError::ExpectedBulkString(other)),
        }
        match parse_bulk(rest)? {
            Some((Some(data), used)) => {
                parts.push(data);
                consumed += used;
            }
            Some((None, _)) => return Err(ParseError::InvalidBulkLength(-1)),
            None => return Ok(None),
        }
    }

    Ok(Some((Command::from_parts(parts), consumed)))
}

/// Helper function to parse a single RESP value from bytes.
pub fn parse_message(buf: &[u8]) -> ParseResult<Option<(RespValue, usize)>> {
    RespParser::new().parse(buf)
}

/// Reads `<marker><text>\r\n` as UTF-8.
fn parse_text_line(buf: &[u8]) -> ParseResult<Option<(String, usize)>> {
    let Some(pos) = find_crlf(&buf[1..]) else {
        return Ok(None);
    };
    let text = std::str::from_utf8(&buf[1..1 + pos])
        .map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;
    Ok(Some((text.to_string(), 1 + pos + 2)))
}

/// Reads `<marker><i64>\r\n`.
fn read_number(buf: &[u8]) -> ParseResult<Option<(i64, usize)>> {
    let Some(pos) = find_crlf(&buf[1..]) else {
        return Ok(None);
    };
    let digits = &buf[1..1 + pos];
    let n = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ParseError::InvalidInteger(String::from_utf8_lossy(digits).into_owned()))?;
    Ok(Some((n, 1 + pos + 2)))
}

/// Reads an array header. `Some((None, _))` is the nil array.
fn read_array_len(buf: &[u8]) -> ParseResult<Option<(Option<usize>, usize)>> {
    let Some((count, consumed)) = read_number(buf)? else {
        return Ok(None);
    };
    match count {
        -1 => Ok(Some((None, consumed))),
        n if n < 0 || n as u64 > MAX_ARRAY_LEN as u64 => Err(ParseError::InvalidArrayLength(n)),
        n => Ok(Some((Some(n as usize), consumed))),
    }
}

/// Parses a bulk string: `$<length>\r\n<data>\r\n`. `Some((None, _))` is nil.
fn parse_bulk(buf: &[u8]) -> ParseResult<Option<(Option<Bytes>, usize)>> {
    let Some((length, header)) = read_number(buf)? else {
        return Ok(None);
    };

    if length == -1 {
        return Ok(Some((None, header)));
    }
    if length < 0 {
        return Err(ParseError::InvalidBulkLength(length));
    }
    if length as u64 > MAX_BULK_SIZE as u64 {
        return Err(ParseError::MessageTooLarge {
            size: length as usize,
            max: MAX_BULK_SIZE,
        });
    }

    let length = length as usize;
    let total = header + length + CRLF.len();
    if buf.len() < total {
        return Ok(None);
    }
    if &buf[header + length..total] != CRLF {
        return Err(ParseError::ProtocolError(
            "bulk string missing trailing CRLF".to_string(),
        ));
    }

    let data = Bytes::copy_from_slice(&buf[header..header + length]);
    Ok(Some((Some(data), total)))
}

/// Finds the position of CRLF in the buffer.
///
/// Returns the position of `\r` if found, or None if CRLF is not present.
#[inline]
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}
