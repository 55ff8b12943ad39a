//! RESP Reply and Frame Types
//!
//! Every frame on the wire starts with a one-byte type marker and ends with
//! CRLF:
//!
//! | Marker | Kind          | Example                   |
//! |--------|---------------|---------------------------|
//! | `+`    | Simple String | `+OK\r\n`                 |
//! | `-`    | Error         | `-ERR unknown command\r\n`|
//! | `:`    | Integer       | `:1000\r\n`               |
//! | `$`    | Bulk String   | `$5\r\nhello\r\n`         |
//! | `*`    | Array         | `*1\r\n$4\r\nPING\r\n`    |
//!
//! Two nil forms exist and clients tell them apart from the empty forms:
//! `$-1\r\n` (nil bulk, not `$0\r\n\r\n`) and `*-1\r\n` (nil array, not
//! `*0\r\n`).

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// A value in the RESP protocol.
///
/// Used both for decoded request frames and for the replies the dispatcher
/// produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// Status line. CR and LF are written as spaces.
    SimpleString(String),

    /// Error line: a kind word (`ERR`, `WRONGTYPE`) followed by a message.
    Error(String),

    /// Signed 64-bit integer.
    Integer(i64),

    /// Binary-safe string.
    BulkString(Bytes),

    /// Nil bulk string, `$-1`.
    Null,

    /// Possibly nested array of values.
    Array(Vec<RespValue>),

    /// Nil array, `*-1`.
    NullArray,
}

impl RespValue {
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Creates an error reply. The text should start with the error kind.
    ///
    /// # Example
    /// ```
    /// use quartzkv::protocol::RespValue;
    /// let err = RespValue::error("ERR unknown command 'FOO'");
    /// assert!(err.is_error());
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    pub fn integer(n: i64) -> Self {
        RespValue::Integer(n)
    }

    /// Creates a bulk string reply.
    ///
    /// # Example
    /// ```
    /// use quartzkv::protocol::RespValue;
    /// use bytes::Bytes;
    /// let bulk = RespValue::bulk_string(Bytes::from("hello"));
    /// assert_eq!(bulk.serialize(), b"$5\r\nhello\r\n");
    /// ```
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(data.into())
    }

    /// A bulk string when present, nil otherwise.
    pub fn optional_bulk(data: Option<Bytes>) -> Self {
        data.map_or(RespValue::Null, RespValue::BulkString)
    }

    pub fn null() -> Self {
        RespValue::Null
    }

    pub fn array(values: Vec<RespValue>) -> Self {
        RespValue::Array(values)
    }

    /// An array of bulk strings.
    pub fn bulk_array(items: impl IntoIterator<Item = Bytes>) -> Self {
        RespValue::Array(items.into_iter().map(RespValue::BulkString).collect())
    }

    /// The affirmative status reply.
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn pong() -> Self {
        RespValue::SimpleString("PONG".to_string())
    }

    /// Serializes the value into a fresh buffer.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.write_to(&mut buf);
        buf.to_vec()
    }

    /// Appends the wire form of this value to `buf`.
    ///
    /// The connection loop encodes every reply of a batch into one buffer and
    /// flushes it with a single write.
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => write_text_line(buf, prefix::SIMPLE_STRING, s),
            RespValue::Error(s) => write_text_line(buf, prefix::ERROR, s),
            RespValue::Integer(n) => write_line(buf, prefix::INTEGER, n.to_string().as_bytes()),
            RespValue::BulkString(data) => {
                write_line(buf, prefix::BULK_STRING, data.len().to_string().as_bytes());
                buf.put_slice(data);
                buf.put_slice(CRLF);
            }
            RespValue::Null => write_line(buf, prefix::BULK_STRING, b"-1"),
            RespValue::Array(values) => {
                write_line(buf, prefix::ARRAY, values.len().to_string().as_bytes());
                for value in values {
                    value.write_to(buf);
                }
            }
            RespValue::NullArray => write_line(buf, prefix::ARRAY, b"-1"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::Null | RespValue::NullArray)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Attempts to extract the inner bytes from BulkString.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RespValue::BulkString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

#[inline]
fn write_line(buf: &mut BytesMut, marker: u8, body: &[u8]) {
    buf.reserve(1 + body.len() + CRLF.len());
    buf.put_u8(marker);
    buf.put_slice(body);
    buf.put_slice(CRLF);
}

/// Writes a status or error line. A CR or LF in `text` would end the frame
/// early, so each becomes a space.
fn write_text_line(buf: &mut BytesMut, marker: u8, text: &str) {
    buf.reserve(1 + text.len() + CRLF.len());
    buf.put_u8(marker);
    buf.extend(
        text.bytes()
            .map(|b| if b == b'\r' || b == b'\n' { b' ' } else { b }),
    );
    buf.put_slice(CRLF);
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "{}", s),
            RespValue::Error(s) => write!(f, "(error) {}", s),
            RespValue::Integer(n) => write!(f, "(integer) {}", n),
            RespValue::BulkString(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "(binary data, {} bytes)", data.len()),
            },
            RespValue::Null | RespValue::NullArray => write!(f, "(nil)"),
            RespValue::Array(values) if values.is_empty() => write!(f, "(empty array)"),
            RespValue::Array(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {}", i + 1, v)?;
                }
                Ok(())
            }
        }
    }
}
