//! RESP Protocol Implementation
//!
//! Binary-safe framing between the wire and the dispatcher.
//!
//! - `types`: [`RespValue`] and its wire encoding
//! - `parser`: incremental decoder for values and request frames
//! - `command`: the [`Command`] a request frame carries
//!
//! ## Example
//!
//! ```
//! use quartzkv::protocol::{parse_command, RespValue};
//! use bytes::Bytes;
//!
//! // Decoding a request
//! let data = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
//! let (command, consumed) = parse_command(data).unwrap().unwrap();
//! assert_eq!(command.unwrap().args, vec![Bytes::from("name")]);
//! assert_eq!(consumed, data.len());
//!
//! // Encoding a reply
//! let response = RespValue::bulk_string(Bytes::from("Ariz"));
//! assert_eq!(response.serialize(), b"$4\r\nAriz\r\n");
//! ```

pub mod command;
pub mod parser;
pub mod types;

pub use command::Command;
pub use parser::{parse_command, parse_message, ParseError, ParseResult, RespParser};
pub use types::RespValue;
