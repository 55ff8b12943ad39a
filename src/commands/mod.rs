//! Command Handler Module
//!
//! Turns a decoded [`Command`](crate::protocol::Command) into a reply by
//! running it against the storage engine.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  RESP Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Lookup       │  registry: name → arity + handler
//! │  - Validate     │
//! │  - Execute      │  strings / keys / hash / list / set / server
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - Strings: `SET`, `GET`, `INCR`, `DECR`, `INCRBY`, `DECRBY`
//! - Keys: `DEL`, `EXISTS`, `EXPIRE`, `TTL`, `PTTL`, `PERSIST`, `TYPE`
//! - Hashes: `HSET`, `HGET`, `HDEL`, `HEXISTS`, `HKEYS`, `HVALS`, `HLEN`, `HGETALL`
//! - Lists: `LPUSH`, `RPUSH`, `LPOP`, `RPOP`, `LLEN`, `LRANGE`
//! - Sets: `SADD`, `SREM`, `SCARD`, `SISMEMBER`, `SMEMBERS`
//! - Server: `PING`, `ECHO`, `DBSIZE`, `FLUSHDB`, `FLUSHALL`, `INFO`

pub mod error;
pub mod handler;
pub mod registry;

mod hash;
mod keys;
mod list;
mod server;
mod set;
mod strings;

pub use error::CommandError;
pub use handler::{CommandHandler, CommandResult};
pub use registry::{lookup, Arity, CommandSpec, COMMANDS};
