//! # QuartzKV - An In-Memory Multi-Type Key-Value Server
//!
//! QuartzKV keeps strings, hashes, lists, and sets in memory and serves them
//! over the Redis serialization protocol (RESP2), so `redis-cli` and other
//! Redis clients can talk to it directly.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              QuartzKV                                   │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (server)    │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   RESP      │    │              StorageEngine                   │   │
//! │  │   Codec     │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │   │
//! │  │ (protocol)  │    │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...63   │ │   │
//! │  └─────────────┘    │  │RwLock  │ │RwLock  │ │RwLock  │ │        │ │   │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │   │
//! │                     └──────────────────────────────────────────────┘   │
//! │                                               ▲                         │
//! │                     ┌─────────────────────────┴───────────────────────┐ │
//! │                     │           ExpirySweeper                         │ │
//! │                     │      (Background Tokio Task)                    │ │
//! │                     └─────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use quartzkv::connection::ConnectionStats;
//! use quartzkv::server;
//! use quartzkv::storage::{ExpiryConfig, ExpirySweeper, StorageEngine};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let storage = Arc::new(StorageEngine::new());
//!     let _sweeper = ExpirySweeper::start(Arc::clone(&storage), ExpiryConfig::default());
//!
//!     let listener = TcpListener::bind("127.0.0.1:6379").await?;
//!     server::serve(listener, storage, Arc::new(ConnectionStats::new())).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: RESP values, the incremental parser, and request commands
//! - [`storage`]: sharded keyspace, typed values, lazy and active expiry
//! - [`commands`]: command table, arity checks, and per-type handlers
//! - [`connection`]: per-client read/execute/reply loop
//! - [`server`]: TCP accept loop
//! - [`config`]: command-line and environment configuration
//!
//! ## Consistency
//!
//! Every command is atomic. Single-key commands run under the lock of the
//! one shard that owns the key; `DEL`, `EXISTS`, `DBSIZE`, and `FLUSHDB`
//! hold every shard they touch at once, acquired in ascending shard order.
//!
//! Expired keys are invisible to all commands from the instant they expire,
//! whether or not the sweeper has reclaimed them yet.

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

pub use commands::CommandHandler;
pub use config::Config;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{Command, ParseError, RespValue};
pub use storage::{ExpiryConfig, ExpirySweeper, StorageEngine};

/// The default port QuartzKV listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host QuartzKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of QuartzKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
