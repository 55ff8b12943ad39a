//! Storage Engine Module
//!
//! The shared keyspace: a sharded map from key to typed [`Value`] with
//! optional expiry, plus the background sweeper that reclaims expired keys.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! │        key → Entry { Value, expires_at }                    │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │     ExpirySweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! String and key operations are in `engine`; hash, list, and set
//! operations each have their own module.
//!
//! ## Example
//!
//! ```
//! use quartzkv::storage::{StorageEngine, StorageError};
//! use bytes::Bytes;
//!
//! let engine = StorageEngine::new();
//!
//! engine.rpush(&Bytes::from("queue"), &[Bytes::from("job1"), Bytes::from("job2")]).unwrap();
//! assert_eq!(engine.llen(b"queue"), Ok(2));
//!
//! // A list is not a set
//! assert_eq!(engine.scard(b"queue"), Err(StorageError::WrongType));
//! ```

pub mod engine;
pub mod expiry;
mod hash;
mod list;
mod set;
pub mod value;

pub use engine::{StorageEngine, StorageStats, SweepReport};
pub use expiry::{ExpiryConfig, ExpirySweeper};
pub use list::ListEnd;
pub use value::{Entry, StorageError, Value};
