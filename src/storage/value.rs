//! Stored Values
//!
//! Every key maps to exactly one [`Value`] variant plus optional expiry
//! metadata. Operations check the variant at entry and fail with
//! [`StorageError::WrongType`] instead of coercing.

use bytes::Bytes;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Approximate per-entry bookkeeping overhead used by memory estimates.
const ENTRY_OVERHEAD: usize = 64;

/// Approximate per-element overhead inside a container.
const ELEMENT_OVERHEAD: usize = 16;

/// Errors raised by keyspace operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The key holds a different variant than the operation needs.
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// The stored string is not a base-10 64-bit integer.
    #[error("ERR value is not an integer or out of range")]
    NotInteger,

    /// The arithmetic result does not fit in an i64.
    #[error("ERR increment or decrement would overflow")]
    Overflow,

    /// The requested deadline lies past what the clock can represent.
    #[error("ERR invalid expire time in 'expire' command")]
    InvalidExpireTime,
}

/// A typed value stored under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(Bytes),
    Hash(HashMap<Bytes, Bytes>),
    List(VecDeque<Bytes>),
    Set(HashSet<Bytes>),
}

impl Value {
    pub fn empty_hash() -> Self {
        Value::Hash(HashMap::new())
    }

    pub fn empty_list() -> Self {
        Value::List(VecDeque::new())
    }

    pub fn empty_set() -> Self {
        Value::Set(HashSet::new())
    }

    /// The name TYPE reports for this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Hash(_) => "hash",
            Value::List(_) => "list",
            Value::Set(_) => "set",
        }
    }

    /// True for a container with no elements. Strings are never empty here.
    pub fn is_empty_container(&self) -> bool {
        match self {
            Value::String(_) => false,
            Value::Hash(map) => map.is_empty(),
            Value::List(list) => list.is_empty(),
            Value::Set(set) => set.is_empty(),
        }
    }

    pub fn as_hash(&self) -> Option<&HashMap<Bytes, Bytes>> {
        match self {
            Value::Hash(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_hash_mut(&mut self) -> Option<&mut HashMap<Bytes, Bytes>> {
        match self {
            Value::Hash(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&VecDeque<Bytes>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut VecDeque<Bytes>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&HashSet<Bytes>> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut HashSet<Bytes>> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Rough heap footprint, for INFO.
    pub fn approx_size(&self) -> usize {
        match self {
            Value::String(data) => data.len(),
            Value::Hash(map) => map
                .iter()
                .map(|(f, v)| f.len() + v.len() + ELEMENT_OVERHEAD)
                .sum(),
            Value::List(list) => list.iter().map(|e| e.len() + ELEMENT_OVERHEAD).sum(),
            Value::Set(set) => set.iter().map(|m| m.len() + ELEMENT_OVERHEAD).sum(),
        }
    }
}

/// A stored value with optional expiry time.
#[derive(Debug, Clone)]
pub struct Entry {
    pub value: Value,
    /// When this entry expires (None = never expires)
    pub expires_at: Option<Instant>,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Time left before expiry, or None if the entry never expires.
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn approx_size(&self, key: &[u8]) -> usize {
        key.len() + self.value.approx_size() + ENTRY_OVERHEAD
    }
}

/// Parses a stored string as a base-10 i64.
pub fn parse_integer(data: &[u8]) -> Result<i64, StorageError> {
    std::str::from_utf8(data)
        .ok()
        .filter(|s| !s.starts_with('+'))
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(StorageError::NotInteger)
}
