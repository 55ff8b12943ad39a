//! Hash operations on the keyspace.

use super::engine::StorageEngine;
use super::value::{StorageError, Value};
use bytes::Bytes;

impl StorageEngine {
    /// Sets field/value pairs, creating the hash if needed.
    ///
    /// Returns the number of fields that did not exist before.
    pub fn hset(&self, key: &Bytes, pairs: &[(Bytes, Bytes)]) -> Result<u64, StorageError> {
        self.upsert_typed(key, Value::empty_hash, Value::as_hash_mut, |map| {
            let mut added = 0;
            for (field, value) in pairs {
                if map.insert(field.clone(), value.clone()).is_none() {
                    added += 1;
                }
            }
            added
        })
    }

    pub fn hget(&self, key: &[u8], field: &[u8]) -> Result<Option<Bytes>, StorageError> {
        self.read_typed(key, Value::as_hash, |map| {
            map.and_then(|map| map.get(field).cloned())
        })
    }

    /// Removes fields. Deleting the last field removes the key.
    pub fn hdel(&self, key: &[u8], fields: &[Bytes]) -> Result<u64, StorageError> {
        let removed = self.update_typed(key, Value::as_hash_mut, |map| {
            fields
                .iter()
                .filter(|field| map.remove(&field[..]).is_some())
                .count() as u64
        })?;
        Ok(removed.unwrap_or(0))
    }

    pub fn hexists(&self, key: &[u8], field: &[u8]) -> Result<bool, StorageError> {
        self.read_typed(key, Value::as_hash, |map| {
            map.is_some_and(|map| map.contains_key(field))
        })
    }

    pub fn hlen(&self, key: &[u8]) -> Result<u64, StorageError> {
        self.read_typed(key, Value::as_hash, |map| map.map_or(0, |m| m.len() as u64))
    }

    pub fn hkeys(&self, key: &[u8]) -> Result<Vec<Bytes>, StorageError> {
        self.read_typed(key, Value::as_hash, |map| {
            map.map(|m| m.keys().cloned().collect()).unwrap_or_default()
        })
    }

    pub fn hvals(&self, key: &[u8]) -> Result<Vec<Bytes>, StorageError> {
        self.read_typed(key, Value::as_hash, |map| {
            map.map(|m| m.values().cloned().collect()).unwrap_or_default()
        })
    }

    /// Every field/value pair, in unspecified order.
    pub fn hgetall(&self, key: &[u8]) -> Result<Vec<(Bytes, Bytes)>, StorageError> {
        self.read_typed(key, Value::as_hash, |map| {
            map.map(|m| m.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
                .unwrap_or_default()
        })
    }
}
