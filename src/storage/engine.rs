//! Thread-Safe Storage Engine with Expiry Support
//!
//! The keyspace is split into shards, each a `HashMap` behind its own
//! `RwLock`. A key always lives in the shard its hash selects.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - Single-key operations run entirely under one shard lock, so each is
//!   atomic with respect to every other operation.
//! - Multi-key operations (`delete_many`, `exists_many`, `len`, `flush`)
//!   take every shard they need in ascending shard order before touching a
//!   key. Every caller acquires in the same order, so they cannot deadlock.
//! - Expiry is lazy: an expired entry is invisible to every operation and is
//!   removed by whichever operation finds it first. The background sweeper
//!   in [`crate::storage::expiry`] reclaims entries nobody touches.
//!
//! Hash, list, and set operations live in sibling modules as further
//! `impl StorageEngine` blocks.

use crate::storage::value::{parse_integer, Entry, StorageError, Value};
use bytes::Bytes;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Number of shards for the storage engine.
const NUM_SHARDS: usize = 64;

pub(crate) type ShardMap = HashMap<Bytes, Entry>;

/// A single shard containing a portion of the keyspace.
#[derive(Debug, Default)]
struct Shard {
    data: RwLock<ShardMap>,
}

/// The shared keyspace.
///
/// Wrap it in an `Arc` and hand a clone to every connection; all methods
/// take `&self`.
///
/// # Example
///
/// ```
/// use quartzkv::storage::StorageEngine;
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("name"), Bytes::from("Ariz"));
/// assert_eq!(engine.get(b"name"), Some(Bytes::from("Ariz")));
///
/// engine.expire(b"name", Duration::from_secs(60)).unwrap();
/// assert!(engine.ttl(b"name").unwrap() > 0);
/// ```
pub struct StorageEngine {
    shards: Vec<Shard>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total keys removed by DEL
    del_count: AtomicU64,

    /// Statistics: number of expired keys cleaned up
    expired_count: AtomicU64,

    /// Write cap in bytes of estimated usage; 0 means unlimited
    max_memory: usize,

    /// Estimated usage as of the last full scan
    used_memory: AtomicUsize,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    pub fn new() -> Self {
        Self::with_max_memory(0)
    }

    /// An engine that reports itself full once its estimated usage reaches
    /// `max_memory` bytes. Zero disables the limit.
    pub fn with_max_memory(max_memory: usize) -> Self {
        Self {
            shards: (0..NUM_SHARDS).map(|_| Shard::default()).collect(),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
            max_memory,
            used_memory: AtomicUsize::new(0),
        }
    }

    pub fn max_memory(&self) -> usize {
        self.max_memory
    }

    /// Estimated bytes held by live entries, refreshed by every
    /// [`cleanup_expired`](Self::cleanup_expired) pass and every
    /// [`stats`](Self::stats) call.
    pub fn used_memory(&self) -> usize {
        self.used_memory.load(Ordering::Relaxed)
    }

    /// Whether a limit is set and the last estimate reached it.
    pub fn is_over_memory_limit(&self) -> bool {
        self.max_memory > 0 && self.used_memory() >= self.max_memory
    }

    #[inline]
    fn shard_index(&self, key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    #[inline]
    fn get_shard(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Removes `key` if it has expired. Returns true when an entry was removed.
    fn purge_expired(&self, data: &mut ShardMap, key: &[u8]) -> bool {
        if data.get(key).is_some_and(Entry::is_expired) {
            data.remove(key);
            self.expired_count.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Runs `f` against the live entry for `key`, if any.
    ///
    /// Takes the read lock first. Only when the entry turns out to be expired
    /// does it retake the shard exclusively to remove it; the entry is
    /// re-checked then, since a writer may have replaced it in between.
    pub(crate) fn read<T>(&self, key: &[u8], f: impl FnOnce(Option<&Entry>) -> T) -> T {
        let shard = self.get_shard(key);
        {
            let data = shard.data.read();
            match data.get(key) {
                Some(entry) if entry.is_expired() => {}
                found => return f(found),
            }
        }

        let mut data = shard.data.write();
        self.purge_expired(&mut data, key);
        f(data.get(key))
    }

    /// Runs `f` with exclusive access to the shard holding `key`, after lazy
    /// expiry of `key`.
    pub(crate) fn write<T>(&self, key: &[u8], f: impl FnOnce(&mut ShardMap) -> T) -> T {
        let mut data = self.get_shard(key).data.write();
        self.purge_expired(&mut data, key);
        f(&mut data)
    }

    /// Reads the container stored at `key` through `project`.
    ///
    /// `f` receives `None` when the key is absent. A key holding another
    /// variant fails with `WrongType`.
    pub(crate) fn read_typed<C, T>(
        &self,
        key: &[u8],
        project: fn(&Value) -> Option<&C>,
        f: impl FnOnce(Option<&C>) -> T,
    ) -> Result<T, StorageError> {
        self.read(key, |entry| match entry {
            None => Ok(f(None)),
            Some(entry) => project(&entry.value)
                .map(|container| f(Some(container)))
                .ok_or(StorageError::WrongType),
        })
    }

    /// Mutates an existing container at `key`. Returns `Ok(None)` if absent.
    ///
    /// A container left empty by `f` is deleted along with its key.
    pub(crate) fn update_typed<C, T>(
        &self,
        key: &[u8],
        project: fn(&mut Value) -> Option<&mut C>,
        f: impl FnOnce(&mut C) -> T,
    ) -> Result<Option<T>, StorageError> {
        self.write(key, |data| {
            let Some(entry) = data.get_mut(key) else {
                return Ok(None);
            };
            let container = project(&mut entry.value).ok_or(StorageError::WrongType)?;
            let result = f(container);
            if entry.value.is_empty_container() {
                data.remove(key);
            }
            Ok(Some(result))
        })
    }

    /// Mutates the container at `key`, creating it with `empty` when absent.
    pub(crate) fn upsert_typed<C, T>(
        &self,
        key: &Bytes,
        empty: fn() -> Value,
        project: fn(&mut Value) -> Option<&mut C>,
        f: impl FnOnce(&mut C) -> T,
    ) -> Result<T, StorageError> {
        self.write(key, |data| {
            let entry = data
                .entry(key.clone())
                .or_insert_with(|| Entry::new(empty()));
            let container = project(&mut entry.value).ok_or(StorageError::WrongType)?;
            let result = f(container);
            if entry.value.is_empty_container() {
                data.remove(key);
            }
            Ok(result)
        })
    }

    /// Write-locks the shards of all `keys`, in ascending shard order.
    fn lock_keys(&self, keys: &[Bytes]) -> BTreeMap<usize, RwLockWriteGuard<'_, ShardMap>> {
        let indices: BTreeSet<usize> = keys.iter().map(|k| self.shard_index(k)).collect();
        indices
            .into_iter()
            .map(|i| (i, self.shards[i].data.write()))
            .collect()
    }

    fn lock_all(&self) -> Vec<RwLockWriteGuard<'_, ShardMap>> {
        self.shards.iter().map(|s| s.data.write()).collect()
    }

    fn read_all(&self) -> Vec<RwLockReadGuard<'_, ShardMap>> {
        self.shards.iter().map(|s| s.data.read()).collect()
    }

    // ========================================================================
    // STRING AND KEY OPERATIONS
    // ========================================================================

    /// Stores a string, replacing any value of any type and clearing its TTL.
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.set_count.fetch_add(1, Ordering::Relaxed);
        let shard = self.get_shard(&key);
        shard.data.write().insert(key, Entry::new(Value::String(value)));
    }

    /// Gets a string value.
    ///
    /// Absent, expired, and non-string keys all read as `None`.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        self.read(key, |entry| match entry.map(|e| &e.value) {
            Some(Value::String(data)) => Some(data.clone()),
            _ => None,
        })
    }

    /// Deletes keys as one atomic step. Returns how many live keys were removed.
    pub fn delete_many(&self, keys: &[Bytes]) -> u64 {
        let mut guards = self.lock_keys(keys);
        let mut deleted = 0;
        for key in keys {
            if let Some(data) = guards.get_mut(&self.shard_index(key)) {
                if !self.purge_expired(data, key) && data.remove(&key[..]).is_some() {
                    deleted += 1;
                }
            }
        }
        self.del_count.fetch_add(deleted, Ordering::Relaxed);
        deleted
    }

    /// Counts the arguments naming live keys. A repeated key counts each time.
    pub fn exists_many(&self, keys: &[Bytes]) -> u64 {
        let mut guards = self.lock_keys(keys);
        let mut count = 0;
        for key in keys {
            if let Some(data) = guards.get_mut(&self.shard_index(key)) {
                self.purge_expired(data, key);
                if data.contains_key(&key[..]) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Adds `delta` to the integer stored at `key`.
    ///
    /// An absent key counts as 0. The result is stored back as a decimal
    /// string and any TTL on the key is kept.
    pub fn incr_by(&self, key: &Bytes, delta: i64) -> Result<i64, StorageError> {
        self.write(key, |data| match data.get_mut(&key[..]) {
            None => {
                data.insert(
                    key.clone(),
                    Entry::new(Value::String(Bytes::from(delta.to_string()))),
                );
                Ok(delta)
            }
            Some(entry) => {
                let Value::String(ref mut current) = entry.value else {
                    return Err(StorageError::WrongType);
                };
                let updated = parse_integer(current)?
                    .checked_add(delta)
                    .ok_or(StorageError::Overflow)?;
                *current = Bytes::from(updated.to_string());
                Ok(updated)
            }
        })
    }

    /// Sets a key to expire `ttl` from now.
    ///
    /// Returns false if the key does not exist. A zero `ttl` deletes the key
    /// on the spot. A deadline the clock cannot represent fails with
    /// `InvalidExpireTime` and leaves the key as it was.
    pub fn expire(&self, key: &[u8], ttl: Duration) -> Result<bool, StorageError> {
        self.write(key, |data| {
            if ttl.is_zero() {
                return Ok(data.remove(key).is_some());
            }
            let Some(entry) = data.get_mut(key) else {
                return Ok(false);
            };
            let deadline = Instant::now()
                .checked_add(ttl)
                .ok_or(StorageError::InvalidExpireTime)?;
            entry.expires_at = Some(deadline);
            Ok(true)
        })
    }

    /// Removes the expiry from a key.
    ///
    /// Returns true only if the key existed and had an expiry.
    pub fn persist(&self, key: &[u8]) -> bool {
        self.write(key, |data| {
            data.get_mut(key)
                .and_then(|entry| entry.expires_at.take())
                .is_some()
        })
    }

    /// Time to live: `None` if the key is absent, `Some(None)` if it never
    /// expires.
    pub fn remaining(&self, key: &[u8]) -> Option<Option<Duration>> {
        self.read(key, |entry| entry.map(Entry::remaining))
    }

    /// TTL in seconds, rounded to the nearest second: -1 if the key has no
    /// expiry, `None` if it doesn't exist.
    pub fn ttl(&self, key: &[u8]) -> Option<i64> {
        self.remaining(key).map(|remaining| {
            remaining.map_or(-1, |d| ((d.as_millis() + 500) / 1000) as i64)
        })
    }

    /// TTL in milliseconds, same conventions as [`StorageEngine::ttl`].
    pub fn pttl(&self, key: &[u8]) -> Option<i64> {
        self.remaining(key)
            .map(|remaining| remaining.map_or(-1, |d| d.as_millis() as i64))
    }

    /// Returns the type name of a key ("string", "hash", "list", "set", or "none").
    pub fn key_type(&self, key: &[u8]) -> &'static str {
        self.read(key, |entry| entry.map_or("none", |e| e.value.type_name()))
    }

    /// Counts live keys across all shards as one consistent snapshot.
    pub fn len(&self) -> u64 {
        self.read_all()
            .iter()
            .map(|data| data.values().filter(|e| !e.is_expired()).count() as u64)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key.
    pub fn flush(&self) {
        for mut data in self.lock_all() {
            data.clear();
        }
    }

    /// Removes expired entries from every shard, one shard lock at a time.
    ///
    /// Called by the background sweeper. The same walk re-baselines the
    /// memory estimate.
    pub fn cleanup_expired(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let mut used_memory = 0;
        for shard in &self.shards {
            let mut data = shard.data.write();
            report.scanned += data.len() as u64;
            data.retain(|key, entry| {
                if entry.is_expired() {
                    report.removed += 1;
                    false
                } else {
                    used_memory += entry.approx_size(key);
                    true
                }
            });
        }
        self.used_memory.store(used_memory, Ordering::Relaxed);
        if report.removed > 0 {
            self.expired_count.fetch_add(report.removed, Ordering::Relaxed);
        }
        report
    }

    /// Returns database statistics.
    pub fn stats(&self) -> StorageStats {
        let mut keys = 0;
        let mut expires = 0;
        let mut used_memory = 0;
        for data in self.read_all() {
            for (key, entry) in data.iter().filter(|(_, e)| !e.is_expired()) {
                keys += 1;
                if entry.expires_at.is_some() {
                    expires += 1;
                }
                used_memory += entry.approx_size(key);
            }
        }
        self.used_memory.store(used_memory, Ordering::Relaxed);

        StorageStats {
            keys,
            expires,
            used_memory,
            max_memory: self.max_memory,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of one [`StorageEngine::cleanup_expired`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries examined, expired or not
    pub scanned: u64,
    pub removed: u64,
}

/// Database statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageStats {
    /// Live keys
    pub keys: u64,
    /// Live keys carrying a TTL
    pub expires: u64,
    /// Approximate bytes held by live entries
    pub used_memory: usize,
    /// Configured cap, 0 when unlimited
    pub max_memory: usize,
    pub get_ops: u64,
    pub set_ops: u64,
    pub del_ops: u64,
    /// Expired keys removed, lazily or by the sweeper
    pub expired: u64,
}
