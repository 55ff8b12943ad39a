//! List operations on the keyspace.
//!
//! Lists are `VecDeque`s, so pushes and pops at either end are O(1).

use super::engine::StorageEngine;
use super::value::{StorageError, Value};
use bytes::Bytes;
use std::collections::VecDeque;

/// Which end of a list an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnd {
    /// The head (LPUSH/LPOP).
    Left,
    /// The tail (RPUSH/RPOP).
    Right,
}

impl ListEnd {
    fn push(self, list: &mut VecDeque<Bytes>, value: Bytes) {
        match self {
            ListEnd::Left => list.push_front(value),
            ListEnd::Right => list.push_back(value),
        }
    }

    fn pop(self, list: &mut VecDeque<Bytes>) -> Option<Bytes> {
        match self {
            ListEnd::Left => list.pop_front(),
            ListEnd::Right => list.pop_back(),
        }
    }
}

impl StorageEngine {
    /// Pushes each value in order at `end`, creating the list if needed.
    ///
    /// `LPUSH key a b c` leaves `[c, b, a]`. Returns the new length.
    pub fn push(&self, key: &Bytes, end: ListEnd, values: &[Bytes]) -> Result<u64, StorageError> {
        self.upsert_typed(key, Value::empty_list, Value::as_list_mut, |list| {
            for value in values {
                end.push(list, value.clone());
            }
            list.len() as u64
        })
    }

    pub fn lpush(&self, key: &Bytes, values: &[Bytes]) -> Result<u64, StorageError> {
        self.push(key, ListEnd::Left, values)
    }

    pub fn rpush(&self, key: &Bytes, values: &[Bytes]) -> Result<u64, StorageError> {
        self.push(key, ListEnd::Right, values)
    }

    /// Removes and returns one element from `end`.
    pub fn pop(&self, key: &[u8], end: ListEnd) -> Result<Option<Bytes>, StorageError> {
        let popped = self.update_typed(key, Value::as_list_mut, |list| end.pop(list))?;
        Ok(popped.flatten())
    }

    /// Removes up to `count` elements from `end`.
    ///
    /// Returns `None` when the key is absent, so callers can tell a missing
    /// list from a `count` of zero.
    pub fn pop_many(
        &self,
        key: &[u8],
        end: ListEnd,
        count: usize,
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        self.update_typed(key, Value::as_list_mut, |list| {
            let n = count.min(list.len());
            (0..n).filter_map(|_| end.pop(list)).collect()
        })
    }

    pub fn llen(&self, key: &[u8]) -> Result<u64, StorageError> {
        self.read_typed(key, Value::as_list, |list| list.map_or(0, |l| l.len() as u64))
    }

    /// Elements from `start` to `stop` inclusive.
    ///
    /// Negative indices count from the tail (-1 is the last element).
    /// Out-of-range indices are clipped rather than rejected.
    pub fn lrange(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>, StorageError> {
        self.read_typed(key, Value::as_list, |list| {
            let Some(list) = list else {
                return Vec::new();
            };
            match clamp_range(list.len(), start, stop) {
                Some((from, to)) => list.range(from..=to).cloned().collect(),
                None => Vec::new(),
            }
        })
    }
}

/// Resolves an inclusive, possibly negative index range against `len`.
///
/// Returns `None` when the clipped range selects nothing.
fn clamp_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { len + start } else { start }.max(0);
    let stop = if stop < 0 { len + stop } else { stop }.min(len - 1);

    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    fn list(items: &[&str]) -> Vec<Bytes> {
        items.iter().map(|s| b(s)).collect()
    }

    #[test]
    fn test_lpush_reverses_arguments() {
        let engine = StorageEngine::new();

        assert_eq!(engine.lpush(&b("l"), &list(&["a"])).unwrap(), 1);
        assert_eq!(engine.lpush(&b("l"), &list(&["b", "c"])).unwrap(), 3);
        assert_eq!(engine.lrange(b"l", 0, -1).unwrap(), list(&["c", "b", "a"]));
    }

    #[test]
    fn test_rpush_keeps_order() {
        let engine = StorageEngine::new();

        engine.rpush(&b("l"), &list(&["a", "b", "c"])).unwrap();
        assert_eq!(engine.lrange(b"l", 0, -1).unwrap(), list(&["a", "b", "c"]));
        assert_eq!(engine.llen(b"l").unwrap(), 3);
    }

    #[test]
    fn test_pop_both_ends() {
        let engine = StorageEngine::new();

        engine.rpush(&b("l"), &list(&["a", "b", "c"])).unwrap();
        assert_eq!(engine.pop(b"l", ListEnd::Left).unwrap(), Some(b("a")));
        assert_eq!(engine.pop(b"l", ListEnd::Right).unwrap(), Some(b("c")));
        assert_eq!(engine.pop(b"l", ListEnd::Right).unwrap(), Some(b("b")));

        // Emptied list is gone
        assert_eq!(engine.key_type(b"l"), "none");
        assert_eq!(engine.pop(b"l", ListEnd::Left).unwrap(), None);
    }

    #[test]
    fn test_pop_many() {
        let engine = StorageEngine::new();

        engine.lpush(&b("l"), &list(&["a", "b", "c", "d"])).unwrap();
        assert_eq!(
            engine.pop_many(b"l", ListEnd::Left, 2).unwrap(),
            Some(list(&["d", "c"]))
        );
        assert_eq!(engine.llen(b"l").unwrap(), 2);

        assert_eq!(engine.pop_many(b"l", ListEnd::Left, 0).unwrap(), Some(vec![]));
        assert_eq!(engine.llen(b"l").unwrap(), 2);

        assert_eq!(
            engine.pop_many(b"l", ListEnd::Right, 10).unwrap(),
            Some(list(&["a", "b"]))
        );
        assert_eq!(engine.pop_many(b"l", ListEnd::Right, 1).unwrap(), None);
    }

    #[test]
    fn test_lrange_clipping() {
        let engine = StorageEngine::new();

        engine.rpush(&b("l"), &list(&["a", "b", "c", "d"])).unwrap();

        assert_eq!(engine.lrange(b"l", 1, 3).unwrap(), list(&["b", "c", "d"]));
        assert_eq!(engine.lrange(b"l", -2, -1).unwrap(), list(&["c", "d"]));
        assert_eq!(engine.lrange(b"l", -100, 100).unwrap(), list(&["a", "b", "c", "d"]));
        assert!(engine.lrange(b"l", 3, 1).unwrap().is_empty());
        assert!(engine.lrange(b"l", 5, 10).unwrap().is_empty());
        assert!(engine.lrange(b"missing", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_clamp_range() {
        assert_eq!(clamp_range(0, 0, -1), None);
        assert_eq!(clamp_range(4, 0, -1), Some((0, 3)));
        assert_eq!(clamp_range(4, -1, -1), Some((3, 3)));
        assert_eq!(clamp_range(4, 2, 1), None);
    }

    #[test]
    fn test_list_wrong_type() {
        let engine = StorageEngine::new();

        engine.set(b("s"), b("v"));
        assert_eq!(engine.lpush(&b("s"), &list(&["a"])), Err(StorageError::WrongType));
        assert_eq!(engine.pop(b"s", ListEnd::Left), Err(StorageError::WrongType));
        assert_eq!(engine.lrange(b"s", 0, -1), Err(StorageError::WrongType));
        assert_eq!(engine.llen(b"s"), Err(StorageError::WrongType));
    }
}
