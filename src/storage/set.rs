//! Set operations on the keyspace.

use super::engine::StorageEngine;
use super::value::{StorageError, Value};
use bytes::Bytes;

impl StorageEngine {
    /// Adds members, creating the set if needed. Returns how many were new.
    pub fn sadd(&self, key: &Bytes, members: &[Bytes]) -> Result<u64, StorageError> {
        self.upsert_typed(key, Value::empty_set, Value::as_set_mut, |set| {
            members
                .iter()
                .fold(0, |added, m| added + u64::from(set.insert(m.clone())))
        })
    }

    /// Removes members. Removing the last member removes the key.
    pub fn srem(&self, key: &[u8], members: &[Bytes]) -> Result<u64, StorageError> {
        let removed = self.update_typed(key, Value::as_set_mut, |set| {
            members
                .iter()
                .fold(0, |removed, m| removed + u64::from(set.remove(m)))
        })?;
        Ok(removed.unwrap_or(0))
    }

    pub fn scard(&self, key: &[u8]) -> Result<u64, StorageError> {
        self.read_typed(key, Value::as_set, |set| set.map_or(0, |s| s.len() as u64))
    }

    pub fn sismember(&self, key: &[u8], member: &[u8]) -> Result<bool, StorageError> {
        self.read_typed(key, Value::as_set, |set| {
            set.is_some_and(|s| s.contains(member))
        })
    }

    /// All members, in no particular order.
    pub fn smembers(&self, key: &[u8]) -> Result<Vec<Bytes>, StorageError> {
        self.read_typed(key, Value::as_set, |set| {
            set.map(|s| s.iter().cloned().collect()).unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{StorageEngine, StorageError};
    use bytes::Bytes;

    fn b(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn test_sadd_counts_new_members() {
        let engine = StorageEngine::new();

        assert_eq!(engine.sadd(&b("s"), &[b("a"), b("b"), b("c")]).unwrap(), 3);
        assert_eq!(engine.sadd(&b("s"), &[b("a")]).unwrap(), 0);
        assert_eq!(engine.sadd(&b("s"), &[b("d"), b("d")]).unwrap(), 1);
        assert_eq!(engine.scard(b"s").unwrap(), 4);
    }

    #[test]
    fn test_srem_and_membership() {
        let engine = StorageEngine::new();

        engine.sadd(&b("s"), &[b("a"), b("b")]).unwrap();
        assert!(engine.sismember(b"s", b"a").unwrap());
        assert_eq!(engine.srem(b"s", &[b("a"), b("zz")]).unwrap(), 1);
        assert!(!engine.sismember(b"s", b"a").unwrap());

        assert_eq!(engine.srem(b"s", &[b("b")]).unwrap(), 1);
        assert_eq!(engine.key_type(b"s"), "none");
        assert_eq!(engine.srem(b"s", &[b("b")]).unwrap(), 0);
    }

    #[test]
    fn test_smembers() {
        let engine = StorageEngine::new();

        assert!(engine.smembers(b"s").unwrap().is_empty());
        engine.sadd(&b("s"), &[b("x"), b("y")]).unwrap();

        let mut members = engine.smembers(b"s").unwrap();
        members.sort();
        assert_eq!(members, vec![b("x"), b("y")]);
    }

    #[test]
    fn test_set_wrong_type() {
        let engine = StorageEngine::new();

        engine.rpush(&b("l"), &[b("a")]).unwrap();
        assert_eq!(engine.sadd(&b("l"), &[b("a")]), Err(StorageError::WrongType));
        assert_eq!(engine.scard(b"l"), Err(StorageError::WrongType));
        assert_eq!(engine.smembers(b"l"), Err(StorageError::WrongType));
    }
}
