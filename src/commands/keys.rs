//! Keyspace commands: DEL, EXISTS, EXPIRE, TTL, PTTL, PERSIST, TYPE.

use super::handler::{bool_reply, count_reply, parse_int_arg};
use super::{CommandHandler, CommandResult};
use crate::protocol::RespValue;
use crate::storage::StorageError;
use bytes::Bytes;
use std::time::Duration;

/// Reply for TTL/PTTL on a missing key.
const NO_SUCH_KEY: i64 = -2;

/// DEL key [key ...]
pub(super) fn del(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().delete_many(args)))
}

/// EXISTS key [key ...]
pub(super) fn exists(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().exists_many(args)))
}

/// EXPIRE key seconds
///
/// A zero or negative timeout deletes the key.
pub(super) fn expire(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    let seconds = parse_int_arg(&args[1])?;
    if seconds.checked_mul(1000).is_none() {
        return Err(StorageError::InvalidExpireTime.into());
    }
    let ttl = Duration::from_secs(seconds.max(0).unsigned_abs());
    Ok(bool_reply(h.storage().expire(&args[0], ttl)?))
}

/// TTL key
pub(super) fn ttl(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::integer(
        h.storage().ttl(&args[0]).unwrap_or(NO_SUCH_KEY),
    ))
}

/// PTTL key
pub(super) fn pttl(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::integer(
        h.storage().pttl(&args[0]).unwrap_or(NO_SUCH_KEY),
    ))
}

/// PERSIST key
pub(super) fn persist(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(bool_reply(h.storage().persist(&args[0])))
}

/// TYPE key
pub(super) fn key_type(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::simple_string(h.storage().key_type(&args[0])))
}

#[cfg(test)]
mod tests {
    use crate::commands::handler::test_support::*;
    use crate::protocol::RespValue;
    use std::time::Duration;

    #[test]
    fn test_del() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["DEL", "missing"]), RespValue::integer(0));

        run(&handler, &["SET", "a", "1"]);
        run(&handler, &["HSET", "b", "f", "v"]);
        assert_eq!(run(&handler, &["DEL", "a", "b", "c"]), RespValue::integer(2));
        assert_eq!(run(&handler, &["DEL", "a"]), RespValue::integer(0));
    }

    #[test]
    fn test_exists_counts_duplicates() {
        let handler = create_handler();

        run(&handler, &["SET", "a", "1"]);
        assert_eq!(
            run(&handler, &["EXISTS", "a", "a", "nope"]),
            RespValue::integer(2)
        );
    }

    #[test]
    fn test_expire_and_ttl() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["TTL", "missing"]), RespValue::integer(-2));
        assert_eq!(run(&handler, &["PTTL", "missing"]), RespValue::integer(-2));
        assert_eq!(run(&handler, &["EXPIRE", "missing", "10"]), RespValue::integer(0));
        assert_eq!(run(&handler, &["EXISTS", "missing"]), RespValue::integer(0));

        run(&handler, &["SET", "k", "v"]);
        assert_eq!(run(&handler, &["TTL", "k"]), RespValue::integer(-1));
        assert_eq!(run(&handler, &["EXPIRE", "k", "2"]), RespValue::integer(1));

        let ttl = run(&handler, &["TTL", "k"]).as_integer().unwrap();
        assert!(ttl > 0 && ttl <= 2);
        let pttl = run(&handler, &["PTTL", "k"]).as_integer().unwrap();
        assert!(pttl > 1000 && pttl <= 2000);
    }

    #[test]
    fn test_expire_short_ttl_expires() {
        let handler = create_handler();

        run(&handler, &["SET", "k", "v"]);
        handler.storage().expire(b"k", Duration::from_millis(30)).unwrap();
        std::thread::sleep(Duration::from_millis(60));

        assert_eq!(run(&handler, &["GET", "k"]), RespValue::null());
        assert_eq!(run(&handler, &["TTL", "k"]), RespValue::integer(-2));
    }

    #[test]
    fn test_expire_non_positive_deletes() {
        let handler = create_handler();

        run(&handler, &["SET", "a", "v"]);
        run(&handler, &["SET", "b", "v"]);
        assert_eq!(run(&handler, &["EXPIRE", "a", "0"]), RespValue::integer(1));
        assert_eq!(run(&handler, &["EXPIRE", "b", "-5"]), RespValue::integer(1));
        assert_eq!(run(&handler, &["EXISTS", "a", "b"]), RespValue::integer(0));
    }

    #[test]
    fn test_expire_bad_argument() {
        let handler = create_handler();

        run(&handler, &["SET", "k", "v"]);
        assert_eq!(
            run(&handler, &["EXPIRE", "k", "soon"]),
            RespValue::error("ERR value is not an integer or out of range")
        );
        assert_eq!(
            run(&handler, &["EXPIRE", "k", i64::MAX.to_string().as_str()]),
            RespValue::error("ERR invalid expire time in 'expire' command")
        );
        assert_eq!(run(&handler, &["TTL", "k"]), RespValue::integer(-1));
    }

    #[test]
    fn test_persist() {
        let handler = create_handler();

        run(&handler, &["SET", "k", "v"]);
        assert_eq!(run(&handler, &["PERSIST", "k"]), RespValue::integer(0));
        run(&handler, &["EXPIRE", "k", "100"]);
        assert_eq!(run(&handler, &["PERSIST", "k"]), RespValue::integer(1));
        assert_eq!(run(&handler, &["TTL", "k"]), RespValue::integer(-1));
    }

    #[test]
    fn test_type() {
        let handler = create_handler();

        run(&handler, &["SET", "s", "v"]);
        run(&handler, &["HSET", "h", "f", "v"]);
        run(&handler, &["RPUSH", "l", "a"]);
        run(&handler, &["SADD", "z", "a"]);

        assert_eq!(run(&handler, &["TYPE", "s"]), RespValue::simple_string("string"));
        assert_eq!(run(&handler, &["TYPE", "h"]), RespValue::simple_string("hash"));
        assert_eq!(run(&handler, &["TYPE", "l"]), RespValue::simple_string("list"));
        assert_eq!(run(&handler, &["TYPE", "z"]), RespValue::simple_string("set"));
        assert_eq!(run(&handler, &["TYPE", "x"]), RespValue::simple_string("none"));
    }
}
