//! List commands.

use super::handler::{count_reply, parse_int_arg};
use super::{CommandError, CommandHandler, CommandResult};
use crate::protocol::RespValue;
use crate::storage::ListEnd;
use bytes::Bytes;

/// LPUSH key element [element ...]
pub(super) fn lpush(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    push(h, args, ListEnd::Left)
}

/// RPUSH key element [element ...]
pub(super) fn rpush(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    push(h, args, ListEnd::Right)
}

fn push(h: &CommandHandler, args: &[Bytes], end: ListEnd) -> CommandResult {
    Ok(count_reply(h.storage().push(&args[0], end, &args[1..])?))
}

/// LPOP key [count]
pub(super) fn lpop(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    pop(h, args, ListEnd::Left)
}

/// RPOP key [count]
pub(super) fn rpop(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    pop(h, args, ListEnd::Right)
}

/// Without a count, replies with one element or nil. With a count, replies
/// with an array, or a nil array when the key does not exist.
fn pop(h: &CommandHandler, args: &[Bytes], end: ListEnd) -> CommandResult {
    let Some(count) = args.get(1) else {
        return Ok(RespValue::optional_bulk(h.storage().pop(&args[0], end)?));
    };

    let count = parse_int_arg(count)?;
    let count = usize::try_from(count).map_err(|_| CommandError::OutOfRange)?;

    Ok(match h.storage().pop_many(&args[0], end, count)? {
        Some(items) => RespValue::bulk_array(items),
        None => RespValue::NullArray,
    })
}

/// LLEN key
pub(super) fn llen(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().llen(&args[0])?))
}

/// LRANGE key start stop
pub(super) fn lrange(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    let start = parse_int_arg(&args[1])?;
    let stop = parse_int_arg(&args[2])?;
    Ok(RespValue::bulk_array(h.storage().lrange(&args[0], start, stop)?))
}

#[cfg(test)]
mod tests {
    use crate::commands::handler::test_support::*;
    use crate::protocol::RespValue;

    fn bulks(items: &[&str]) -> RespValue {
        RespValue::array(items.iter().map(|s| bulk(s)).collect())
    }

    #[test]
    fn test_lpush_order() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["LPUSH", "l", "a"]), RespValue::integer(1));
        assert_eq!(run(&handler, &["LPUSH", "l", "b", "c"]), RespValue::integer(3));
        assert_eq!(run(&handler, &["LRANGE", "l", "0", "-1"]), bulks(&["c", "b", "a"]));
    }

    #[test]
    fn test_pop_with_count() {
        let handler = create_handler();

        run(&handler, &["LPUSH", "l", "a", "b", "c"]);
        assert_eq!(run(&handler, &["LPOP", "l", "2"]), bulks(&["c", "b"]));
        assert_eq!(run(&handler, &["LLEN", "l"]), RespValue::integer(1));

        assert_eq!(run(&handler, &["RPOP", "l", "0"]), RespValue::array(vec![]));
        assert_eq!(run(&handler, &["RPOP", "l", "5"]), bulks(&["a"]));
        assert_eq!(run(&handler, &["EXISTS", "l"]), RespValue::integer(0));
    }

    #[test]
    fn test_pop_missing_key() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["LPOP", "nope"]), RespValue::null());
        assert_eq!(run(&handler, &["LPOP", "nope", "3"]), RespValue::NullArray);
        assert_eq!(run(&handler, &["LPOP", "nope", "3"]).serialize(), b"*-1\r\n");
    }

    #[test]
    fn test_pop_bad_count_leaves_list() {
        let handler = create_handler();

        run(&handler, &["RPUSH", "l", "a", "b"]);
        assert_eq!(
            run(&handler, &["LPOP", "l", "abc"]),
            RespValue::error("ERR value is not an integer or out of range")
        );
        assert_eq!(
            run(&handler, &["LPOP", "l", "-1"]),
            RespValue::error("ERR value is out of range, must be positive")
        );
        assert_eq!(run(&handler, &["LRANGE", "l", "0", "-1"]), bulks(&["a", "b"]));
    }

    #[test]
    fn test_lrange() {
        let handler = create_handler();

        run(&handler, &["RPUSH", "l", "a", "b", "c", "d"]);
        assert_eq!(run(&handler, &["LRANGE", "l", "1", "3"]), bulks(&["b", "c", "d"]));
        assert_eq!(
            run(&handler, &["LRANGE", "l", "0", "-1"]),
            bulks(&["a", "b", "c", "d"])
        );
        assert_eq!(run(&handler, &["LRANGE", "l", "2", "1"]), RespValue::array(vec![]));
        assert_eq!(
            run(&handler, &["LRANGE", "l", "x", "1"]),
            RespValue::error("ERR value is not an integer or out of range")
        );
    }

    #[test]
    fn test_list_commands_on_wrong_type() {
        let handler = create_handler();

        run(&handler, &["SADD", "s", "a"]);
        assert_eq!(
            run(&handler, &["LRANGE", "s", "0", "-1"]),
            RespValue::error("WRONGTYPE Operation against a key holding the wrong kind of value")
        );
        assert_eq!(run(&handler, &["SCARD", "s"]), RespValue::integer(1));
    }
}
