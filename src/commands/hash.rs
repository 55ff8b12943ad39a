//! Hash commands.

use super::handler::{bool_reply, count_reply};
use super::{CommandHandler, CommandResult};
use crate::protocol::RespValue;
use bytes::Bytes;

/// HSET key field value [field value ...]
pub(super) fn hset(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    let pairs: Vec<(Bytes, Bytes)> = args[1..]
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    Ok(count_reply(h.storage().hset(&args[0], &pairs)?))
}

/// HGET key field
pub(super) fn hget(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::optional_bulk(h.storage().hget(&args[0], &args[1])?))
}

/// HDEL key field [field ...]
pub(super) fn hdel(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().hdel(&args[0], &args[1..])?))
}

/// HEXISTS key field
pub(super) fn hexists(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(bool_reply(h.storage().hexists(&args[0], &args[1])?))
}

/// HKEYS key
pub(super) fn hkeys(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::bulk_array(h.storage().hkeys(&args[0])?))
}

/// HVALS key
pub(super) fn hvals(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::bulk_array(h.storage().hvals(&args[0])?))
}

/// HLEN key
pub(super) fn hlen(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().hlen(&args[0])?))
}

/// HGETALL key
///
/// Replies with fields and values interleaved: `[f1, v1, f2, v2, ...]`.
pub(super) fn hgetall(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    let pairs = h.storage().hgetall(&args[0])?;
    Ok(RespValue::bulk_array(
        pairs.into_iter().flat_map(|(field, value)| [field, value]),
    ))
}
