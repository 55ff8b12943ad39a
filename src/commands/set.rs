//! Set commands.

use super::handler::{bool_reply, count_reply};
use super::{CommandHandler, CommandResult};
use crate::protocol::RespValue;
use bytes::Bytes;

/// SADD key member [member ...]
pub(super) fn sadd(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().sadd(&args[0], &args[1..])?))
}

/// SREM key member [member ...]
pub(super) fn srem(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().srem(&args[0], &args[1..])?))
}

/// SCARD key
pub(super) fn scard(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().scard(&args[0])?))
}

/// SISMEMBER key member
pub(super) fn sismember(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(bool_reply(h.storage().sismember(&args[0], &args[1])?))
}

/// SMEMBERS key
pub(super) fn smembers(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::bulk_array(h.storage().smembers(&args[0])?))
}
