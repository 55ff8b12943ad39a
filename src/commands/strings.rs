//! String commands: SET, GET, INCR, DECR, INCRBY, DECRBY.

use super::handler::parse_int_arg;
use super::{CommandError, CommandHandler, CommandResult};
use crate::protocol::RespValue;
use bytes::Bytes;

/// SET key value
pub(super) fn set(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    h.storage().set(args[0].clone(), args[1].clone());
    Ok(RespValue::ok())
}

/// GET key
pub(super) fn get(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::optional_bulk(h.storage().get(&args[0])))
}

/// INCR key
pub(super) fn incr(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    incr_by(h, &args[0], 1)
}

/// DECR key
pub(super) fn decr(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    incr_by(h, &args[0], -1)
}

/// INCRBY key increment
pub(super) fn incrby(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    let delta = parse_int_arg(&args[1])?;
    incr_by(h, &args[0], delta)
}

/// DECRBY key decrement
pub(super) fn decrby(h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    let delta = parse_int_arg(&args[1])?
        .checked_neg()
        .ok_or(CommandError::NotInteger)?;
    incr_by(h, &args[0], delta)
}

fn incr_by(h: &CommandHandler, key: &Bytes, delta: i64) -> CommandResult {
    let value = h.storage().incr_by(key, delta)?;
    Ok(RespValue::integer(value))
}
