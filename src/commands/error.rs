//! Command errors and their wire form.

use crate::protocol::RespValue;
use crate::storage::StorageError;
use thiserror::Error;

/// Why a command produced an error reply.
///
/// The `Display` text is exactly what goes on the wire after the `-` marker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    /// Holds the command name in lower case.
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(String),

    /// A numeric argument did not parse as an i64.
    #[error("ERR value is not an integer or out of range")]
    NotInteger,

    #[error("ERR value is out of range, must be positive")]
    OutOfRange,

    #[error("OOM command not allowed when used memory > 'maxmemory'")]
    OutOfMemory,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CommandError> for RespValue {
    fn from(err: CommandError) -> Self {
        RespValue::Error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_text() {
        assert_eq!(
            RespValue::from(CommandError::WrongArity("get".into())),
            RespValue::error("ERR wrong number of arguments for 'get' command")
        );
        assert_eq!(
            RespValue::from(CommandError::UnknownCommand("FOO".into())),
            RespValue::error("ERR unknown command 'FOO'")
        );
        assert_eq!(
            RespValue::from(CommandError::from(StorageError::WrongType)),
            RespValue::error("WRONGTYPE Operation against a key holding the wrong kind of value")
        );
        assert_eq!(
            CommandError::Storage(StorageError::Overflow).to_string(),
            "ERR increment or decrement would overflow"
        );
        assert_eq!(
            CommandError::from(StorageError::InvalidExpireTime).to_string(),
            "ERR invalid expire time in 'expire' command"
        );
        assert_eq!(
            RespValue::from(CommandError::OutOfMemory),
            RespValue::error("OOM command not allowed when used memory > 'maxmemory'")
        );
    }
}
