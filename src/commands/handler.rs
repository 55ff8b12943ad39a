//! Command Dispatch
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  lookup()   │───>│  arity ok?  │───>│  handler()  │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      StorageEngine          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Name lookup, the arity check, and the memory limit check happen before
//! any handler runs, so a rejected command never touches the store.

use super::error::CommandError;
use super::registry;
use crate::connection::ConnectionStats;
use crate::protocol::{Command, RespValue};
use crate::storage::{value::parse_integer, StorageEngine};
use std::sync::Arc;
use std::time::Instant;
use tracing::{trace, warn};

/// Result type of every command implementation.
pub type CommandResult = Result<RespValue, CommandError>;

/// Executes commands against the shared store.
///
/// Cheap to clone; every connection holds its own copy.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
    /// Connection counters, reported by INFO
    stats: Arc<ConnectionStats>,
    /// Server start time for INFO command
    start_time: Instant,
}

impl CommandHandler {
    pub fn new(storage: Arc<StorageEngine>, stats: Arc<ConnectionStats>) -> Self {
        Self {
            storage,
            stats,
            start_time: Instant::now(),
        }
    }

    /// Runs one command and returns its reply. Failures become error replies.
    pub fn execute(&self, command: &Command) -> RespValue {
        self.try_execute(command).unwrap_or_else(RespValue::from)
    }

    fn try_execute(&self, command: &Command) -> CommandResult {
        let spec = registry::lookup(&command.name)
            .ok_or_else(|| CommandError::UnknownCommand(command.name_lossy()))?;

        if !spec.arity.accepts(command.args.len() + 1) {
            return Err(CommandError::WrongArity(spec.name.to_ascii_lowercase()));
        }

        if spec.may_allocate && self.storage.is_over_memory_limit() {
            warn!(
                command = spec.name,
                used_memory = self.storage.used_memory(),
                max_memory = self.storage.max_memory(),
                "Write refused, memory limit reached"
            );
            return Err(CommandError::OutOfMemory);
        }

        trace!(command = spec.name, argc = command.args.len(), "Executing");
        (spec.handler)(self, &command.args)
    }

    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    pub(crate) fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub(crate) fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Parses an integer argument.
pub(crate) fn parse_int_arg(arg: &[u8]) -> Result<i64, CommandError> {
    parse_integer(arg).map_err(|_| CommandError::NotInteger)
}

/// Integer reply for a count.
pub(crate) fn count_reply(n: u64) -> RespValue {
    RespValue::integer(i64::try_from(n).unwrap_or(i64::MAX))
}

pub(crate) fn bool_reply(flag: bool) -> RespValue {
    RespValue::integer(i64::from(flag))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_unknown_command() {
        let handler = create_handler();

        assert_eq!(
            run(&handler, &["FOOBAR", "x"]),
            RespValue::error("ERR unknown command 'FOOBAR'")
        );
    }

    #[test]
    fn test_unknown_command_with_line_breaks_is_one_reply() {
        let handler = create_handler();
        let command = Command::new("X'\r\n:1\r\n+OK", Vec::new());

        let wire = handler.execute(&command).serialize();
        let (reply, consumed) = crate::protocol::parse_message(&wire).unwrap().unwrap();

        assert_eq!(consumed, wire.len());
        assert_eq!(
            reply,
            RespValue::error("ERR unknown command 'X'  :1  +OK'")
        );
    }

    #[test]
    fn test_case_insensitive_names() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["set", "k", "v"]), RespValue::ok());
        assert_eq!(run(&handler, &["gEt", "k"]), bulk("v"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let handler = create_handler();

        run(&handler, &["SET", "Key", "v"]);
        assert_eq!(run(&handler, &["GET", "key"]), RespValue::null());
    }

    #[test]
    fn test_wrong_arity_does_not_mutate() {
        let handler = create_handler();

        assert_eq!(
            run(&handler, &["SET", "k"]),
            RespValue::error("ERR wrong number of arguments for 'set' command")
        );
        assert_eq!(
            run(&handler, &["SET", "k", "v", "extra"]),
            RespValue::error("ERR wrong number of arguments for 'set' command")
        );
        assert_eq!(
            run(&handler, &["HSET", "h", "f1", "v1", "f2"]),
            RespValue::error("ERR wrong number of arguments for 'hset' command")
        );
        assert_eq!(run(&handler, &["DBSIZE"]), RespValue::integer(0));
    }

    #[test]
    fn test_every_command_rejects_bad_arity() {
        let handler = create_handler();

        for spec in registry::COMMANDS {
            let argc = match spec.arity {
                registry::Arity::Exact(n) => n + 1,
                registry::Arity::AtLeast(n) | registry::Arity::Pairs(n) => n - 1,
                registry::Arity::Between(_, max) => max + 1,
            };
            let mut words = vec![spec.name];
            words.resize(argc, "x");

            let reply = run(&handler, &words);
            assert_eq!(
                reply,
                RespValue::from(CommandError::WrongArity(spec.name.to_ascii_lowercase())),
                "{} with {} words",
                spec.name,
                argc
            );
        }
        assert_eq!(handler.storage().len(), 0);
    }

    #[test]
    fn test_memory_limit_refuses_growing_writes() {
        let handler = CommandHandler::new(
            Arc::new(StorageEngine::with_max_memory(1)),
            Arc::new(ConnectionStats::new()),
        );
        let oom = RespValue::from(CommandError::OutOfMemory);

        // Nothing measured yet
        assert_eq!(run(&handler, &["SET", "a", "1"]), RespValue::ok());
        run(&handler, &["RPUSH", "l", "x", "y"]);
        handler.storage().cleanup_expired();

        assert_eq!(run(&handler, &["SET", "b", "2"]), oom);
        assert_eq!(run(&handler, &["HSET", "h", "f", "v"]), oom);
        assert_eq!(run(&handler, &["RPUSH", "l", "z"]), oom);
        assert_eq!(run(&handler, &["INCR", "a"]), oom);
        assert_eq!(run(&handler, &["EXISTS", "b", "h"]), RespValue::integer(0));

        // Reads and frees still run
        assert_eq!(run(&handler, &["GET", "a"]), bulk("1"));
        assert_eq!(run(&handler, &["LLEN", "l"]), RespValue::integer(2));
        assert_eq!(run(&handler, &["LPOP", "l"]), bulk("x"));
        assert_eq!(run(&handler, &["DEL", "a", "l"]), RespValue::integer(2));
        assert!(run(&handler, &["INFO"]).as_bytes().is_some());

        handler.storage().cleanup_expired();
        assert_eq!(run(&handler, &["SET", "b", "2"]), RespValue::ok());
    }

    #[test]
    fn test_no_memory_limit_by_default() {
        let handler = create_handler();

        run(&handler, &["SET", "a", "1"]);
        handler.storage().cleanup_expired();
        assert_eq!(run(&handler, &["SET", "b", "2"]), RespValue::ok());
    }

    #[test]
    fn test_parse_int_arg() {
        assert_eq!(parse_int_arg(b"42"), Ok(42));
        assert_eq!(parse_int_arg(b"-3"), Ok(-3));
        assert_eq!(parse_int_arg(b"abc"), Err(CommandError::NotInteger));
        assert_eq!(parse_int_arg(b"1.5"), Err(CommandError::NotInteger));
    }
}
