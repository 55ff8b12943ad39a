//! Command Table
//!
//! Every command the server understands, with its arity rule and handler.
//! Arity counts include the command name itself, so `GET key` is
//! `Exact(2)`.

use super::{hash, keys, list, server, set, strings, CommandHandler, CommandResult};
use bytes::Bytes;

/// How many words (name included) a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Inclusive bounds.
    Between(usize, usize),
    /// At least `n`, and everything after the key forms field/value pairs.
    Pairs(usize),
}

impl Arity {
    /// Whether `argc` words, counting the name, satisfy this rule.
    pub fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Exact(n) => argc == n,
            Arity::AtLeast(n) => argc >= n,
            Arity::Between(min, max) => (min..=max).contains(&argc),
            Arity::Pairs(n) => argc >= n && (argc - 2) % 2 == 0,
        }
    }
}

/// Signature shared by every command implementation.
///
/// `args` excludes the command name and has already passed the arity check.
pub type HandlerFn = fn(&CommandHandler, &[Bytes]) -> CommandResult;

/// One row of the command table.
#[derive(Debug)]
pub struct CommandSpec {
    /// Canonical upper-case name
    pub name: &'static str,
    pub arity: Arity,
    pub handler: HandlerFn,
    /// Can grow the keyspace; refused while over the memory limit
    pub may_allocate: bool,
}

impl CommandSpec {
    const fn new(name: &'static str, arity: Arity, handler: HandlerFn) -> Self {
        Self {
            name,
            arity,
            handler,
            may_allocate: false,
        }
    }

    const fn allocates(self) -> Self {
        Self {
            may_allocate: true,
            ..self
        }
    }
}

use Arity::{AtLeast, Between, Exact, Pairs};

/// The command table.
pub static COMMANDS: &[CommandSpec] = &[
    // Strings
    CommandSpec::new("SET", Exact(3), strings::set).allocates(),
    CommandSpec::new("GET", Exact(2), strings::get),
    CommandSpec::new("INCR", Exact(2), strings::incr).allocates(),
    CommandSpec::new("DECR", Exact(2), strings::decr).allocates(),
    CommandSpec::new("INCRBY", Exact(3), strings::incrby).allocates(),
    CommandSpec::new("DECRBY", Exact(3), strings::decrby).allocates(),
    // Keys
    CommandSpec::new("DEL", AtLeast(2), keys::del),
    CommandSpec::new("EXISTS", AtLeast(2), keys::exists),
    CommandSpec::new("EXPIRE", Exact(3), keys::expire),
    CommandSpec::new("TTL", Exact(2), keys::ttl),
    CommandSpec::new("PTTL", Exact(2), keys::pttl),
    CommandSpec::new("PERSIST", Exact(2), keys::persist),
    CommandSpec::new("TYPE", Exact(2), keys::key_type),
    // Hashes
    CommandSpec::new("HSET", Pairs(4), hash::hset).allocates(),
    CommandSpec::new("HGET", Exact(3), hash::hget),
    CommandSpec::new("HDEL", AtLeast(3), hash::hdel),
    CommandSpec::new("HEXISTS", Exact(3), hash::hexists),
    CommandSpec::new("HKEYS", Exact(2), hash::hkeys),
    CommandSpec::new("HVALS", Exact(2), hash::hvals),
    CommandSpec::new("HLEN", Exact(2), hash::hlen),
    CommandSpec::new("HGETALL", Exact(2), hash::hgetall),
    // Lists
    CommandSpec::new("LPUSH", AtLeast(3), list::lpush).allocates(),
    CommandSpec::new("RPUSH", AtLeast(3), list::rpush).allocates(),
    CommandSpec::new("LPOP", Between(2, 3), list::lpop),
    CommandSpec::new("RPOP", Between(2, 3), list::rpop),
    CommandSpec::new("LLEN", Exact(2), list::llen),
    CommandSpec::new("LRANGE", Exact(4), list::lrange),
    // Sets
    CommandSpec::new("SADD", AtLeast(3), set::sadd).allocates(),
    CommandSpec::new("SREM", AtLeast(3), set::srem),
    CommandSpec::new("SCARD", Exact(2), set::scard),
    CommandSpec::new("SISMEMBER", Exact(3), set::sismember),
    CommandSpec::new("SMEMBERS", Exact(2), set::smembers),
    // Server
    CommandSpec::new("PING", Between(1, 2), server::ping),
    CommandSpec::new("ECHO", Exact(2), server::echo),
    CommandSpec::new("DBSIZE", Exact(1), server::dbsize),
    CommandSpec::new("FLUSHDB", Exact(1), server::flushdb),
    CommandSpec::new("FLUSHALL", Exact(1), server::flushdb),
    CommandSpec::new("INFO", Exact(1), server::info),
];

/// Finds a command by name, ignoring ASCII case.
pub fn lookup(name: &[u8]) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.name.as_bytes().eq_ignore_ascii_case(name))
}
