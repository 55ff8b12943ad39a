//! Server commands: PING, ECHO, DBSIZE, FLUSHDB/FLUSHALL, INFO.

use super::handler::count_reply;
use super::{CommandHandler, CommandResult};
use crate::protocol::RespValue;
use bytes::Bytes;
use std::fmt::Write;
use std::sync::atomic::Ordering;
use tracing::info;

/// PING [message]
pub(super) fn ping(_h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(match args.first() {
        Some(message) => RespValue::bulk_string(message.clone()),
        None => RespValue::pong(),
    })
}

/// ECHO message
pub(super) fn echo(_h: &CommandHandler, args: &[Bytes]) -> CommandResult {
    Ok(RespValue::bulk_string(args[0].clone()))
}

/// DBSIZE
pub(super) fn dbsize(h: &CommandHandler, _args: &[Bytes]) -> CommandResult {
    Ok(count_reply(h.storage().len()))
}

/// FLUSHDB / FLUSHALL
pub(super) fn flushdb(h: &CommandHandler, _args: &[Bytes]) -> CommandResult {
    h.storage().flush();
    info!("Keyspace flushed");
    Ok(RespValue::ok())
}

/// INFO
pub(super) fn info(h: &CommandHandler, _args: &[Bytes]) -> CommandResult {
    Ok(RespValue::bulk_string(render_info(h)))
}

fn render_info(h: &CommandHandler) -> String {
    let storage = h.storage().stats();
    let conns = h.stats();
    let uptime = h.uptime_secs();
    let load = |counter: &std::sync::atomic::AtomicU64| counter.load(Ordering::Relaxed);

    let mut out = String::with_capacity(1024);

    // Writing to a String cannot fail
    let _ = write!(
        out,
        "# Server\r\n\
         quartzkv_version:{}\r\n\
         os:{}\r\n\
         arch:{}\r\n\
         process_id:{}\r\n\
         uptime_in_seconds:{}\r\n\
         uptime_in_days:{}\r\n\
         \r\n\
         # Clients\r\n\
         connected_clients:{}\r\n\
         \r\n\
         # Stats\r\n\
         total_connections_received:{}\r\n\
         total_commands_processed:{}\r\n\
         total_net_input_bytes:{}\r\n\
         total_net_output_bytes:{}\r\n\
         expired_keys:{}\r\n\
         get_ops:{}\r\n\
         set_ops:{}\r\n\
         del_ops:{}\r\n\
         \r\n\
         # Keyspace\r\n",
        crate::VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::process::id(),
        uptime,
        uptime / 86_400,
        load(&conns.active_connections),
        load(&conns.connections_accepted),
        load(&conns.commands_processed),
        load(&conns.bytes_read),
        load(&conns.bytes_written),
        storage.expired,
        storage.get_ops,
        storage.set_ops,
        storage.del_ops,
    );

    if storage.keys > 0 {
        let _ = write!(
            out,
            "db0:keys={},expires={}\r\n",
            storage.keys, storage.expires
        );
    }

    let _ = write!(
        out,
        "\r\n\
         # Memory\r\n\
         used_memory:{}\r\n\
         used_memory_human:{}\r\n\
         max_memory:{}\r\n\
         max_memory_human:{}\r\n",
        storage.used_memory,
        human_bytes(storage.used_memory),
        storage.max_memory,
        human_bytes(storage.max_memory),
    );

    out
}

fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}B", bytes)
    } else {
        format!("{:.2}{}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::human_bytes;
    use crate::commands::handler::test_support::*;
    use crate::protocol::RespValue;

    fn info_text(handler: &crate::commands::CommandHandler) -> String {
        let reply = run(handler, &["INFO"]);
        String::from_utf8(reply.as_bytes().expect("bulk reply").to_vec()).unwrap()
    }

    #[test]
    fn test_ping_echo() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["PING"]), RespValue::simple_string("PONG"));
        assert_eq!(run(&handler, &["PING", "hello"]), bulk("hello"));
        assert_eq!(run(&handler, &["ECHO", "hi there"]), bulk("hi there"));
    }

    #[test]
    fn test_dbsize_flushdb() {
        let handler = create_handler();

        run(&handler, &["SET", "a", "1"]);
        run(&handler, &["HSET", "h", "f", "v"]);
        run(&handler, &["RPUSH", "l", "x"]);
        run(&handler, &["SADD", "s", "m"]);
        assert_eq!(run(&handler, &["DBSIZE"]), RespValue::integer(4));

        assert_eq!(run(&handler, &["FLUSHDB"]), RespValue::ok());
        assert_eq!(run(&handler, &["DBSIZE"]), RespValue::integer(0));
        assert_eq!(
            run(&handler, &["EXISTS", "a", "h", "l", "s"]),
            RespValue::integer(0)
        );

        run(&handler, &["SET", "a", "1"]);
        assert_eq!(run(&handler, &["FLUSHALL"]), RespValue::ok());
        assert_eq!(run(&handler, &["DBSIZE"]), RespValue::integer(0));
    }

    #[test]
    fn test_info_sections() {
        let handler = create_handler();

        run(&handler, &["SET", "a", "1"]);
        run(&handler, &["EXPIRE", "a", "100"]);
        let text = info_text(&handler);

        for section in ["# Server", "# Clients", "# Stats", "# Keyspace", "# Memory"] {
            assert!(text.contains(section), "missing {}", section);
        }
        assert!(text.contains("db0:keys=1,expires=1"));
        assert!(text.contains("max_memory:0\r\n"));
        assert!(text.contains(&format!("quartzkv_version:{}", crate::VERSION)));
    }

    #[test]
    fn test_info_empty_keyspace() {
        let handler = create_handler();

        let text = info_text(&handler);
        assert!(text.contains("# Keyspace"));
        assert!(!text.contains("db0:"));
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512B");
        assert_eq!(human_bytes(2048), "2.00K");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.00M");
    }
}
