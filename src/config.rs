//! Server configuration from the command line and environment.

use crate::storage::ExpiryConfig;
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use std::time::Duration;

/// Default pause before the first expiry sweep, in milliseconds.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 100;

/// QuartzKV server
///
/// Each flag can also be set through the `QUARTZKV_*` environment variable
/// named next to it.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "quartzkv")]
#[command(about = "In-memory multi-type key-value server speaking RESP")]
#[command(version)]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "QUARTZKV_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "QUARTZKV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Initial interval of the background expiry sweeper, in milliseconds
    #[arg(
        long,
        env = "QUARTZKV_SWEEP_INTERVAL_MS",
        default_value_t = DEFAULT_SWEEP_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sweep_interval_ms: u64,

    /// Refuse keyspace-growing writes once estimated usage reaches this many
    /// bytes (0 = no limit)
    #[arg(long, env = "QUARTZKV_MAXMEMORY", default_value_t = 0)]
    pub maxmemory: usize,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "quartzkv=trace")
    #[arg(long, env = "QUARTZKV_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            maxmemory: 0,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn expiry_config(&self) -> ExpiryConfig {
        ExpiryConfig::with_base_interval(Duration::from_millis(self.sweep_interval_ms))
    }
}
