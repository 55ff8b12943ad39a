//! Connection Handler Module
//!
//! One handler per client, each running on its own tokio task.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects, ConnectionHandler spawned
//!        │
//!        ▼
//! 2. ┌──────────────────────────────────────┐
//!    │      Main Loop                       │
//!    │                                      │
//!    │  Read bytes into the buffer          │
//!    │        │                             │
//!    │        ▼                             │
//!    │  Parse every complete frame,         │
//!    │  execute it, encode the reply        │
//!    │        │                             │
//!    │        ▼                             │
//!    │  Flush all replies with one write    │
//!    │        │                             │
//!    │        ▼                             │
//!    │   [Loop back]                        │
//!    └──────────────────────────────────────┘
//!        │
//!        ▼
//! 3. EOF, I/O error, or protocol error: task ends
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a byte stream, so one read may carry half a frame or several
//! pipelined frames. Incoming bytes accumulate in a `BytesMut`; a complete
//! frame is split off the front, an incomplete tail stays put until the
//! next read completes it. Replies are written in request order.
//!
//! A malformed frame cannot be resynchronized, so the client gets one
//! `-ERR Protocol error: ...` reply and the connection is closed.

use crate::commands::CommandHandler;
use crate::protocol::parser::MAX_BULK_SIZE;
use crate::protocol::{parse_command, Command, ParseError, RespValue};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, error, trace, warn};

/// Upper bound on buffered, unparsed input: one maximal bulk string plus
/// room for its framing.
const MAX_BUFFER_SIZE: usize = MAX_BULK_SIZE + 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Server-wide connection counters, shared by every handler and read by INFO.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Drives one client session over any byte stream.
///
/// Generic so tests can run it over an in-memory mock as well as a
/// `TcpStream`.
pub struct ConnectionHandler<S> {
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Bytes read but not yet parsed
    buffer: BytesMut,

    /// Encoded replies awaiting the next flush
    replies: BytesMut,

    command_handler: CommandHandler,

    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            replies: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            stats,
        }
    }

    /// Serves the client until it disconnects or the session fails.
    ///
    /// A clean disconnect between frames is `Err(ClientDisconnected)`.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        debug!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => debug!(client = %self.addr, "Client disconnected gracefully"),
            Err(ConnectionError::ClientDisconnected) => {
                debug!(client = %self.addr, "Client disconnected")
            }
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            let parsed = self.process_buffered();
            self.flush_replies().await?;
            parsed?;

            self.read_more_data().await?;
        }
    }

    /// Executes every complete frame in the buffer, queueing the replies.
    ///
    /// On a malformed frame the protocol error reply is queued last and the
    /// error returned, so the caller flushes it before closing.
    fn process_buffered(&mut self) -> Result<(), ConnectionError> {
        loop {
            match self.try_parse_command() {
                Ok(Some(Some(command))) => {
                    let reply = self.command_handler.execute(&command);
                    self.stats.command_processed();
                    reply.write_to(&mut self.replies);
                }
                // An empty request array gets no reply
                Ok(Some(None)) => {}
                Ok(None) => return Ok(()),
                Err(e) => {
                    RespValue::error(format!("ERR Protocol error: {}", e))
                        .write_to(&mut self.replies);
                    return Err(ConnectionError::ParseError(e));
                }
            }
        }
    }

    /// Attempts to split one request frame off the front of the buffer.
    ///
    /// `Ok(None)` means the buffered bytes do not hold a whole frame yet.
    fn try_parse_command(&mut self) -> Result<Option<Option<Command>>, ParseError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        match parse_command(&self.buffer) {
            Ok(Some((command, consumed))) => {
                let _ = self.buffer.split_to(consumed);
                trace!(
                    client = %self.addr,
                    consumed,
                    remaining = self.buffer.len(),
                    "Parsed command"
                );
                Ok(Some(command))
            }
            Ok(None) => {
                trace!(
                    client = %self.addr,
                    buffered = self.buffer.len(),
                    "Incomplete command, need more data"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(client = %self.addr, error = %e, "Protocol error");
                Err(e)
            }
        }
    }

    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            error!(
                client = %self.addr,
                size = self.buffer.len(),
                "Buffer size limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            return if self.buffer.is_empty() {
                Err(ConnectionError::ClientDisconnected)
            } else {
                Err(ConnectionError::UnexpectedEof)
            };
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Writes all queued replies in one go.
    async fn flush_replies(&mut self) -> Result<(), ConnectionError> {
        if self.replies.is_empty() {
            return Ok(());
        }

        let out = self.replies.split();
        self.stream.write_all(&out).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(out.len());
        trace!(client = %self.addr, bytes = out.len(), "Sent replies");
        Ok(())
    }
}

/// Why a session ended.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed request frame; fatal to the connection
    #[error("Protocol error: {0}")]
    ParseError(#[from] ParseError),

    /// Client closed the socket between frames
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Client closed the socket mid-frame
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    #[error("Buffer size limit exceeded")]
    BufferFull,
}

/// Runs a session to completion, logging anything but an ordinary hang-up.
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => debug!(client = %addr, error = %e, "Connection ended with error"),
        }
    }
}
