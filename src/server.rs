//! TCP accept loop.
//!
//! One tokio task per accepted client. The storage engine and connection
//! counters are shared by every task through `Arc`.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::StorageEngine;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Accepts clients forever, spawning a session task for each.
///
/// A failed `accept` is logged and the loop carries on.
pub async fn serve(listener: TcpListener, storage: Arc<StorageEngine>, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    error!(client = %addr, error = %e, "Failed to set TCP_NODELAY");
                }
                let handler = CommandHandler::new(Arc::clone(&storage), Arc::clone(&stats));
                tokio::spawn(handle_connection(stream, addr, handler, Arc::clone(&stats)));
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
            }
        }
    }
}

/// Runs [`serve`] until `shutdown` completes.
///
/// Sessions already in flight are detached tasks and end with the runtime.
pub async fn serve_until(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::select! {
        _ = serve(listener, storage, stats) => {}
        _ = shutdown => {
            info!("Shutdown signal received, no longer accepting connections");
        }
    }
}
