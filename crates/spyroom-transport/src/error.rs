use std::net::SocketAddr;

use crate::ConnectionId;

/// Failures of the socket layer.
///
/// None of these are reported to clients; a failing connection is simply
/// treated as gone.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The TCP connection came in but the WebSocket handshake did not
    /// complete.
    #[error("upgrade from {peer} failed: {reason}")]
    Upgrade { peer: SocketAddr, reason: String },

    #[error("{0} is closed")]
    Closed(ConnectionId),

    #[error("send on {connection} failed: {reason}")]
    Send {
        connection: ConnectionId,
        reason: String,
    },

    #[error("receive on {connection} failed: {reason}")]
    Receive {
        connection: ConnectionId,
        reason: String,
    },
}
