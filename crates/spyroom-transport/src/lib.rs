//! Connection plumbing for Spyroom.
//!
//! Everything above this crate addresses a client only by its
//! [`ConnectionId`]: it is the unicast address, the seat owner in a room,
//! and the key a disconnect is matched on. Sockets stay down here behind
//! the [`Transport`] and [`Connection`] traits.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] over `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Identity of one live client connection.
///
/// Handed out on accept and never reused while the process runs, so a
/// client that reconnects is a different connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One inbound frame as seen by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text or binary payload.
    Data(Vec<u8>),
    /// A ping or pong: no payload, but proof the peer is alive.
    KeepAlive,
}

/// A listener producing client connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A client connection carrying whole frames.
///
/// `send` and `recv` take `&self` and must not block each other: the
/// reader task sits in `recv` while broadcasts go out through `send`.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Next inbound frame, or `Ok(None)` once the peer has closed.
    async fn recv(&self) -> Result<Option<Inbound>, Self::Error>;

    /// Asks the peer to prove it is alive; the reply arrives through
    /// `recv` as [`Inbound::KeepAlive`].
    async fn ping(&self) -> Result<(), Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
