//! WebSocket transport over `tokio-tungstenite`.
//!
//! Browser clients speak JSON, so outbound UTF-8 payloads become text
//! frames. Inbound text and binary frames are both handed up as bytes;
//! pings and pongs are reported as keep-alives.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::WebSocketStream;

use crate::{Connection, ConnectionId, Inbound, Transport, TransportError};

/// Process-wide, so ids stay unique even across several listeners.
static CONNECTION_SEQ: AtomicU64 = AtomicU64::new(1);

type Socket = WebSocketStream<TcpStream>;

/// Listens for TCP connections and upgrades each to a WebSocket.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds the listener. Use port 0 to let the OS pick one.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr, "listening for websocket clients");
        Ok(Self { listener })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<WebSocketConnection, TransportError> {
        let (tcp, peer) = self.listener.accept().await.map_err(TransportError::Accept)?;

        let socket = tokio_tungstenite::accept_async(tcp)
            .await
            .map_err(|e| TransportError::Upgrade {
                peer,
                reason: e.to_string(),
            })?;

        let connection = WebSocketConnection::new(socket, peer);
        tracing::debug!(connection = %connection.id, %peer, "websocket upgraded");
        Ok(connection)
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// One upgraded client socket.
///
/// The socket is split so a writer task can push room broadcasts while
/// the reader task is parked in [`Connection::recv`].
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    outgoing: Mutex<SplitSink<Socket, Message>>,
    incoming: Mutex<SplitStream<Socket>>,
}

impl WebSocketConnection {
    fn new(socket: Socket, peer: SocketAddr) -> Self {
        let (outgoing, incoming) = socket.split();
        Self {
            id: ConnectionId::new(CONNECTION_SEQ.fetch_add(1, Ordering::Relaxed)),
            peer,
            outgoing: Mutex::new(outgoing),
            incoming: Mutex::new(incoming),
        }
    }

    /// The remote address the client connected from.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn send_error(&self, e: tungstenite::Error) -> TransportError {
        match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::Closed(self.id)
            }
            other => TransportError::Send {
                connection: self.id,
                reason: other.to_string(),
            },
        }
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let frame = outbound_frame(data);
        let mut outgoing = self.outgoing.lock().await;
        outgoing.send(frame).await.map_err(|e| self.send_error(e))
    }

    async fn recv(&self) -> Result<Option<Inbound>, TransportError> {
        let mut incoming = self.incoming.lock().await;
        match incoming.next().await {
            Some(Ok(frame)) => Ok(classify(frame)),
            Some(Err(e)) => Err(TransportError::Receive {
                connection: self.id,
                reason: e.to_string(),
            }),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), TransportError> {
        let mut outgoing = self.outgoing.lock().await;
        outgoing
            .send(Message::Ping(Vec::new().into()))
            .await
            .map_err(|e| self.send_error(e))
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut outgoing = self.outgoing.lock().await;
        match outgoing.close().await {
            Ok(()) => Ok(()),
            // Closing twice, or after the peer hung up, is not a failure.
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(self.send_error(e)),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// `None` for a close frame. Tungstenite answers pings on its own; both
/// pings and pongs still count as activity.
fn classify(frame: Message) -> Option<Inbound> {
    match frame {
        Message::Text(text) => Some(Inbound::Data(text.as_bytes().to_vec())),
        Message::Binary(bytes) => Some(Inbound::Data(bytes.to_vec())),
        Message::Close(_) => None,
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Some(Inbound::KeepAlive),
    }
}

fn outbound_frame(data: &[u8]) -> Message {
    match std::str::from_utf8(data) {
        Ok(text) => Message::Text(text.to_owned().into()),
        Err(_) => Message::Binary(data.to_vec().into()),
    }
}
