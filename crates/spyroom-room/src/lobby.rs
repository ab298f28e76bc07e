//! Lobby actor: the single task that owns every room.
//!
//! Connection handlers never touch room state. They send commands over
//! an mpsc channel and the actor processes them one at a time, each to
//! completion, so no two operations ever interleave on the same room.

use rand::Rng;
use spyroom_protocol::ClientEvent;
use spyroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{BroadcastRouter, ConnectionSender, RoomError, RoomInfo, RoomManager};

/// Default command channel size for the lobby actor.
pub const DEFAULT_CHANNEL_SIZE: usize = 256;

/// Commands sent to the lobby actor through its channel.
pub(crate) enum LobbyCommand {
    /// A client connected; register its outbound channel.
    Connect {
        connection: ConnectionId,
        sender: ConnectionSender,
    },

    /// An inbound client event.
    Event {
        connection: ConnectionId,
        event: ClientEvent,
    },

    /// The transport reported the connection gone.
    Disconnect { connection: ConnectionId },

    /// Request snapshots of all rooms.
    ListRooms { reply: oneshot::Sender<Vec<RoomInfo>> },

    /// Stop the actor.
    Shutdown,
}

/// Handle to the running lobby actor.
///
/// Cheap to clone; every connection handler holds one.
#[derive(Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// Registers a new connection and its outbound channel.
    pub async fn connect(
        &self,
        connection: ConnectionId,
        sender: ConnectionSender,
    ) -> Result<(), RoomError> {
        self.send(LobbyCommand::Connect { connection, sender }).await
    }

    /// Forwards a client event (fire-and-forget; replies arrive on the
    /// connection's outbound channel).
    pub async fn dispatch(
        &self,
        connection: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        self.send(LobbyCommand::Event { connection, event }).await
    }

    /// Reports a closed connection.
    pub async fn disconnect(&self, connection: ConnectionId) -> Result<(), RoomError> {
        self.send(LobbyCommand::Disconnect { connection }).await
    }

    /// Returns snapshots of all live rooms, sorted by code.
    pub async fn rooms(&self) -> Result<Vec<RoomInfo>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::ListRooms { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(LobbyCommand::Shutdown).await
    }

    async fn send(&self, command: LobbyCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

/// The actor state. Runs inside one Tokio task.
struct LobbyActor<R: Rng> {
    manager: RoomManager<R>,
    router: BroadcastRouter,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl<R: Rng> LobbyActor<R> {
    /// Processes commands until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!("lobby started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Connect { connection, sender } => {
                    tracing::debug!(%connection, "connection registered");
                    self.router.register(connection, sender);
                }
                LobbyCommand::Event { connection, event } => {
                    let effects = self.manager.handle(connection, event);
                    self.router.apply(effects);
                }
                LobbyCommand::Disconnect { connection } => {
                    // Forget first so the leaver gets no playerLeft of its own.
                    self.router.forget(connection);
                    let effects = self.manager.handle_disconnect(connection);
                    self.router.apply(effects);
                    tracing::debug!(%connection, "connection released");
                }
                LobbyCommand::ListRooms { reply } => {
                    let _ = reply.send(self.manager.rooms());
                }
                LobbyCommand::Shutdown => {
                    tracing::info!(rooms = self.manager.room_count(), "lobby shutting down");
                    break;
                }
            }
        }

        tracing::info!("lobby stopped");
    }
}

/// Spawns the lobby actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; when full, handlers wait.
pub fn spawn_lobby<R>(manager: RoomManager<R>, channel_size: usize) -> LobbyHandle
where
    R: Rng + Send + 'static,
{
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = LobbyActor {
        manager,
        router: BroadcastRouter::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    LobbyHandle { sender: tx }
}
