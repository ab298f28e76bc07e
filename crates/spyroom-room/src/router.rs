//! Broadcast router: room topics and per-connection outbound channels.

use std::collections::HashMap;

use spyroom_protocol::{Recipient, RoomId, ServerEvent};
use spyroom_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::Effect;

/// Channel sender for delivering outbound events to one connection.
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

/// Delivers events to rooms (topics) and single connections.
///
/// Delivery is fire-and-forget: an event for a connection whose
/// receiver is gone is dropped silently. Events pushed to the same
/// connection arrive in push order.
#[derive(Debug, Default)]
pub struct BroadcastRouter {
    connections: HashMap<ConnectionId, ConnectionSender>,
    /// Subscribers per room, in subscription order.
    topics: HashMap<RoomId, Vec<ConnectionId>>,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the outbound channel for a newly connected client.
    pub fn register(&mut self, connection: ConnectionId, sender: ConnectionSender) {
        self.connections.insert(connection, sender);
    }

    /// Drops a connection's channel and removes it from every topic.
    pub fn forget(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
        self.topics.retain(|_, subscribers| {
            subscribers.retain(|c| *c != connection);
            !subscribers.is_empty()
        });
    }

    /// Adds `connection` to `room`'s topic. Subscribing twice is a no-op.
    pub fn subscribe(&mut self, connection: ConnectionId, room: RoomId) {
        let subscribers = self.topics.entry(room).or_default();
        if !subscribers.contains(&connection) {
            subscribers.push(connection);
        }
    }

    pub fn close_topic(&mut self, room: &RoomId) {
        self.topics.remove(room);
    }

    /// Connections currently subscribed to `room`.
    pub fn subscribers(&self, room: &RoomId) -> &[ConnectionId] {
        self.topics.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_connected(&self, connection: ConnectionId) -> bool {
        self.connections.contains_key(&connection)
    }

    /// Broadcasts `event` to every subscriber of `room`.
    pub fn to_room(&self, room: &RoomId, event: &ServerEvent) {
        for connection in self.subscribers(room) {
            self.to_connection(*connection, event.clone());
        }
    }

    /// Unicasts `event` to one connection.
    pub fn to_connection(&self, connection: ConnectionId, event: ServerEvent) {
        match self.connections.get(&connection) {
            Some(sender) => {
                if sender.send(event).is_err() {
                    tracing::debug!(%connection, "receiver gone, event dropped");
                }
            }
            None => {
                tracing::debug!(%connection, "unknown connection, event dropped");
            }
        }
    }

    /// Carries out effects in order.
    pub fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Subscribe { connection, room } => self.subscribe(connection, room),
                Effect::Deliver { to, event } => match to {
                    Recipient::Room(room) => self.to_room(&room, &event),
                    Recipient::Connection(connection) => self.to_connection(connection, event),
                },
                Effect::CloseTopic(room) => self.close_topic(&room),
            }
        }
    }
}
