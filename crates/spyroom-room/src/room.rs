//! The room data model: players, chat history, and dealt secrets.
//!
//! A [`Room`] is plain data. Every change goes through
//! [`apply`](crate::apply), which works on a copy, so a rejected action
//! can never leave a room half-modified.

use spyroom_protocol::{PlayerView, RoomId, RoomStatus};
use spyroom_transport::ConnectionId;

use crate::RoomConfig;

/// A seat in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// The connection that owns this seat. Unique within a room; used as
    /// the unicast address and to match disconnects.
    pub connection: ConnectionId,
    /// Free-text display name. Not checked for uniqueness.
    pub name: String,
    /// Set for the room's creator only. Recorded, not enforced.
    pub is_admin: bool,
}

impl Player {
    /// The client-facing view of this player.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.connection.into_inner(),
            name: self.name.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// One chat line, as stored in the room's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub sender: String,
    pub text: String,
    /// Milliseconds since the Unix epoch. Non-decreasing within a room.
    pub timestamp: u64,
}

/// A snapshot of room metadata, without the player list or history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub player_count: usize,
    pub capacity: usize,
}

/// One game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub(crate) id: RoomId,
    pub(crate) config: RoomConfig,
    pub(crate) status: RoomStatus,
    /// Join order; the spy is drawn over these indices.
    pub(crate) players: Vec<Player>,
    /// Append-only for the life of the room.
    pub(crate) messages: Vec<ChatEntry>,
    pub(crate) secret_word: Option<String>,
    /// Not revalidated if the spy later disconnects.
    pub(crate) spy: Option<ConnectionId>,
}

impl Room {
    /// Creates an empty, waiting room.
    pub fn new(id: RoomId, config: RoomConfig) -> Self {
        Self {
            id,
            config,
            status: RoomStatus::Waiting,
            players: Vec::new(),
            messages: Vec::new(),
            secret_word: None,
            spy: None,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn round_time(&self) -> u64 {
        self.config.round_time
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn messages(&self) -> &[ChatEntry] {
        &self.messages
    }

    /// The location chosen at start, if the game has started.
    pub fn secret_word(&self) -> Option<&str> {
        self.secret_word.as_deref()
    }

    /// The connection drawn as spy, if the game has started.
    pub fn spy(&self) -> Option<ConnectionId> {
        self.spy
    }

    /// The spy's display name, if the spy is still seated.
    pub fn spy_name(&self) -> Option<&str> {
        let spy = self.spy?;
        self.player(spy).map(|p| p.name.as_str())
    }

    /// Looks up the seat owned by `connection`.
    pub fn player(&self, connection: ConnectionId) -> Option<&Player> {
        self.players.iter().find(|p| p.connection == connection)
    }

    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.player(connection).is_some()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.config.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player list in join order, as clients see it.
    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.id.clone(),
            status: self.status,
            player_count: self.players.len(),
            capacity: self.config.capacity,
        }
    }

    pub(crate) fn seat(
        &mut self,
        connection: ConnectionId,
        name: String,
        is_admin: bool,
    ) {
        self.players.push(Player {
            connection,
            name,
            is_admin,
        });
    }

    /// Removes every seat held by `connection`, returning the first.
    pub(crate) fn unseat(&mut self, connection: ConnectionId) -> Option<Player> {
        let index = self
            .players
            .iter()
            .position(|p| p.connection == connection)?;
        let player = self.players.remove(index);
        self.players.retain(|p| p.connection != connection);
        Some(player)
    }

    /// Appends a chat line. The timestamp is clamped so history never
    /// goes backwards even if the wall clock does.
    pub(crate) fn push_message(
        &mut self,
        sender: String,
        text: String,
        timestamp: u64,
    ) -> &ChatEntry {
        let floor = self.messages.last().map_or(0, |m| m.timestamp);
        self.messages.push(ChatEntry {
            sender,
            text,
            timestamp: timestamp.max(floor),
        });
        let last = self.messages.len() - 1;
        &self.messages[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(capacity: usize) -> Room {
        Room::new(
            RoomId::from("R1"),
            RoomConfig {
                capacity,
                round_time: 0,
            },
        )
    }

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_new_room_is_waiting_and_empty() {
        let room = room(4);
        assert_eq!(room.status(), RoomStatus::Waiting);
        assert!(room.is_empty());
        assert!(room.secret_word().is_none());
        assert!(room.spy_name().is_none());
    }

    #[test]
    fn test_seat_preserves_join_order() {
        let mut room = room(4);
        room.seat(conn(1), "Alice".into(), true);
        room.seat(conn(2), "Bob".into(), false);

        let names: Vec<_> = room.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
        assert_eq!(room.player_views()[0].id, 1);
        assert!(room.player_views()[0].is_admin);
    }

    #[test]
    fn test_is_full_at_capacity() {
        let mut room = room(2);
        room.seat(conn(1), "A".into(), true);
        assert!(!room.is_full());
        room.seat(conn(2), "B".into(), false);
        assert!(room.is_full());
    }

    #[test]
    fn test_unseat_removes_only_that_player() {
        let mut room = room(3);
        room.seat(conn(1), "A".into(), true);
        room.seat(conn(2), "B".into(), false);

        let removed = room.unseat(conn(1)).unwrap();
        assert_eq!(removed.name, "A");
        assert!(!room.contains(conn(1)));
        assert!(room.contains(conn(2)));
        assert!(room.unseat(conn(9)).is_none());
    }

    #[test]
    fn test_unseat_clears_every_seat_of_connection() {
        let mut room = room(4);
        room.seat(conn(1), "A".into(), true);
        room.seat(conn(2), "B".into(), false);
        room.seat(conn(2), "B2".into(), false);

        assert_eq!(room.unseat(conn(2)).unwrap().name, "B");
        assert!(!room.contains(conn(2)));
        assert_eq!(room.players().len(), 1);
    }

    #[test]
    fn test_push_message_clamps_backwards_clock() {
        let mut room = room(2);
        room.push_message("A".into(), "one".into(), 1_000);
        let entry = room.push_message("A".into(), "two".into(), 900);
        assert_eq!(entry.timestamp, 1_000);
    }

    #[test]
    fn test_spy_name_gone_after_spy_leaves() {
        let mut room = room(3);
        room.seat(conn(1), "A".into(), true);
        room.seat(conn(2), "B".into(), false);
        room.spy = Some(conn(2));
        assert_eq!(room.spy_name(), Some("B"));

        room.unseat(conn(2));
        assert_eq!(room.spy(), Some(conn(2)));
        assert_eq!(room.spy_name(), None);
    }
}
