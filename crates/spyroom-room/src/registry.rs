//! In-memory store of live rooms, keyed by room code.

use std::collections::HashMap;

use rand::Rng;
use spyroom_protocol::RoomId;
use spyroom_transport::ConnectionId;

use crate::{Room, RoomConfig};

/// Length of a generated room code.
pub const ROOM_CODE_LEN: usize = 6;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Maps room codes to rooms. State lives only as long as the process.
///
/// Not thread-safe on its own: it is owned by the
/// [`RoomManager`](crate::RoomManager), which in turn lives inside the
/// single lobby task.
#[derive(Debug, Default)]
pub struct Registry {
    rooms: HashMap<RoomId, Room>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh code and stores an empty, waiting room under it.
    ///
    /// Codes that collide with a stored room are redrawn.
    pub fn create<R: Rng>(&mut self, config: RoomConfig, rng: &mut R) -> RoomId {
        let id = loop {
            let candidate = generate_code(rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(code = %candidate, "room code collision, redrawing");
        };
        self.rooms.insert(id.clone(), Room::new(id.clone(), config));
        id
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    /// Stores `room` under its own id, replacing any previous version.
    pub fn store(&mut self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn remove(&mut self, id: &RoomId) -> Option<Room> {
        self.rooms.remove(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// All room codes, sorted.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<_> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Codes of every room where `connection` holds a seat, sorted.
    pub fn rooms_with(&self, connection: ConnectionId) -> Vec<RoomId> {
        let mut ids: Vec<_> = self
            .rooms
            .values()
            .filter(|room| room.contains(connection))
            .map(|room| room.id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }
}

fn generate_code<R: Rng>(rng: &mut R) -> RoomId {
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| char::from(ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())]))
        .collect();
    RoomId(code)
}
