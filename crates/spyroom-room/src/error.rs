//! Error types for the room layer.

use spyroom_protocol::{ErrorCode, RoomId};
use spyroom_transport::ConnectionId;

/// Errors that can occur during room operations.
///
/// All of these are request-local: they are reported to the requesting
/// connection only and never change any room's state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// Requested capacity is outside the allowed range.
    #[error("capacity must be between {min} and {max}, got {requested}")]
    InvalidCapacity {
        requested: i64,
        min: usize,
        max: usize,
    },

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full: no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The room is no longer waiting for players.
    #[error("room {0} has already started")]
    AlreadyStarted(RoomId),

    /// Too few players to deal roles.
    #[error("room {room} needs at least {required} players to start, has {present}")]
    NotEnoughPlayers {
        room: RoomId,
        present: usize,
        required: usize,
    },

    /// More players than the room's capacity. Join's guard makes this
    /// unreachable in practice.
    #[error("room {room} has {present} players but capacity {capacity}")]
    TooManyPlayers {
        room: RoomId,
        present: usize,
        capacity: usize,
    },

    /// The connection has no seat in this room.
    #[error("{0} is not a player in room {1}")]
    NotInRoom(ConnectionId, RoomId),

    /// The connection already holds a seat in this room.
    #[error("{0} is already a player in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// The lobby's command channel is closed.
    #[error("lobby is unavailable")]
    Unavailable,
}

impl RoomError {
    /// The machine-readable code sent to clients in `gameError`.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCapacity { .. } => ErrorCode::InvalidCapacity,
            Self::NotFound(_) => ErrorCode::RoomNotFound,
            Self::RoomFull(_) => ErrorCode::RoomFull,
            Self::AlreadyStarted(_) => ErrorCode::RoomAlreadyStarted,
            Self::NotEnoughPlayers { .. } => ErrorCode::NotEnoughPlayers,
            Self::TooManyPlayers { .. } => ErrorCode::TooManyPlayers,
            Self::NotInRoom(..) => ErrorCode::NotInRoom,
            Self::AlreadyInRoom(..) => ErrorCode::AlreadyInRoom,
            Self::Unavailable => ErrorCode::Internal,
        }
    }
}
