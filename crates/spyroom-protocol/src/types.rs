//! Core protocol types for Spyroom's wire format.
//!
//! Every frame on the wire is one event, adjacently tagged:
//!
//! ```text
//! { "event": "joinGame", "data": { "roomId": "K3Q9ZD", "playerName": "Bob" } }
//! ```
//!
//! Event names and field names are camelCase because the browser client
//! speaks them directly. Clients send [`ClientEvent`]s; the server answers
//! with [`ServerEvent`]s.

use std::fmt;

use serde::{Deserialize, Serialize};
use spyroom_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A room code: the short token players share to join a game.
///
/// Newtype over `String` so it can't be confused with player names or
/// chat text. `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive an event?
// ---------------------------------------------------------------------------

/// Addressing for an outbound event.
///
/// `Room` is a broadcast to every connection subscribed to the room's
/// topic; `Connection` is a unicast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every connection subscribed to this room.
    Room(RoomId),
    /// Exactly one connection.
    Connection(ConnectionId),
}

// ---------------------------------------------------------------------------
// Small enums shared by several events
// ---------------------------------------------------------------------------

/// Lifecycle status of a room.
///
/// There is no terminal state: ending a game reveals the secret but
/// leaves the room `Playing` until its last member disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Accepting players.
    #[default]
    Waiting,
    /// Roles have been dealt.
    Playing,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
        }
    }
}

/// The hidden role dealt to a player when the game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Knows nothing; must infer the location from the conversation.
    Spy,
    /// Knows the shared location.
    Player,
}

/// Machine-readable error category carried by `gameError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidCapacity,
    RoomNotFound,
    RoomFull,
    RoomAlreadyStarted,
    NotEnoughPlayers,
    TooManyPlayers,
    NotInRoom,
    AlreadyInRoom,
    /// The frame could not be decoded into a known event.
    BadRequest,
    /// Something failed on the server side.
    Internal,
}

/// A player as shown to clients, in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// The player's connection number.
    pub id: u64,
    pub name: String,
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// ClientEvent: client → server
// ---------------------------------------------------------------------------

/// Events a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Open a new room with the sender as its admin.
    ///
    /// `capacity` is signed so out-of-range values (including negative
    /// ones) reach the capacity check instead of failing to decode.
    #[serde(rename_all = "camelCase")]
    CreateGame {
        player_name: String,
        capacity: i64,
        #[serde(default)]
        round_time: u64,
    },

    /// Take a seat in an existing room.
    #[serde(rename_all = "camelCase")]
    JoinGame { room_id: RoomId, player_name: String },

    /// Deal roles and move the room to `playing`.
    #[serde(rename_all = "camelCase")]
    StartGame { room_id: RoomId },

    /// Post a chat line to the room.
    #[serde(rename_all = "camelCase")]
    ChatMessage { room_id: RoomId, text: String },

    /// Reveal the location and the spy.
    #[serde(rename_all = "camelCase")]
    EndGame { room_id: RoomId },
}

impl ClientEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateGame { .. } => "createGame",
            Self::JoinGame { .. } => "joinGame",
            Self::StartGame { .. } => "startGame",
            Self::ChatMessage { .. } => "chatMessage",
            Self::EndGame { .. } => "endGame",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent: server → client
// ---------------------------------------------------------------------------

/// Events the server emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Unicast to the creator.
    #[serde(rename_all = "camelCase")]
    GameCreated {
        room_id: RoomId,
        players: Vec<PlayerView>,
    },

    /// Broadcast after a successful join, including to the joiner.
    PlayerJoined { players: Vec<PlayerView> },

    /// Unicast to each player at start. `word` is `None` for the spy.
    GameStarted { role: Role, word: Option<String> },

    /// Broadcast after roles are dealt.
    GameStatus { status: RoomStatus },

    /// Broadcast chat line. `timestamp` is server-assigned milliseconds
    /// since the Unix epoch.
    ChatMessage {
        sender: String,
        text: String,
        timestamp: u64,
    },

    /// Broadcast reveal. `location` is the secret word; either field is
    /// `None` if the game never started or the spy has left.
    GameEnded {
        location: Option<String>,
        spy: Option<String>,
    },

    /// Broadcast to the remaining members after a disconnect.
    PlayerLeft { players: Vec<PlayerView> },

    /// Unicast to the requester when an action is rejected.
    GameError { code: ErrorCode, message: String },
}

// =========================================================================
// Tests
// =========================================================================
