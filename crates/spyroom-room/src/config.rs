//! Game rules and per-room configuration.

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// The location dealt to every non-spy player.
pub const DEFAULT_SECRET_WORD: &str = "Телефон";

// ---------------------------------------------------------------------------
// GameRules
// ---------------------------------------------------------------------------

/// Server-wide rules shared by every room.
///
/// Defaults: capacity 2–10, two players to start, one fixed location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Smallest capacity a room may be created with.
    pub min_capacity: usize,

    /// Largest capacity a room may be created with.
    pub max_capacity: usize,

    /// Minimum players required to start a game.
    pub min_players: usize,

    /// The location handed to every non-spy player.
    pub secret_word: String,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            min_capacity: 2,
            max_capacity: 10,
            min_players: 2,
            secret_word: DEFAULT_SECRET_WORD.to_string(),
        }
    }
}

impl GameRules {
    /// Validates a requested capacity and builds the room's config.
    ///
    /// # Errors
    /// [`RoomError::InvalidCapacity`] if `capacity` is outside
    /// `min_capacity..=max_capacity`.
    pub fn room_config(
        &self,
        capacity: i64,
        round_time: u64,
    ) -> Result<RoomConfig, RoomError> {
        let invalid = || RoomError::InvalidCapacity {
            requested: capacity,
            min: self.min_capacity,
            max: self.max_capacity,
        };
        let capacity = usize::try_from(capacity).map_err(|_| invalid())?;
        if !(self.min_capacity..=self.max_capacity).contains(&capacity) {
            return Err(invalid());
        }
        Ok(RoomConfig {
            capacity,
            round_time,
        })
    }
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings fixed when a room is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum players allowed in the room.
    pub capacity: usize,

    /// Advisory round length as sent by the creator. Passed through,
    /// never enforced.
    pub round_time: u64,
}
