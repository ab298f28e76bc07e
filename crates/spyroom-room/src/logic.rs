//! The room state machine as a pure function.
//!
//! [`apply`] takes the current room and one [`Action`] and returns the
//! next room plus the [`Effect`]s the caller must carry out (topic
//! subscriptions and event deliveries). It never touches the registry
//! or the network, so every rule here is testable with a plain `Room`.

use rand::Rng;
use spyroom_protocol::{Recipient, RoomId, RoomStatus, ServerEvent};
use spyroom_transport::ConnectionId;

use crate::{roles, GameRules, Room, RoomError};

/// One client action against one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Seat the creator of a freshly allocated room as its admin.
    Create {
        connection: ConnectionId,
        player_name: String,
    },
    /// Seat a new non-admin player.
    Join {
        connection: ConnectionId,
        player_name: String,
    },
    /// Deal roles. Any connection may request it.
    Start { requested_by: ConnectionId },
    /// Append a chat line from a seated player.
    Chat {
        connection: ConnectionId,
        text: String,
        timestamp: u64,
    },
    /// Reveal the location and the spy. Any connection may request it.
    End { requested_by: ConnectionId },
    /// Remove a player whose connection went away.
    Leave { connection: ConnectionId },
}

/// Something the caller must do after a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Add `connection` to the room's broadcast topic.
    Subscribe {
        connection: ConnectionId,
        room: RoomId,
    },
    /// Send `event` to `to`.
    Deliver { to: Recipient, event: ServerEvent },
    /// The room is gone; drop its topic.
    CloseTopic(RoomId),
}

impl Effect {
    /// A broadcast to every subscriber of `room`.
    pub fn to_room(room: &RoomId, event: ServerEvent) -> Self {
        Self::Deliver {
            to: Recipient::Room(room.clone()),
            event,
        }
    }

    /// A unicast to one connection.
    pub fn to_connection(connection: ConnectionId, event: ServerEvent) -> Self {
        Self::Deliver {
            to: Recipient::Connection(connection),
            event,
        }
    }
}

/// The outcome of [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The next room, or `None` if the room must be destroyed.
    pub room: Option<Room>,
    pub effects: Vec<Effect>,
}

/// Applies `action` to `room`.
///
/// # Errors
/// Returns the validation failure for the action; `room` is untouched
/// either way.
pub fn apply<R: Rng>(
    room: &Room,
    action: Action,
    rules: &GameRules,
    rng: &mut R,
) -> Result<Transition, RoomError> {
    let mut next = room.clone();
    let id = room.id.clone();

    let effects = match action {
        Action::Create {
            connection,
            player_name,
        } => {
            next.seat(connection, player_name, true);
            vec![
                Effect::Subscribe {
                    connection,
                    room: id.clone(),
                },
                Effect::to_connection(
                    connection,
                    ServerEvent::GameCreated {
                        room_id: id,
                        players: next.player_views(),
                    },
                ),
            ]
        }

        Action::Join {
            connection,
            player_name,
        } => {
            if next.contains(connection) {
                return Err(RoomError::AlreadyInRoom(connection, id));
            }
            if next.is_full() {
                return Err(RoomError::RoomFull(id));
            }
            if !next.status.is_joinable() {
                return Err(RoomError::AlreadyStarted(id));
            }
            next.seat(connection, player_name, false);
            vec![
                Effect::Subscribe {
                    connection,
                    room: id.clone(),
                },
                Effect::to_room(
                    &id,
                    ServerEvent::PlayerJoined {
                        players: next.player_views(),
                    },
                ),
            ]
        }

        Action::Start { .. } => {
            let present = next.players.len();
            if present < rules.min_players {
                return Err(RoomError::NotEnoughPlayers {
                    room: id,
                    present,
                    required: rules.min_players,
                });
            }
            if present > next.config.capacity {
                return Err(RoomError::TooManyPlayers {
                    room: id,
                    present,
                    capacity: next.config.capacity,
                });
            }

            let spy_index = roles::draw_spy(present, rng)
                .ok_or(RoomError::NotEnoughPlayers {
                    room: id.clone(),
                    present,
                    required: rules.min_players,
                })?;
            let spy = next.players[spy_index].connection;
            next.spy = Some(spy);
            next.secret_word = Some(rules.secret_word.clone());
            next.status = RoomStatus::Playing;

            let mut effects = roles::deal(&next.players, spy, &rules.secret_word);
            effects.push(Effect::to_room(
                &id,
                ServerEvent::GameStatus {
                    status: RoomStatus::Playing,
                },
            ));
            effects
        }

        Action::Chat {
            connection,
            text,
            timestamp,
        } => {
            let sender = next
                .player(connection)
                .map(|p| p.name.clone())
                .ok_or_else(|| RoomError::NotInRoom(connection, id.clone()))?;
            let entry = next.push_message(sender, text, timestamp);
            let event = ServerEvent::ChatMessage {
                sender: entry.sender.clone(),
                text: entry.text.clone(),
                timestamp: entry.timestamp,
            };
            vec![Effect::to_room(&id, event)]
        }

        Action::End { .. } => vec![Effect::to_room(
            &id,
            ServerEvent::GameEnded {
                location: next.secret_word.clone(),
                spy: next.spy_name().map(str::to_owned),
            },
        )],

        Action::Leave { connection } => {
            if next.unseat(connection).is_none() {
                Vec::new()
            } else if next.is_empty() {
                return Ok(Transition {
                    room: None,
                    effects: vec![Effect::CloseTopic(id)],
                });
            } else {
                vec![Effect::to_room(
                    &id,
                    ServerEvent::PlayerLeft {
                        players: next.player_views(),
                    },
                )]
            }
        }
    };

    Ok(Transition {
        room: Some(next),
        effects,
    })
}
