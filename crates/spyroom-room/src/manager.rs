//! Room manager: validates client actions and applies them to the registry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spyroom_protocol::{ClientEvent, RoomId, ServerEvent};
use spyroom_transport::ConnectionId;

use crate::logic::{apply, Action, Effect};
use crate::{GameRules, Registry, RoomError, RoomInfo};

/// Owns every live room and executes client actions against them.
///
/// One operation per client action. Each returns the effects to carry
/// out (subscriptions and deliveries) or the error to report to the
/// requester. A failed operation leaves the registry exactly as it was.
///
/// The random source is a type parameter so tests can pass a seeded
/// generator and assert exact room codes and spy choices.
pub struct RoomManager<R: Rng = StdRng> {
    registry: Registry,
    rules: GameRules,
    rng: R,
}

impl RoomManager<StdRng> {
    /// Creates a manager seeded from the operating system.
    pub fn new(rules: GameRules) -> Self {
        Self::with_rng(rules, StdRng::from_os_rng())
    }

    /// Creates a manager with a fixed seed.
    pub fn seeded(rules: GameRules, seed: u64) -> Self {
        Self::with_rng(rules, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RoomManager<R> {
    /// Creates a manager with an explicit random source.
    pub fn with_rng(rules: GameRules, rng: R) -> Self {
        Self {
            registry: Registry::new(),
            rules,
            rng,
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// Snapshots of all live rooms, sorted by code.
    pub fn rooms(&self) -> Vec<RoomInfo> {
        self.registry
            .room_ids()
            .iter()
            .filter_map(|id| self.registry.get(id))
            .map(|room| room.info())
            .collect()
    }

    /// Dispatches one client event.
    ///
    /// This is the error boundary: a rejected action becomes a single
    /// `gameError` addressed to the requester and nothing else.
    pub fn handle(&mut self, connection: ConnectionId, event: ClientEvent) -> Vec<Effect> {
        let name = event.name();
        let result = match event {
            ClientEvent::CreateGame {
                player_name,
                capacity,
                round_time,
            } => self.create_game(connection, player_name, capacity, round_time),
            ClientEvent::JoinGame {
                room_id,
                player_name,
            } => self.join_game(connection, &room_id, player_name),
            ClientEvent::StartGame { room_id } => self.start_game(connection, &room_id),
            ClientEvent::ChatMessage { room_id, text } => {
                self.chat_message(connection, &room_id, text)
            }
            ClientEvent::EndGame { room_id } => self.end_game(connection, &room_id),
        };

        match result {
            Ok(effects) => effects,
            Err(e) => {
                tracing::debug!(%connection, event = name, error = %e, "request rejected");
                vec![Effect::to_connection(
                    connection,
                    ServerEvent::GameError {
                        code: e.code(),
                        message: e.to_string(),
                    },
                )]
            }
        }
    }

    /// Opens a room with the requester as its only, admin player.
    ///
    /// # Errors
    /// [`RoomError::InvalidCapacity`]; no room is created in that case.
    pub fn create_game(
        &mut self,
        connection: ConnectionId,
        player_name: String,
        capacity: i64,
        round_time: u64,
    ) -> Result<Vec<Effect>, RoomError> {
        let config = self.rules.room_config(capacity, round_time)?;
        let room_id = self.registry.create(config, &mut self.rng);

        let result = self.transition(
            &room_id,
            Action::Create {
                connection,
                player_name,
            },
        );
        match &result {
            Ok(_) => tracing::info!(
                %room_id,
                %connection,
                capacity = config.capacity,
                "room created"
            ),
            Err(_) => {
                self.registry.remove(&room_id);
            }
        }
        result
    }

    /// Seats the requester in an existing room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], [`RoomError::RoomFull`],
    /// [`RoomError::AlreadyStarted`].
    pub fn join_game(
        &mut self,
        connection: ConnectionId,
        room_id: &RoomId,
        player_name: String,
    ) -> Result<Vec<Effect>, RoomError> {
        let effects = self.transition(
            room_id,
            Action::Join {
                connection,
                player_name,
            },
        )?;
        tracing::info!(
            %room_id,
            %connection,
            players = self.player_count(room_id),
            "player joined"
        );
        Ok(effects)
    }

    /// Draws the spy, deals roles, and moves the room to `playing`.
    ///
    /// Any connection may start any room; the admin flag is not checked.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], [`RoomError::NotEnoughPlayers`],
    /// [`RoomError::TooManyPlayers`].
    pub fn start_game(
        &mut self,
        connection: ConnectionId,
        room_id: &RoomId,
    ) -> Result<Vec<Effect>, RoomError> {
        let effects = self.transition(
            room_id,
            Action::Start {
                requested_by: connection,
            },
        )?;
        tracing::info!(
            %room_id,
            requested_by = %connection,
            players = self.player_count(room_id),
            "game started"
        );
        Ok(effects)
    }

    /// Appends a chat line and broadcasts it.
    ///
    /// # Errors
    /// [`RoomError::NotFound`], [`RoomError::NotInRoom`].
    pub fn chat_message(
        &mut self,
        connection: ConnectionId,
        room_id: &RoomId,
        text: String,
    ) -> Result<Vec<Effect>, RoomError> {
        self.transition(
            room_id,
            Action::Chat {
                connection,
                text,
                timestamp: now_millis(),
            },
        )
    }

    /// Broadcasts the location and the spy's name.
    ///
    /// The room keeps its status and stays registered until its last
    /// member disconnects.
    ///
    /// # Errors
    /// [`RoomError::NotFound`].
    pub fn end_game(
        &mut self,
        connection: ConnectionId,
        room_id: &RoomId,
    ) -> Result<Vec<Effect>, RoomError> {
        let effects = self.transition(
            room_id,
            Action::End {
                requested_by: connection,
            },
        )?;
        tracing::info!(%room_id, requested_by = %connection, "game ended");
        Ok(effects)
    }

    /// Removes `connection` from every room it is seated in.
    ///
    /// Rooms left empty are destroyed; the others get `playerLeft`.
    pub fn handle_disconnect(&mut self, connection: ConnectionId) -> Vec<Effect> {
        let mut effects = Vec::new();
        for room_id in self.registry.rooms_with(connection) {
            match self.transition(&room_id, Action::Leave { connection }) {
                Ok(mut more) => {
                    if self.registry.contains(&room_id) {
                        tracing::info!(
                            %room_id,
                            %connection,
                            players = self.player_count(&room_id),
                            "player left"
                        );
                    } else {
                        tracing::info!(%room_id, "room destroyed");
                    }
                    effects.append(&mut more);
                }
                Err(e) => {
                    tracing::warn!(%room_id, %connection, error = %e, "leave failed");
                }
            }
        }
        effects
    }

    /// Looks up the room, applies `action`, and writes the result back.
    fn transition(
        &mut self,
        room_id: &RoomId,
        action: Action,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = self
            .registry
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let transition = apply(room, action, &self.rules, &mut self.rng)?;

        match transition.room {
            Some(room) => self.registry.store(room),
            None => {
                self.registry.remove(room_id);
            }
        }
        Ok(transition.effects)
    }

    fn player_count(&self, room_id: &RoomId) -> usize {
        self.registry
            .get(room_id)
            .map_or(0, |room| room.players().len())
    }
}

/// Milliseconds since the Unix epoch; 0 if the clock is before it.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(epoch_millis)
        .unwrap_or_default()
}

/// Saturates instead of wrapping for durations past `u64::MAX` ms.
fn epoch_millis(since_epoch: Duration) -> u64 {
    u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
}
