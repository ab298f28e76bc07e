//! Room lifecycle for Spyroom.
//!
//! All rooms live in one [`Registry`] owned by a [`RoomManager`], which
//! runs inside a single lobby task ([`spawn_lobby`]). Client actions are
//! applied one at a time through the pure [`apply`] function and the
//! resulting [`Effect`]s are carried out by the [`BroadcastRouter`].
//!
//! # Key types
//!
//! - [`RoomManager`]: create/join/start/chat/end/disconnect operations
//! - [`Registry`]: room code → [`Room`] store
//! - [`BroadcastRouter`]: room topics and per-connection channels
//! - [`LobbyHandle`]: send commands to the running lobby actor
//! - [`GameRules`] / [`RoomConfig`]: capacity bounds, secret word

mod config;
mod error;
mod lobby;
mod logic;
mod manager;
mod registry;
pub mod roles;
mod room;
mod router;

pub use config::{GameRules, RoomConfig, DEFAULT_SECRET_WORD};
pub use error::RoomError;
pub use lobby::{spawn_lobby, LobbyHandle, DEFAULT_CHANNEL_SIZE};
pub use logic::{apply, Action, Effect, Transition};
pub use manager::RoomManager;
pub use registry::{Registry, ROOM_CODE_LEN};
pub use room::{ChatEntry, Player, Room, RoomInfo};
pub use router::{BroadcastRouter, ConnectionSender};
