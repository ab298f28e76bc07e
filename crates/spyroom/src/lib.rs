//! # Spyroom
//!
//! WebSocket backend for a "find the spy" party game.
//!
//! Players create rooms, share the six-character code, and once enough
//! have joined one of them is secretly made the spy while everyone else
//! learns the location. The server owns all state; clients only send
//! [`ClientEvent`](spyroom_protocol::ClientEvent)s and render the
//! [`ServerEvent`](spyroom_protocol::ServerEvent)s they get back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spyroom::prelude::*;
//!
//! # async fn start() -> Result<(), SpyroomError> {
//! let config = ServerConfig::from_env()?;
//! spyroom::init_tracing(&config.log_level);
//!
//! let server = SpyroomServer::builder().config(config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod logging;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::SpyroomError;
pub use logging::init_tracing;
pub use server::{SpyroomServer, SpyroomServerBuilder};

pub mod prelude {
    pub use crate::{
        init_tracing, ConfigError, ServerConfig, SpyroomError, SpyroomServer,
        SpyroomServerBuilder,
    };
    pub use spyroom_protocol::{
        ClientEvent, Codec, ErrorCode, JsonCodec, PlayerView, Role, RoomId,
        RoomStatus, ServerEvent,
    };
    pub use spyroom_room::{GameRules, LobbyHandle, RoomError, RoomInfo};
    pub use spyroom_transport::ConnectionId;
}
