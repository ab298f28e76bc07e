//! Unified error type for the Spyroom server.

use spyroom_protocol::ProtocolError;
use spyroom_room::RoomError;
use spyroom_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` conversions let `?` lift sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum SpyroomError {
    /// Binding, accepting, sending, or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An event could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room operation failed or the lobby is gone.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The server configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
