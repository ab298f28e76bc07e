//! Wire protocol for Spyroom.
//!
//! This crate defines the vocabulary clients and the server share:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomId`], ...): the
//!   events that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Room (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, ErrorCode, PlayerView, Recipient, Role, RoomId, RoomStatus,
    ServerEvent,
};
