//! Turning events into frames and back.
//!
//! The session adapter only needs "bytes in, event out" and the reverse;
//! [`JsonCodec`] is the format browser clients speak.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Converts wire values to and from frame payloads.
///
/// One codec value is shared by every connection task, hence
/// `Send + Sync + 'static`.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// [`ProtocolError::InvalidFrame`] for an empty frame,
    /// [`ProtocolError::Decode`] for malformed payloads, unknown event
    /// names, and missing or mistyped fields.
    fn decode<T: DeserializeOwned>(&self, frame: &[u8]) -> Result<T, ProtocolError>;
}

/// JSON text frames via `serde_json`.
///
/// ```rust
/// use spyroom_protocol::{ClientEvent, Codec, JsonCodec, RoomId};
///
/// let frame = JsonCodec
///     .encode(&ClientEvent::StartGame { room_id: RoomId::from("K3Q9ZD") })
///     .unwrap();
/// assert_eq!(frame, br#"{"event":"startGame","data":{"roomId":"K3Q9ZD"}}"#);
///
/// let back: ClientEvent = JsonCodec.decode(&frame).unwrap();
/// assert_eq!(back.name(), "startGame");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, frame: &[u8]) -> Result<T, ProtocolError> {
        if frame.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::InvalidFrame("empty frame".into()));
        }
        serde_json::from_slice(frame).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientEvent, ErrorCode, ServerEvent};

    #[test]
    fn test_cyrillic_survives_as_utf8() {
        let frame = JsonCodec
            .encode(&ServerEvent::GameEnded {
                location: Some("Телефон".into()),
                spy: Some("Боб".into()),
            })
            .unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.contains("Телефон"));
    }

    #[test]
    fn test_error_event_frame() {
        let frame = JsonCodec
            .encode(&ServerEvent::GameError {
                code: ErrorCode::RoomFull,
                message: "room AB12CD is full".into(),
            })
            .unwrap();
        assert_eq!(
            frame,
            br#"{"event":"gameError","data":{"code":"ROOM_FULL","message":"room AB12CD is full"}}"#
        );
    }

    #[test]
    fn test_empty_frame_is_invalid() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"  \n");
        assert!(matches!(result, Err(ProtocolError::InvalidFrame(_))));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"\x00\x01 nope");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_missing_player_name_is_a_decode_error() {
        let result: Result<ClientEvent, _> =
            JsonCodec.decode(br#"{"event":"joinGame","data":{"roomId":"X"}}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("playerName"));
    }
}
