/// A frame could not be produced or understood.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "json")]
    #[error("cannot encode event: {0}")]
    Encode(#[source] serde_json::Error),

    /// Not JSON, an unknown `event`, or a payload with missing or
    /// mistyped fields. The client gets `BAD_REQUEST` back.
    #[cfg(feature = "json")]
    #[error("malformed event: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame was rejected before any decoding was attempted.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
