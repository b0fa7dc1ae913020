//! Error types for the protocol layer.
//!
//! None of these are fatal to the connection. The length prefix already
//! told us where the frame ends, so the stream stays in sync and the
//! client simply drops the offending message.

use crate::MessageType;

/// Errors that can occur while building or interpreting messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a structured payload failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A structured payload was malformed or had the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload bytes are not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The direction bits are wrong for the side that received the message
    /// (for example a REQUEST arriving at the client).
    #[error("unexpected direction in {0}")]
    UnexpectedDirection(MessageType),

    /// The kind bits do not name a known kind.
    #[error("unknown message kind in type byte 0x{0:02x}")]
    UnknownKind(u8),

    /// Known kind and direction, but not a combination the server sends.
    #[error("unexpected message {0}")]
    UnexpectedMessage(MessageType),

    /// A guess must be exactly one character.
    #[error("invalid guess: {0:?}")]
    InvalidGuess(String),
}
