//! The frame: the unit the transport writes and reassembles.

use crate::TransportError;

/// Size of the big-endian length prefix in bytes.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default upper bound for a length prefix (1 MiB).
///
/// Game payloads are tiny JSON objects; anything near this size means the
/// stream is out of sync.
pub const DEFAULT_MAX_FRAME_LEN: u32 = 1024 * 1024;

/// One complete frame: a type byte and the bytes that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The raw type byte. Its meaning belongs to the protocol layer.
    pub type_byte: u8,
    /// Everything after the type byte. May be empty.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame from its parts.
    pub fn new(type_byte: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            type_byte,
            payload: payload.into(),
        }
    }

    /// Encodes the frame into its wire representation.
    pub fn encode(&self) -> Result<Vec<u8>, TransportError> {
        encode_frame(self.type_byte, &self.payload)
    }
}

/// The length prefix for a payload of `payload_len` bytes (type byte
/// included), or `None` if it doesn't fit in 32 bits.
fn wire_len(payload_len: usize) -> Option<u32> {
    u32::try_from(payload_len).ok()?.checked_add(1)
}

/// Builds `[length][type_byte][payload]` where `length = 1 + payload.len()`.
///
/// ```rust
/// use gallows_transport::encode_frame;
///
/// let bytes = encode_frame(0x01, b"Bob").unwrap();
/// assert_eq!(bytes, [0, 0, 0, 4, 0x01, b'B', b'o', b'b']);
/// ```
///
/// # Errors
/// `PayloadTooLarge` if the length does not fit the 32-bit prefix.
pub fn encode_frame(
    type_byte: u8,
    payload: &[u8],
) -> Result<Vec<u8>, TransportError> {
    let len = wire_len(payload.len())
        .ok_or(TransportError::PayloadTooLarge(payload.len()))?;
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_LEN + 1 + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.push(type_byte);
    buf.extend_from_slice(payload);
    Ok(buf)
}
