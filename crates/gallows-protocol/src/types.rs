//! The type byte and the decoded message.
//!
//! Every frame starts with one byte that says what the message is and which
//! way it travels:
//!
//! ```text
//!   bit  7 6 │ 5 4 3 2 1 0
//!       ─────┼─────────────
//!        dir │    kind
//! ```
//!
//! The two fields never overlap, so the byte is simply `direction | kind`.

use std::fmt;

use gallows_transport::Frame;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// What a message is about (the low 6 bits of the type byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    /// Joining the game.
    Join = 0x01,
    /// Leaving the game.
    Leave = 0x02,
    /// Guessing a letter, or the current phrase.
    Guess = 0x11,
    /// Scores: the whole board or one player's update.
    Score = 0x12,
    /// A player's fail count.
    Hang = 0x13,
    /// The local player won.
    Win = 0x21,
    /// The local player lost.
    Lose = 0x22,
}

impl Kind {
    /// Bits of the type byte that hold the kind.
    pub const MASK: u8 = 0x3F;

    /// Every known kind, in wire order.
    pub const ALL: [Kind; 7] = [
        Kind::Join,
        Kind::Leave,
        Kind::Guess,
        Kind::Score,
        Kind::Hang,
        Kind::Win,
        Kind::Lose,
    ];

    /// The kind's bit pattern.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Looks up a kind from the low 6 bits. Direction bits are ignored.
    pub fn from_bits(bits: u8) -> Option<Self> {
        let bits = bits & Self::MASK;
        Self::ALL.into_iter().find(|kind| kind.bits() == bits)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Join => "JOIN",
            Self::Leave => "LEAVE",
            Self::Guess => "GUESS",
            Self::Score => "SCORE",
            Self::Hang => "HANG",
            Self::Win => "WIN",
            Self::Lose => "LOSE",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a message travels (the high 2 bits of the type byte).
///
/// `0b11` is not assigned; [`Direction::from_bits`] returns `None` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// Client → server.
    Request = 0x00,
    /// Server → client, answering one of our requests.
    Response = 0x40,
    /// Server → client, unprompted.
    Notify = 0x80,
}

impl Direction {
    /// Bits of the type byte that hold the direction.
    pub const MASK: u8 = 0xC0;

    /// The direction's bit pattern.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Looks up a direction from the high 2 bits. Kind bits are ignored.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::MASK {
            0x00 => Some(Self::Request),
            0x40 => Some(Self::Response),
            0x80 => Some(Self::Notify),
            _ => None,
        }
    }

    /// `true` for the directions a server may send.
    pub fn is_server_to_client(self) -> bool {
        matches!(self, Self::Response | Self::Notify)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Request => "REQUEST",
            Self::Response => "RESPONSE",
            Self::Notify => "NOTIFY",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// The raw type byte.
///
/// Kept as a byte rather than a `(Kind, Direction)` pair so that a message
/// with unknown bits can still be carried, logged, and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageType(u8);

impl MessageType {
    /// Combines a kind and a direction.
    pub const fn new(kind: Kind, direction: Direction) -> Self {
        Self(direction.bits() | kind.bits())
    }

    /// Wraps a byte read off the wire.
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// The byte written on the wire.
    pub const fn byte(self) -> u8 {
        self.0
    }

    /// The kind, if the low bits name one.
    pub fn kind(self) -> Option<Kind> {
        Kind::from_bits(self.0)
    }

    /// The direction, if the high bits name one.
    pub fn direction(self) -> Option<Direction> {
        Direction::from_bits(self.0)
    }

    /// `true` if this is exactly `kind` travelling in `direction`.
    pub fn is(self, kind: Kind, direction: Direction) -> bool {
        self == Self::new(kind, direction)
    }
}

impl From<u8> for MessageType {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

/// Prints `GUESS|NOTIFY (0x91)`, with `?` for unknown fields.
impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{kind}")?,
            None => f.write_str("?")?,
        }
        f.write_str("|")?;
        match self.direction() {
            Some(direction) => write!(f, "{direction}")?,
            None => f.write_str("?")?,
        }
        write!(f, " (0x{:02x})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A decoded frame: type byte plus UTF-8 body.
///
/// For most server messages the body is a JSON object; see
/// [`ServerEvent`](crate::ServerEvent) for the typed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The type byte.
    pub message_type: MessageType,
    /// The payload as text. May be empty.
    pub body: String,
}

impl Message {
    /// Creates a message.
    pub fn new(message_type: MessageType, body: impl Into<String>) -> Self {
        Self {
            message_type,
            body: body.into(),
        }
    }

    /// Shorthand for `self.message_type.kind()`.
    pub fn kind(&self) -> Option<Kind> {
        self.message_type.kind()
    }

    /// Shorthand for `self.message_type.direction()`.
    pub fn direction(&self) -> Option<Direction> {
        self.message_type.direction()
    }
}

impl TryFrom<Frame> for Message {
    type Error = ProtocolError;

    /// Fails with [`ProtocolError::InvalidUtf8`] if the payload is not UTF-8.
    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        let body = String::from_utf8(frame.payload)?;
        Ok(Self {
            message_type: MessageType::from_byte(frame.type_byte),
            body,
        })
    }
}
