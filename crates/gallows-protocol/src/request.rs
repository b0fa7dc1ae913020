//! Requests the client sends.
//!
//! All requests carry the REQUEST direction and a plain-text body (not
//! JSON). GUESS is used for two different things on the wire:
//!
//! - `GUESS|REQUEST` + one letter → guess that letter
//! - `GUESS|REQUEST` + empty body → "send me the current phrase"
//!
//! [`Request`] keeps the two apart: [`Request::Guess`] holds a `char`, so
//! it can never encode to an empty body, and [`Request::RequestPhrase`] is
//! the only way to produce one.

use gallows_transport::Frame;

use crate::{Direction, Kind, MessageType, ProtocolError};

/// A typed client → server request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Join the game under `name`.
    Join { name: String },
    /// Leave the game.
    Leave,
    /// Guess one letter.
    Guess(char),
    /// Ask for the current phrase.
    RequestPhrase,
    /// Ask for the full scoreboard.
    RequestScoreboard,
}

impl Request {
    /// Builds a guess from user-typed text.
    ///
    /// The text must be exactly one character. Empty input is rejected
    /// rather than turned into a phrase request.
    ///
    /// ```rust
    /// use gallows_protocol::Request;
    ///
    /// assert_eq!(Request::guess_from_text("h").unwrap(), Request::Guess('h'));
    /// assert!(Request::guess_from_text("").is_err());
    /// assert!(Request::guess_from_text("ab").is_err());
    /// ```
    pub fn guess_from_text(text: &str) -> Result<Self, ProtocolError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Ok(Self::Guess(letter)),
            _ => Err(ProtocolError::InvalidGuess(text.to_string())),
        }
    }

    /// The kind this request is sent as.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Join { .. } => Kind::Join,
            Self::Leave => Kind::Leave,
            Self::Guess(_) | Self::RequestPhrase => Kind::Guess,
            Self::RequestScoreboard => Kind::Score,
        }
    }

    /// The type byte: always REQUEST direction.
    pub fn message_type(&self) -> MessageType {
        MessageType::new(self.kind(), Direction::Request)
    }

    /// The UTF-8 body.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Join { name } => name.as_bytes().to_vec(),
            Self::Guess(letter) => letter.to_string().into_bytes(),
            Self::Leave | Self::RequestPhrase | Self::RequestScoreboard => {
                Vec::new()
            }
        }
    }

    /// The frame to put on the wire.
    pub fn to_frame(&self) -> Frame {
        Frame::new(self.message_type().byte(), self.payload())
    }
}
