//! Wire protocol for gallows.
//!
//! This crate defines the "language" the hangman client and server speak
//! on top of the transport's frames:
//!
//! - **Types** ([`Kind`], [`Direction`], [`MessageType`], [`Message`]):
//!   the one-byte type tag and the decoded message.
//! - **Requests** ([`Request`]): everything the client can ask for.
//! - **Payloads** ([`JoinReply`], [`ScoreboardEntry`], ...): the
//!   structured bodies the server sends.
//! - **Events** ([`ServerEvent`]): a server message decoded into a type.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how payloads are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong.
//!
//! # Architecture
//!
//! ```text
//! Transport (Frame) → Protocol (Message / ServerEvent) → Client (session)
//! ```

mod codec;
mod error;
mod event;
mod payload;
mod request;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::ServerEvent;
pub use payload::{
    HangUpdate, JoinReply, PhraseState, PlayerName, ScoreUpdate,
    ScoreboardEntry,
};
pub use request::Request;
pub use types::{Direction, Kind, Message, MessageType};
