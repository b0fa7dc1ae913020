//! Typed view of server → client messages.

use crate::payload::{
    HangUpdate, JoinReply, PhraseState, PlayerName, ScoreUpdate,
    ScoreboardEntry,
};
use crate::{Codec, Direction, Kind, Message, ProtocolError};

/// Something the server told us, decoded from a [`Message`].
///
/// | Message         | Event                                       |
/// |-----------------|---------------------------------------------|
/// | JOIN\|RESPONSE  | [`JoinAccepted`](Self::JoinAccepted) / [`JoinRejected`](Self::JoinRejected) |
/// | JOIN\|NOTIFY    | [`PlayerJoined`](Self::PlayerJoined)         |
/// | LEAVE\|NOTIFY   | [`PlayerLeft`](Self::PlayerLeft)             |
/// | GUESS\|NOTIFY   | [`PhraseRevealed`](Self::PhraseRevealed)     |
/// | SCORE\|RESPONSE | [`Scoreboard`](Self::Scoreboard)             |
/// | SCORE\|NOTIFY   | [`ScoreChanged`](Self::ScoreChanged)         |
/// | HANG\|NOTIFY    | [`PlayerHanged`](Self::PlayerHanged)         |
/// | WIN\|NOTIFY     | [`Won`](Self::Won)                           |
/// | LOSE\|NOTIFY    | [`Lost`](Self::Lost)                         |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Our join was accepted; the session name is now confirmed.
    JoinAccepted,
    /// Our join was refused (empty or taken name). Terminal.
    JoinRejected,
    /// The server acknowledged our leave request.
    LeaveAcknowledged,
    /// Another player joined.
    PlayerJoined { name: String },
    /// A player left.
    PlayerLeft { name: String },
    /// The phrase changed (letters revealed or a new round started).
    PhraseRevealed { phrase: String },
    /// The full scoreboard, in the server's order.
    Scoreboard(Vec<ScoreboardEntry>),
    /// One player's score changed.
    ScoreChanged { player: String, score: u32 },
    /// One player's fail count changed.
    PlayerHanged { player: String, fails: u32 },
    /// We won.
    Won,
    /// We lost.
    Lost,
}

impl ServerEvent {
    /// Decodes a server message.
    ///
    /// # Errors
    /// - `UnknownKind` if the kind bits are unassigned
    /// - `UnexpectedDirection` for REQUEST or reserved direction bits
    /// - `UnexpectedMessage` for combinations the server never sends
    /// - `Decode` if the body does not have the expected shape
    ///
    /// [`LeaveAcknowledged`](Self::LeaveAcknowledged) is never produced
    /// here: the server acknowledges a leave with a JOIN\|RESPONSE, which
    /// only the client's connection state can tell apart from a join reply.
    pub fn decode<C: Codec>(
        message: &Message,
        codec: &C,
    ) -> Result<Self, ProtocolError> {
        let ty = message.message_type;
        let kind = ty.kind().ok_or(ProtocolError::UnknownKind(ty.byte()))?;
        let direction = ty
            .direction()
            .filter(|d| d.is_server_to_client())
            .ok_or(ProtocolError::UnexpectedDirection(ty))?;
        let body = message.body.as_bytes();

        let event = match (kind, direction) {
            (Kind::Join, Direction::Response) => {
                let reply: JoinReply = codec.decode(body)?;
                if reply.success {
                    Self::JoinAccepted
                } else {
                    Self::JoinRejected
                }
            }
            (Kind::Join, Direction::Notify) => {
                let PlayerName { name } = codec.decode(body)?;
                Self::PlayerJoined { name }
            }
            (Kind::Leave, Direction::Notify) => {
                let PlayerName { name } = codec.decode(body)?;
                Self::PlayerLeft { name }
            }
            (Kind::Guess, Direction::Notify) => {
                let PhraseState { phrase } = codec.decode(body)?;
                Self::PhraseRevealed { phrase }
            }
            (Kind::Score, Direction::Response) => {
                Self::Scoreboard(codec.decode(body)?)
            }
            (Kind::Score, Direction::Notify) => {
                let ScoreUpdate { player, score } = codec.decode(body)?;
                Self::ScoreChanged { player, score }
            }
            (Kind::Hang, Direction::Notify) => {
                let HangUpdate { player, fails } = codec.decode(body)?;
                Self::PlayerHanged { player, fails }
            }
            (Kind::Win, Direction::Notify) => Self::Won,
            (Kind::Lose, Direction::Notify) => Self::Lost,
            _ => return Err(ProtocolError::UnexpectedMessage(ty)),
        };
        Ok(event)
    }
}
