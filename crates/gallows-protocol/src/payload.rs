//! Structured payloads sent by the server.
//!
//! Field names are part of the wire contract and must match the server
//! exactly:
//!
//! | Message          | Body                                        |
//! |------------------|---------------------------------------------|
//! | JOIN\|RESPONSE   | `{"success": 1}`                            |
//! | JOIN\|NOTIFY     | `{"name": "Alice"}`                         |
//! | LEAVE\|NOTIFY    | `{"name": "Alice"}`                         |
//! | GUESS\|NOTIFY    | `{"phrase": "H_NGM_N"}`                     |
//! | SCORE\|RESPONSE  | `[{"name": "Alice", "score": 3, "fails": 1}]` |
//! | SCORE\|NOTIFY    | `{"player": "Alice", "score": 3}`           |
//! | HANG\|NOTIFY     | `{"player": "Alice", "fails": 1}`           |
//! | WIN/LOSE\|NOTIFY | `{}`                                        |

use serde::{Deserialize, Serialize};

/// Answer to a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReply {
    /// Whether the name was accepted. The server writes `1`/`0`; `true`
    /// and `false` are accepted too.
    #[serde(with = "flag")]
    pub success: bool,
}

/// A player joining or leaving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerName {
    pub name: String,
}

/// The phrase as currently revealed, unknown letters shown as `_`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseState {
    pub phrase: String,
}

/// One player's new score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub player: String,
    pub score: u32,
}

/// One player's new fail count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HangUpdate {
    pub player: String,
    pub fails: u32,
}

/// One row of the full scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    pub name: String,
    pub score: u32,
    pub fails: u32,
}

/// Integer-or-boolean flag, written as an integer.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &bool,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(i64),
        }

        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        })
    }
}
