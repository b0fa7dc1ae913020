//! Connection state machine and the local player's session.

use std::fmt;

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Where the client is in its connection lifecycle.
///
/// ```text
///   Disconnected ──connect──→ Connected ──join()──→ Joining
///        ↑                                         │     │
///        │                        success=true ←───┘     └──→ success=false
///        │                              ↓                        ↓
///        │                           Joined ──leave()──→ Leaving Rejected
///        │                                                  │
///        └──────────── close / disconnect / peer closed ────┘ (from any state)
/// ```
///
/// `Rejected` is terminal: the caller must give up and disconnect.
/// WIN and LOSE notifications do not move this machine; they are tracked
/// by [`GameView`](crate::GameView).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection.
    Disconnected,
    /// Connected, not yet joined.
    Connected,
    /// Join request sent, waiting for the reply.
    Joining,
    /// In the game.
    Joined,
    /// Leave request sent.
    Leaving,
    /// The server refused our name.
    Rejected,
}

impl ConnectionState {
    /// Returns `true` while a connection exists.
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }

    /// Returns `true` if guesses and scoreboard/phrase requests are allowed.
    pub fn is_in_game(&self) -> bool {
        matches!(self, Self::Joined)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Joining => write!(f, "Joining"),
            Self::Joined => write!(f, "Joined"),
            Self::Leaving => write!(f, "Leaving"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The local player's identity for the lifetime of the connection.
///
/// The name is latched the moment `join()` sends the request, before the
/// server answers. Until a successful join reply arrives it is provisional
/// (see [`ConnectionState::Joining`]), but it never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    player_name: Option<String>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The name sent with `join()`, if any.
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// `true` if `name` is the local player. Used to tell "me" apart from
    /// other players in scoreboard events.
    pub fn is_me(&self, name: &str) -> bool {
        self.player_name.as_deref() == Some(name)
    }

    /// Records the name. Later calls are ignored.
    pub(crate) fn latch(&mut self, name: &str) {
        if self.player_name.is_none() {
            self.player_name = Some(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_empty() {
        let session = Session::new();
        assert_eq!(session.player_name(), None);
        assert!(!session.is_me("Alice"));
    }

    #[test]
    fn test_session_latches_first_name_only() {
        let mut session = Session::new();
        session.latch("Alice");
        session.latch("Mallory");

        assert_eq!(session.player_name(), Some("Alice"));
        assert!(session.is_me("Alice"));
        assert!(!session.is_me("Mallory"));
    }

    #[test]
    fn test_connection_state_predicates() {
        assert!(!ConnectionState::Disconnected.is_connected());
        assert!(ConnectionState::Rejected.is_connected());
        assert!(ConnectionState::Joined.is_in_game());
        assert!(!ConnectionState::Joining.is_in_game());
        assert!(!ConnectionState::Leaving.is_in_game());
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Joining.to_string(), "Joining");
        assert_eq!(ConnectionState::Disconnected.to_string(), "Disconnected");
    }
}
