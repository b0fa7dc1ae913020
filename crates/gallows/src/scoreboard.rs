//! Scoreboard and game view.
//!
//! [`GameView`] is the one place the client's picture of the game lives.
//! It only changes through [`GameView::apply`], fed with the events
//! returned by [`GameClient::poll_event`](crate::GameClient::poll_event).

use std::collections::BTreeMap;

use gallows_protocol::{ScoreboardEntry, ServerEvent};

use crate::Session;

// ---------------------------------------------------------------------------
// Scoreboard
// ---------------------------------------------------------------------------

/// One player's row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standing {
    pub score: u32,
    pub fails: u32,
}

/// Player name → standing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    players: BTreeMap<String, Standing>,
}

impl Scoreboard {
    /// Creates an empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.contains_key(name)
    }

    /// The standing of `name`, if known.
    pub fn get(&self, name: &str) -> Option<Standing> {
        self.players.get(name).copied()
    }

    /// All players, best first: score descending, then fails ascending,
    /// then name.
    pub fn ranked(&self) -> Vec<(&str, Standing)> {
        let mut rows: Vec<_> = self
            .players
            .iter()
            .map(|(name, standing)| (name.as_str(), *standing))
            .collect();
        rows.sort_by(|(a_name, a), (b_name, b)| {
            b.score
                .cmp(&a.score)
                .then(a.fails.cmp(&b.fails))
                .then(a_name.cmp(b_name))
        });
        rows
    }

    /// Everyone except the session's own player, in
    /// [`ranked`](Self::ranked) order.
    pub fn others(&self, session: &Session) -> Vec<(&str, Standing)> {
        self.ranked()
            .into_iter()
            .filter(|(name, _)| !session.is_me(name))
            .collect()
    }

    fn replace(&mut self, entries: &[ScoreboardEntry]) {
        self.players = entries
            .iter()
            .map(|e| {
                (
                    e.name.clone(),
                    Standing {
                        score: e.score,
                        fails: e.fails,
                    },
                )
            })
            .collect();
    }
}

// ---------------------------------------------------------------------------
// GameView
// ---------------------------------------------------------------------------

/// How the game ended for the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// The client's picture of the game: scoreboard, phrase, and outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameView {
    scoreboard: Scoreboard,
    phrase: Option<String>,
    outcome: Option<Outcome>,
}

impl GameView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one server event into the view.
    ///
    /// Returns `true` if anything visible changed. Updates for players the
    /// view doesn't know about are ignored; a full
    /// [`ServerEvent::Scoreboard`] brings it back in sync.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::Scoreboard(entries) => {
                self.scoreboard.replace(entries);
                true
            }
            ServerEvent::PlayerJoined { name } => {
                self.scoreboard
                    .players
                    .insert(name.clone(), Standing::default());
                true
            }
            ServerEvent::PlayerLeft { name } => {
                self.scoreboard.players.remove(name).is_some()
            }
            ServerEvent::ScoreChanged { player, score } => {
                match self.scoreboard.players.get_mut(player) {
                    Some(standing) => {
                        standing.score = *score;
                        true
                    }
                    None => {
                        tracing::debug!(player = %player, "score update for unknown player");
                        false
                    }
                }
            }
            ServerEvent::PlayerHanged { player, fails } => {
                match self.scoreboard.players.get_mut(player) {
                    Some(standing) => {
                        standing.fails = *fails;
                        true
                    }
                    None => {
                        tracing::debug!(player = %player, "hang update for unknown player");
                        false
                    }
                }
            }
            ServerEvent::PhraseRevealed { phrase } => {
                self.phrase = Some(phrase.clone());
                true
            }
            ServerEvent::Won => self.latch(Outcome::Won),
            ServerEvent::Lost => self.latch(Outcome::Lost),
            ServerEvent::JoinAccepted
            | ServerEvent::JoinRejected
            | ServerEvent::LeaveAcknowledged => false,
        }
    }

    fn latch(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// The last phrase the server sent, with `_` for hidden letters.
    pub fn phrase(&self) -> Option<&str> {
        self.phrase.as_deref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// `true` until the local player has won or lost.
    pub fn can_guess(&self) -> bool {
        self.outcome.is_none()
    }
}
