//! The polling game client.
//!
//! A GUI or game loop drives the client from a single task:
//!   1. `join(name)` once connected
//!   2. on every tick: `poll()` (or `poll_event()`), never waiting
//!   3. on user input: `guess(..)`, `request_scoreboard()`, ...
//!   4. on exit: `leave()` then `disconnect()`

use gallows_protocol::{
    Codec, Direction, JoinReply, JsonCodec, Kind, Message, Request,
    ServerEvent,
};
use gallows_transport::{Connection, FrameRead, Framer, TcpConnection};

use crate::config::GameClientBuilder;
use crate::{ClientError, ConnectionState, Session};

/// Result of a [`GameClient::poll`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Polled {
    /// A RESPONSE or NOTIFY message from the server.
    Message(Message),
    /// Nothing to hand out this tick.
    NothingYet,
}

/// One step of reading: a message, a dropped bad frame, or an empty socket.
enum Step<T> {
    Ready(T),
    Dropped,
    Idle,
}

/// Client side of the hangman protocol over one connection.
///
/// Owns the [`Framer`] (and through it the connection) and the
/// [`Session`]. There is no shared or global state: everything the
/// protocol needs lives here.
pub struct GameClient<C: Connection, K: Codec = JsonCodec> {
    framer: Framer<C>,
    session: Session,
    state: ConnectionState,
    codec: K,
    /// A fatal error hit by `drain_events` after it had already read some
    /// events. Returned by the next receive call.
    deferred: Option<ClientError>,
}

impl GameClient<TcpConnection> {
    /// Creates a builder.
    pub fn builder() -> GameClientBuilder {
        GameClientBuilder::new()
    }

    /// Connects to `addr` with default settings.
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        GameClientBuilder::new().server_addr(addr).connect().await
    }
}

impl<C: Connection> GameClient<C> {
    /// Wraps an open connection. The client starts in
    /// [`ConnectionState::Connected`].
    pub fn new(conn: C) -> Self {
        Self::from_framer(Framer::new(conn), JsonCodec)
    }
}

impl<C: Connection, K: Codec> GameClient<C, K> {
    /// Wraps a framer, decoding structured payloads with `codec`.
    pub fn from_framer(framer: Framer<C>, codec: K) -> Self {
        let state = if framer.is_open() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        Self {
            framer,
            session: Session::new(),
            state,
            codec,
            deferred: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// `true` until the connection has been closed.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// The local session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Shorthand for `self.session().player_name()`.
    pub fn player_name(&self) -> Option<&str> {
        self.session.player_name()
    }

    // -----------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------

    /// Asks to join the game as `name`.
    ///
    /// The name is recorded in the session immediately. Watch for
    /// [`ServerEvent::JoinAccepted`] / [`ServerEvent::JoinRejected`] to
    /// learn whether the server took it.
    pub async fn join(&mut self, name: &str) -> Result<(), ClientError> {
        self.require("join", ConnectionState::Connected)?;
        self.send(Request::Join {
            name: name.to_string(),
        })
        .await?;
        self.session.latch(name);
        self.state = ConnectionState::Joining;
        tracing::info!(name, "join requested");
        Ok(())
    }

    /// Asks to leave the game.
    pub async fn leave(&mut self) -> Result<(), ClientError> {
        self.require("leave", ConnectionState::Joined)?;
        self.send(Request::Leave).await?;
        self.state = ConnectionState::Leaving;
        tracing::info!("leave requested");
        Ok(())
    }

    /// Guesses one letter.
    pub async fn guess(&mut self, letter: char) -> Result<(), ClientError> {
        self.require("guess", ConnectionState::Joined)?;
        self.send(Request::Guess(letter)).await
    }

    /// Guesses from user-typed text, which must be exactly one character.
    ///
    /// Empty text is rejected with [`ProtocolError::InvalidGuess`]
    /// rather than being sent as a phrase request.
    ///
    /// [`ProtocolError::InvalidGuess`]: gallows_protocol::ProtocolError::InvalidGuess
    pub async fn guess_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.require("guess", ConnectionState::Joined)?;
        let request = Request::guess_from_text(text)?;
        self.send(request).await
    }

    /// Asks the server to send the current phrase.
    pub async fn request_phrase(&mut self) -> Result<(), ClientError> {
        self.require("request the phrase", ConnectionState::Joined)?;
        self.send(Request::RequestPhrase).await
    }

    /// Asks the server for the full scoreboard.
    pub async fn request_scoreboard(&mut self) -> Result<(), ClientError> {
        self.require("request the scoreboard", ConnectionState::Joined)?;
        self.send(Request::RequestScoreboard).await
    }

    fn require(
        &self,
        operation: &'static str,
        expected: ConnectionState,
    ) -> Result<(), ClientError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    async fn send(&mut self, request: Request) -> Result<(), ClientError> {
        let frame = request.to_frame();
        let ty = request.message_type();
        if let Err(e) = self.framer.send_frame(&frame).await {
            tracing::warn!(error = %e, message_type = %ty, "send failed");
            // An unframeable payload writes nothing; the connection survives.
            if !self.framer.is_open() {
                self.teardown();
            }
            return Err(e.into());
        }
        tracing::debug!(message_type = %ty, "request sent");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Receiving
    // -----------------------------------------------------------------

    /// Checks for one server message without waiting.
    ///
    /// - `Ok(Polled::Message(_))` → a RESPONSE or NOTIFY arrived
    /// - `Ok(Polled::NothingYet)` → nothing complete yet, or a bad message
    ///   was dropped (REQUEST direction, invalid UTF-8, unreadable join
    ///   reply); drops are logged with `tracing::warn!`
    /// - `Err(_)` → the connection is gone and has already been closed;
    ///   the state is [`ConnectionState::Disconnected`]
    ///
    /// A JOIN\|RESPONSE received while joining moves the state machine to
    /// `Joined` or `Rejected` before the message is returned.
    pub fn poll(&mut self) -> Result<Polled, ClientError> {
        match self.next_message()? {
            Step::Ready(message) => Ok(Polled::Message(message)),
            Step::Dropped | Step::Idle => Ok(Polled::NothingYet),
        }
    }

    fn next_message(&mut self) -> Result<Step<Message>, ClientError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        let frame = match self.framer.try_receive_frame() {
            Ok(FrameRead::Frame(frame)) => frame,
            Ok(FrameRead::NothingYet) => return Ok(Step::Idle),
            Err(e) => {
                tracing::info!(error = %e, "connection lost");
                self.teardown();
                return Err(e.into());
            }
        };

        let message = match Message::try_from(frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "dropping undecodable frame");
                return Ok(Step::Dropped);
            }
        };

        let ty = message.message_type;
        if !ty.direction().is_some_and(|d| d.is_server_to_client()) {
            tracing::warn!(message_type = %ty, "dropping message with unexpected direction");
            return Ok(Step::Dropped);
        }

        if self.state == ConnectionState::Joining
            && ty.is(Kind::Join, Direction::Response)
        {
            let reply: JoinReply = match self.codec.decode(message.body.as_bytes()) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping unreadable join reply");
                    return Ok(Step::Dropped);
                }
            };
            self.state = if reply.success {
                tracing::info!(name = ?self.session.player_name(), "joined");
                ConnectionState::Joined
            } else {
                tracing::warn!(name = ?self.session.player_name(), "join rejected");
                ConnectionState::Rejected
            };
        }

        tracing::debug!(message_type = %ty, body = %message.body, "message received");
        Ok(Step::Ready(message))
    }

    /// Like [`poll`](Self::poll), but decodes the message into a
    /// [`ServerEvent`].
    ///
    /// Returns `Ok(None)` when there is nothing to report. Messages whose
    /// payload does not decode are logged and dropped.
    pub fn poll_event(&mut self) -> Result<Option<ServerEvent>, ClientError> {
        match self.next_event()? {
            Step::Ready(event) => Ok(Some(event)),
            Step::Dropped | Step::Idle => Ok(None),
        }
    }

    /// Reads every event that has already arrived.
    ///
    /// Unlike a `while let Some(_) = poll_event()` loop, this keeps going
    /// past dropped messages, so good ones queued behind a bad one are not
    /// left for the next tick. If the connection fails after some events
    /// were read, those events are returned and the error comes from the
    /// next receive call.
    pub fn drain_events(&mut self) -> Result<Vec<ServerEvent>, ClientError> {
        let mut events = Vec::new();
        loop {
            match self.next_event() {
                Ok(Step::Ready(event)) => events.push(event),
                Ok(Step::Dropped) => {}
                Ok(Step::Idle) => return Ok(events),
                Err(e) if events.is_empty() => return Err(e),
                Err(e) => {
                    self.deferred = Some(e);
                    return Ok(events);
                }
            }
        }
    }

    fn next_event(&mut self) -> Result<Step<ServerEvent>, ClientError> {
        let leaving = self.state == ConnectionState::Leaving;
        let message = match self.next_message()? {
            Step::Ready(message) => message,
            Step::Dropped => return Ok(Step::Dropped),
            Step::Idle => return Ok(Step::Idle),
        };

        // The server answers LEAVE with a JOIN|RESPONSE carrying `{}`.
        if leaving && message.message_type.is(Kind::Join, Direction::Response) {
            return Ok(Step::Ready(ServerEvent::LeaveAcknowledged));
        }

        match ServerEvent::decode(&message, &self.codec) {
            Ok(event) => Ok(Step::Ready(event)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    message_type = %message.message_type,
                    "dropping message with bad payload"
                );
                Ok(Step::Dropped)
            }
        }
    }

    // -----------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------

    /// Shuts the connection down gracefully. Safe to call more than once.
    pub async fn disconnect(&mut self) -> Result<(), ClientError> {
        let result = self.framer.shutdown().await;
        self.teardown();
        result.map_err(ClientError::from)
    }

    /// Drops the connection immediately. Safe to call more than once.
    pub fn close(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.framer.close();
        self.deferred = None;
        if self.state != ConnectionState::Disconnected {
            tracing::debug!(from = %self.state, "disconnected");
            self.state = ConnectionState::Disconnected;
        }
    }
}
