//! Client configuration and builder.

use std::time::Duration;

use gallows_protocol::JsonCodec;
use gallows_transport::{
    Connection, DEFAULT_MAX_FRAME_LEN, Framer, TcpConnection,
};
use serde::{Deserialize, Serialize};

use crate::{ClientError, GameClient};

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Settings for a [`GameClient`].
///
/// Every field has a default, so a host application can load a partial
/// config (for example from a JSON file) and leave the rest alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the game server.
    pub server_addr: String,

    /// Largest frame (type byte + payload) the client will accept.
    pub max_frame_len: u32,

    /// How often a game loop should call `poll()`. The client itself never
    /// reads this; it is here so the loop and the connection share one
    /// config.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            poll_interval: Duration::from_millis(10),
        }
    }
}

// ---------------------------------------------------------------------------
// GameClientBuilder
// ---------------------------------------------------------------------------

/// Builder for connecting a [`GameClient`].
///
/// # Example
///
/// ```rust,no_run
/// use gallows::prelude::*;
///
/// # async fn run() -> Result<(), ClientError> {
/// let mut client = GameClient::builder()
///     .server_addr("127.0.0.1:8080")
///     .connect()
///     .await?;
/// client.join("Alice").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameClientBuilder {
    config: ClientConfig,
}

impl GameClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing config.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Sets the server address.
    pub fn server_addr(mut self, addr: &str) -> Self {
        self.config.server_addr = addr.to_string();
        self
    }

    /// Sets the largest frame the client will accept.
    pub fn max_frame_len(mut self, max: u32) -> Self {
        self.config.max_frame_len = max;
        self
    }

    /// Sets the suggested poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// The config built so far.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Opens a TCP connection to the configured address.
    ///
    /// # Errors
    /// `ClientError::Transport(ConnectFailed)` if the server can't be
    /// reached.
    pub async fn connect(self) -> Result<GameClient<TcpConnection>, ClientError> {
        let conn = TcpConnection::connect(&self.config.server_addr).await?;
        Ok(self.build(conn))
    }

    /// Wraps an already open connection with the configured limits.
    pub fn build<C: Connection>(self, conn: C) -> GameClient<C> {
        let framer = Framer::with_max_frame_len(conn, self.config.max_frame_len);
        GameClient::from_framer(framer, JsonCodec)
    }
}
