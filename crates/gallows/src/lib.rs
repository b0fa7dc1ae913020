//! # Gallows
//!
//! Client for a multiplayer hangman server.
//!
//! Gallows speaks the game's framed TCP protocol and keeps track of the
//! session, so a game loop or GUI only has to call [`GameClient::poll`]
//! once per tick and send requests when the player does something.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gallows::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let mut client = GameClient::connect("127.0.0.1:8080").await?;
//! client.join("Alice").await?;
//!
//! let mut view = GameView::new();
//! let mut tick = tokio::time::interval(std::time::Duration::from_millis(10));
//! loop {
//!     tick.tick().await;
//!     while let Some(event) = client.poll_event()? {
//!         view.apply(&event);
//!     }
//!     if view.outcome().is_some() {
//!         break;
//!     }
//! }
//! client.leave().await?;
//! client.disconnect().await
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! gallows-transport (Framer)  →  gallows-protocol (Message / ServerEvent)
//!                                     →  gallows (GameClient, GameView)
//! ```

mod client;
mod config;
mod error;
mod scoreboard;
mod session;

pub use client::{GameClient, Polled};
pub use config::{ClientConfig, GameClientBuilder};
pub use error::ClientError;
pub use scoreboard::{GameView, Outcome, Scoreboard, Standing};
pub use session::{ConnectionState, Session};

pub use gallows_protocol as protocol;
pub use gallows_transport as transport;

/// Convenience re-exports for common usage.
///
/// ```rust
/// use gallows::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientError, ConnectionState, GameClient, GameView,
        Outcome, Polled, Session,
    };
    pub use gallows_protocol::{Message, Request, ServerEvent};
    pub use gallows_transport::{Connection, TcpConnection};
}
