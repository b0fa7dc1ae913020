//! Unified error type for the gallows client.

use gallows_protocol::ProtocolError;
use gallows_transport::TransportError;

use crate::ConnectionState;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
///
/// Only [`Transport`](Self::Transport) errors mean the connection is gone.
/// [`GameClient::poll`](crate::GameClient::poll) never returns
/// [`Protocol`](Self::Protocol): malformed server messages are logged and
/// dropped there.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connect, send, receive, peer closed).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (invalid guess text, bad payload).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The operation is not allowed in the current connection state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: ConnectionState,
    },
}

impl ClientError {
    /// Returns `true` if the server closed the connection.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connection_closed())
    }
}
