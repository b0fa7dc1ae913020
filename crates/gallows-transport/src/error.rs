/// Errors that can occur in the transport layer.
///
/// Every variant except [`PayloadTooLarge`](Self::PayloadTooLarge) is
/// fatal to the connection: once one is returned the
/// [`Framer`](crate::Framer) has already dropped its stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the TCP connection failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Writing a frame failed (broken pipe, reset, ...).
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading from the stream failed for a reason other than "no data yet".
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The peer closed the connection, possibly in the middle of a frame.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A length prefix of zero leaves no room for the type byte.
    #[error("invalid frame length: {0}")]
    InvalidLength(u32),

    /// The length prefix exceeds the configured maximum.
    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: u32, max: u32 },

    /// An outgoing payload is too long for the 32-bit length prefix.
    /// Nothing was written.
    #[error("payload too large to frame: {0} bytes")]
    PayloadTooLarge(usize),

    /// The connection has already been torn down.
    #[error("not connected")]
    NotConnected,
}

impl TransportError {
    /// Returns `true` if the peer hung up.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed(_))
    }
}
