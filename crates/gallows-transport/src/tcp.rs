//! TCP connection using `tokio::net::TcpStream`.

use std::io;
use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::{Connection, TransportError};

/// A [`Connection`] over a real TCP socket.
///
/// Reads go through [`TcpStream::try_read`], which never waits: it
/// returns whatever the socket has already received, or `WouldBlock`.
/// Readiness is updated by the Tokio I/O driver, so the caller's loop must
/// yield to the runtime between polls (a `tokio::time::interval` tick is
/// enough).
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpConnection {
    /// Opens a connection to `addr` (for example `"127.0.0.1:8080"`).
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        let conn = Self::from_stream(stream)?;
        tracing::info!(peer = %conn.peer, "connected to game server");
        Ok(conn)
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        // Frames are a handful of bytes; don't let Nagle hold them back.
        stream
            .set_nodelay(true)
            .map_err(TransportError::ConnectFailed)?;
        let peer = stream.peer_addr().map_err(TransportError::ConnectFailed)?;
        Ok(Self { stream, peer })
    }
}

impl Connection for TcpConnection {
    async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data).await
    }

    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}
