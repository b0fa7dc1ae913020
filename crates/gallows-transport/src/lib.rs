//! Transport layer for gallows.
//!
//! Owns the byte stream to the game server and turns it into whole frames:
//!
//! ```text
//! ┌──────────────┬──────────┬──────────────────────┐
//! │ length (u32) │ type (1) │ payload (length - 1) │
//! │  big-endian  │          │                      │
//! └──────────────┴──────────┴──────────────────────┘
//! ```
//!
//! - **[`Connection`]** abstracts the stream (real TCP or an in-memory mock).
//! - **[`Framer`]** writes frames and reassembles incoming ones without
//!   ever waiting for data, so a game loop can poll it every tick.
//!
//! The transport knows nothing about what the type byte means; that is the
//! protocol crate's job.
//!
//! # Feature Flags
//!
//! - `mock`: exposes [`mock::MockConnection`] for tests in other crates.

#![allow(async_fn_in_trait)]

mod error;
mod frame;
mod framer;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod tcp;

pub use error::TransportError;
pub use frame::{DEFAULT_MAX_FRAME_LEN, Frame, LENGTH_PREFIX_LEN, encode_frame};
pub use framer::{FrameRead, Framer};
pub use tcp::TcpConnection;

use std::io;

/// A single byte stream to the server.
///
/// Reads and writes deliberately have different shapes:
///
/// - [`send`](Self::send) is `async` and completes only when every byte has
///   been written. Frames are small and infrequent, so waiting is fine.
/// - [`try_read`](Self::try_read) never waits. It follows the
///   non-blocking socket convention:
///   - `Ok(n)` with `n > 0` → `n` bytes were copied into `buf`
///   - `Ok(0)` → the peer closed the stream
///   - `Err(e)` with `e.kind() == WouldBlock` → nothing available right now
pub trait Connection: 'static {
    /// Writes the whole buffer to the peer.
    async fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Performs one non-blocking read into `buf`.
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Shuts down the write half, telling the peer we are done.
    async fn shutdown(&mut self) -> io::Result<()>;
}
