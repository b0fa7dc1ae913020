//! Frame writer and non-blocking frame reassembler.
//!
//! The reassembler is a two-state machine that survives across calls:
//!
//! ```text
//!          4 prefix bytes collected
//!   Prefix ───────────────────────────→ Body { len }
//!     ↑                                     │
//!     └──────── len body bytes collected ───┘  → Frame returned
//! ```
//!
//! Each call reads only the bytes still missing for the current frame, so
//! bytes belonging to the next frame stay in the stream and at most one
//! frame comes back per call.

use std::io;

use crate::frame::{DEFAULT_MAX_FRAME_LEN, Frame, LENGTH_PREFIX_LEN};
use crate::{Connection, TransportError};

/// Result of one [`Framer::try_receive_frame`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRead {
    /// A complete frame was assembled.
    Frame(Frame),
    /// The stream has no more bytes right now. Not an error: call again
    /// on the next tick and reassembly resumes where it stopped.
    NothingYet,
}

/// Where the reassembler is inside the current frame.
#[derive(Debug)]
enum ReadState {
    /// Collecting the 4-byte length prefix.
    Prefix {
        buf: [u8; LENGTH_PREFIX_LEN],
        filled: usize,
    },
    /// Prefix done; collecting `buf.len()` bytes of type + payload.
    Body { buf: Vec<u8>, filled: usize },
}

impl Default for ReadState {
    fn default() -> Self {
        Self::Prefix {
            buf: [0; LENGTH_PREFIX_LEN],
            filled: 0,
        }
    }
}

/// Outcome of a single non-blocking read.
enum ReadStep {
    Data(usize),
    WouldBlock,
    Eof,
}

/// Owns the connection and speaks length-prefixed frames over it.
///
/// Any fatal error (write failure, peer close, corrupt length) drops the
/// connection before the error is returned. [`close`](Self::close) may be
/// called any number of times afterwards.
pub struct Framer<C: Connection> {
    conn: Option<C>,
    state: ReadState,
    max_frame_len: u32,
}

impl<C: Connection> Framer<C> {
    /// Wraps a connection using [`DEFAULT_MAX_FRAME_LEN`].
    pub fn new(conn: C) -> Self {
        Self::with_max_frame_len(conn, DEFAULT_MAX_FRAME_LEN)
    }

    /// Wraps a connection, rejecting incoming frames longer than
    /// `max_frame_len` bytes (type byte included).
    pub fn with_max_frame_len(conn: C, max_frame_len: u32) -> Self {
        Self {
            conn: Some(conn),
            state: ReadState::default(),
            max_frame_len,
        }
    }

    /// Returns `true` until the connection has been torn down.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Number of bytes of the current, still incomplete frame collected so
    /// far (prefix included).
    #[cfg(test)]
    pub(crate) fn buffered_len(&self) -> usize {
        match &self.state {
            ReadState::Prefix { filled, .. } => *filled,
            ReadState::Body { filled, .. } => LENGTH_PREFIX_LEN + *filled,
        }
    }

    /// Encodes `[1 + payload.len()][type_byte][payload]` and writes all of
    /// it, waiting until the write completes.
    ///
    /// # Errors
    /// `NotConnected` after teardown, `PayloadTooLarge` if the payload can't
    /// be framed (nothing is written, the connection stays open),
    /// `SendFailed` if the write fails (the connection is closed in that
    /// case).
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let conn = self.conn.as_mut().ok_or(TransportError::NotConnected)?;
        let bytes = frame.encode()?;
        let type_byte = frame.type_byte;

        if let Err(e) = conn.send(&bytes).await {
            tracing::warn!(error = %e, type_byte, "frame write failed");
            self.close();
            return Err(TransportError::SendFailed(e));
        }

        tracing::trace!(type_byte, len = bytes.len(), "frame sent");
        Ok(())
    }

    /// Tries to assemble one frame without waiting for the network.
    ///
    /// - `Ok(FrameRead::Frame(_))` → a whole frame is ready
    /// - `Ok(FrameRead::NothingYet)` → the stream is drained for now;
    ///   partial progress is kept for the next call
    /// - `Err(TransportError::ConnectionClosed(_))` → the peer hung up;
    ///   any partial frame is discarded
    ///
    /// A zero-byte read is always treated as closure, never as "no data".
    pub fn try_receive_frame(&mut self) -> Result<FrameRead, TransportError> {
        let result = self.advance();
        if let Err(e) = &result {
            if !matches!(e, TransportError::NotConnected) {
                tracing::debug!(error = %e, "receive failed, closing connection");
                self.close();
            }
        }
        result
    }

    fn advance(&mut self) -> Result<FrameRead, TransportError> {
        let conn = self.conn.as_mut().ok_or(TransportError::NotConnected)?;
        let max = self.max_frame_len;

        loop {
            match &mut self.state {
                ReadState::Prefix { buf, filled } => {
                    if *filled < LENGTH_PREFIX_LEN {
                        match read_some(conn, &mut buf[*filled..])? {
                            ReadStep::Data(n) => *filled += n,
                            ReadStep::WouldBlock => return Ok(FrameRead::NothingYet),
                            ReadStep::Eof => {
                                return Err(TransportError::ConnectionClosed(format!(
                                    "peer closed after {filled} of {LENGTH_PREFIX_LEN} length bytes"
                                )));
                            }
                        }
                        continue;
                    }

                    let len = u32::from_be_bytes(*buf);
                    if len == 0 {
                        return Err(TransportError::InvalidLength(len));
                    }
                    if len > max {
                        return Err(TransportError::FrameTooLarge { len, max });
                    }
                    tracing::trace!(len, "frame length read");
                    self.state = ReadState::Body {
                        buf: vec![0; len as usize],
                        filled: 0,
                    };
                }
                ReadState::Body { buf, filled } => {
                    if *filled < buf.len() {
                        match read_some(conn, &mut buf[*filled..])? {
                            ReadStep::Data(n) => *filled += n,
                            ReadStep::WouldBlock => return Ok(FrameRead::NothingYet),
                            ReadStep::Eof => {
                                return Err(TransportError::ConnectionClosed(format!(
                                    "peer closed after {filled} of {} frame bytes",
                                    buf.len()
                                )));
                            }
                        }
                        continue;
                    }

                    let mut body = std::mem::take(buf);
                    self.state = ReadState::default();
                    let payload = body.split_off(1);
                    return Ok(FrameRead::Frame(Frame {
                        type_byte: body[0],
                        payload,
                    }));
                }
            }
        }
    }

    /// Gracefully shuts the write half down, then drops the connection.
    ///
    /// Does nothing if the connection is already closed.
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        let Some(conn) = self.conn.as_mut() else {
            return Ok(());
        };
        let result = conn.shutdown().await;
        self.close();
        result.map_err(TransportError::SendFailed)
    }

    /// Drops the connection and any partial frame. Idempotent.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            drop(conn);
            self.state = ReadState::default();
            tracing::debug!("connection closed");
        }
    }
}

/// One non-blocking read, with `Interrupted` retried and peer resets
/// folded into end-of-stream.
fn read_some<C: Connection>(
    conn: &mut C,
    buf: &mut [u8],
) -> Result<ReadStep, TransportError> {
    loop {
        return match conn.try_read(buf) {
            Ok(0) => Ok(ReadStep::Eof),
            Ok(n) => Ok(ReadStep::Data(n)),
            Err(e) => match e.kind() {
                io::ErrorKind::WouldBlock => Ok(ReadStep::WouldBlock),
                io::ErrorKind::Interrupted => continue,
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => Ok(ReadStep::Eof),
                _ => Err(TransportError::ReceiveFailed(e)),
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_frame;
    use crate::mock::MockConnection;

    fn expect_frame(read: FrameRead) -> Frame {
        match read {
            FrameRead::Frame(frame) => frame,
            FrameRead::NothingYet => panic!("expected a frame, got NothingYet"),
        }
    }

    // =====================================================================
    // Sending
    // =====================================================================

    #[tokio::test]
    async fn test_send_frame_writes_prefix_type_and_payload() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);

        framer.send_frame(&Frame::new(0x01, b"Bob")).await.unwrap();

        assert_eq!(remote.written(), [0, 0, 0, 4, 0x01, b'B', b'o', b'b']);
    }

    #[tokio::test]
    async fn test_send_frame_empty_payload() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);

        framer.send_frame(&Frame::new(0x12, b"")).await.unwrap();

        assert_eq!(remote.written(), [0, 0, 0, 1, 0x12]);
    }

    #[tokio::test]
    async fn test_send_failure_closes_connection() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.fail_writes();

        let err = framer.send_frame(&Frame::new(0x02, b"")).await.unwrap_err();

        assert!(matches!(err, TransportError::SendFailed(_)));
        assert!(!framer.is_open());
        assert_eq!(remote.drop_count(), 1);
    }

    #[tokio::test]
    async fn test_send_after_close_is_not_connected() {
        let (conn, _remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        framer.close();

        let err = framer.send_frame(&Frame::new(0x02, b"")).await.unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));
    }

    // =====================================================================
    // Reassembly
    // =====================================================================

    #[test]
    fn test_receive_whole_frame_in_one_chunk() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.push(&encode_frame(0x92, b"{\"player\": \"A\", \"score\": 3}").unwrap());

        let frame = expect_frame(framer.try_receive_frame().unwrap());

        assert_eq!(frame.type_byte, 0x92);
        assert_eq!(frame.payload, b"{\"player\": \"A\", \"score\": 3}");
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_receive_nothing_available_is_not_closure() {
        let (conn, _remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);

        for _ in 0..3 {
            assert_eq!(framer.try_receive_frame().unwrap(), FrameRead::NothingYet);
        }
        assert!(framer.is_open());
    }

    #[test]
    fn test_receive_split_three_and_three() {
        // 00 00 00 02 12 7B delivered as two separate 3-byte chunks.
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);

        remote.push(&[0x00, 0x00, 0x00]);
        assert_eq!(framer.try_receive_frame().unwrap(), FrameRead::NothingYet);
        assert_eq!(framer.buffered_len(), 3);

        remote.push(&[0x02, 0x12, 0x7B]);
        let frame = expect_frame(framer.try_receive_frame().unwrap());
        assert_eq!(frame, Frame::new(0x12, vec![0x7B]));

        assert_eq!(framer.try_receive_frame().unwrap(), FrameRead::NothingYet);
    }

    #[test]
    fn test_receive_one_byte_at_a_time_matches_single_chunk() {
        let payload = "Zażółć gęślą jaźń".as_bytes();
        let bytes = encode_frame(0x91, payload).unwrap();

        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);

        let mut decoded = Vec::new();
        for byte in &bytes {
            remote.push(&[*byte]);
            if let FrameRead::Frame(frame) = framer.try_receive_frame().unwrap() {
                decoded.push(frame);
            }
        }

        assert_eq!(decoded, vec![Frame::new(0x91, payload)]);
    }

    #[test]
    fn test_receive_arbitrary_chunk_boundaries() {
        let bytes = encode_frame(0x52, b"[{\"name\": \"A\", \"score\": 1, \"fails\": 0}]").unwrap();

        for split in 1..bytes.len() {
            let (conn, remote) = MockConnection::pair();
            let mut framer = Framer::new(conn);

            remote.push(&bytes[..split]);
            assert_eq!(
                framer.try_receive_frame().unwrap(),
                FrameRead::NothingYet,
                "split at {split}"
            );
            remote.push(&bytes[split..]);
            let frame = expect_frame(framer.try_receive_frame().unwrap());
            assert_eq!(frame.encode().unwrap(), bytes, "split at {split}");
        }
    }

    #[test]
    fn test_every_type_byte_survives_the_framer() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);

        for type_byte in 0..=u8::MAX {
            let payload = format!("payload {type_byte}");
            remote.push(&encode_frame(type_byte, payload.as_bytes()).unwrap());

            let frame = expect_frame(framer.try_receive_frame().unwrap());
            assert_eq!(frame, Frame::new(type_byte, payload), "type byte {type_byte:#04x}");
        }
        assert_eq!(framer.try_receive_frame().unwrap(), FrameRead::NothingYet);
    }

    #[test]
    fn test_receive_empty_payload_frame() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.push(&[0, 0, 0, 1, 0xA1]);

        let frame = expect_frame(framer.try_receive_frame().unwrap());
        assert_eq!(frame, Frame::new(0xA1, Vec::new()));
    }

    #[test]
    fn test_receive_returns_one_frame_per_call() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        let mut both = encode_frame(0x81, b"{\"name\": \"A\"}").unwrap();
        both.extend(encode_frame(0x82, b"{\"name\": \"B\"}").unwrap());
        remote.push(&both);

        let first = expect_frame(framer.try_receive_frame().unwrap());
        let second = expect_frame(framer.try_receive_frame().unwrap());

        assert_eq!(first.type_byte, 0x81);
        assert_eq!(second.type_byte, 0x82);
        assert_eq!(framer.try_receive_frame().unwrap(), FrameRead::NothingYet);
    }

    // =====================================================================
    // Closure and corrupt input
    // =====================================================================

    #[test]
    fn test_peer_close_mid_prefix_is_connection_closed() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.push(&[0x00, 0x00]);
        remote.close();

        let err = framer.try_receive_frame().unwrap_err();

        assert!(err.is_connection_closed(), "got {err:?}");
        assert!(!framer.is_open());
    }

    #[test]
    fn test_peer_close_mid_body_discards_partial_frame() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.push(&[0, 0, 0, 5, 0x91, b'{']);
        assert_eq!(framer.try_receive_frame().unwrap(), FrameRead::NothingYet);

        remote.close();
        let err = framer.try_receive_frame().unwrap_err();

        assert!(err.is_connection_closed());
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_connection_reset_is_treated_as_closure() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.fail_next_read(io::ErrorKind::ConnectionReset);

        assert!(framer.try_receive_frame().unwrap_err().is_connection_closed());
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.fail_next_read(io::ErrorKind::Interrupted);
        remote.push(&[0, 0, 0, 1, 0xA2]);

        let frame = expect_frame(framer.try_receive_frame().unwrap());
        assert_eq!(frame.type_byte, 0xA2);
    }

    #[test]
    fn test_other_read_errors_are_receive_failed() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.fail_next_read(io::ErrorKind::PermissionDenied);

        let err = framer.try_receive_frame().unwrap_err();
        assert!(matches!(err, TransportError::ReceiveFailed(_)));
        assert!(!framer.is_open());
    }

    #[test]
    fn test_zero_length_prefix_is_rejected() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.push(&[0, 0, 0, 0]);

        let err = framer.try_receive_frame().unwrap_err();
        assert!(matches!(err, TransportError::InvalidLength(0)));
        assert!(!framer.is_open());
    }

    #[test]
    fn test_oversized_prefix_is_rejected() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::with_max_frame_len(conn, 16);
        remote.push(&17u32.to_be_bytes());

        let err = framer.try_receive_frame().unwrap_err();
        assert!(matches!(
            err,
            TransportError::FrameTooLarge { len: 17, max: 16 }
        ));
    }

    #[test]
    fn test_receive_after_close_is_not_connected() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.close();
        assert!(framer.try_receive_frame().unwrap_err().is_connection_closed());

        let err = framer.try_receive_frame().unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));
    }

    // =====================================================================
    // Teardown
    // =====================================================================

    #[test]
    fn test_close_twice_releases_once() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);
        remote.close();
        let _ = framer.try_receive_frame();

        framer.close();
        framer.close();

        assert_eq!(remote.drop_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_half_closes_then_drops() {
        let (conn, remote) = MockConnection::pair();
        let mut framer = Framer::new(conn);

        framer.shutdown().await.unwrap();
        framer.shutdown().await.unwrap();

        assert_eq!(remote.shutdown_count(), 1);
        assert_eq!(remote.drop_count(), 1);
        assert!(!framer.is_open());
    }
}
