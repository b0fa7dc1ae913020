//! In-memory [`Connection`] for deterministic tests.
//!
//! A real socket decides on its own how incoming bytes are chunked. The
//! mock lets a test decide instead: every [`MockRemote::push`] is one
//! "delivery", and a single read never crosses from one delivery into the
//! next. When no deliveries are queued, reads report `WouldBlock`.
//!
//! ```rust,ignore
//! use gallows_transport::mock::MockConnection;
//! use gallows_transport::{FrameRead, Framer};
//!
//! let (conn, remote) = MockConnection::pair();
//! let mut framer = Framer::new(conn);
//!
//! remote.push(&[0, 0, 0]);
//! assert_eq!(framer.try_receive_frame().unwrap(), FrameRead::NothingYet);
//! ```

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::Connection;

#[derive(Debug)]
enum Delivery {
    Data(Vec<u8>),
    Error(io::ErrorKind),
    Eof,
}

#[derive(Debug, Default)]
struct Shared {
    incoming: VecDeque<Delivery>,
    written: Vec<u8>,
    fail_writes: bool,
    shutdowns: usize,
    drops: usize,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // A panicking test must not hide its own failure behind a poisoned lock.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The local end, handed to a [`Framer`](crate::Framer).
#[derive(Debug)]
pub struct MockConnection {
    shared: Arc<Mutex<Shared>>,
}

/// The test's end: feeds bytes in and inspects what was written.
#[derive(Debug, Clone)]
pub struct MockRemote {
    shared: Arc<Mutex<Shared>>,
}

impl MockConnection {
    /// Creates a connected pair.
    pub fn pair() -> (MockConnection, MockRemote) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            MockConnection {
                shared: Arc::clone(&shared),
            },
            MockRemote { shared },
        )
    }
}

impl Connection for MockConnection {
    async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let mut shared = lock(&self.shared);
        if shared.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
        }
        shared.written.extend_from_slice(data);
        Ok(())
    }

    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut shared = lock(&self.shared);
        match shared.incoming.front_mut() {
            None => Err(io::ErrorKind::WouldBlock.into()),
            Some(Delivery::Eof) => Ok(0),
            Some(Delivery::Error(kind)) => {
                let kind = *kind;
                shared.incoming.pop_front();
                Err(kind.into())
            }
            Some(Delivery::Data(data)) => {
                let n = buf.len().min(data.len());
                buf[..n].copy_from_slice(&data[..n]);
                data.drain(..n);
                if data.is_empty() {
                    shared.incoming.pop_front();
                }
                Ok(n)
            }
        }
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        lock(&self.shared).shutdowns += 1;
        Ok(())
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        lock(&self.shared).drops += 1;
    }
}

impl MockRemote {
    /// Queues one delivery of bytes. Empty slices are ignored since a real
    /// stream never delivers zero bytes.
    pub fn push(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        lock(&self.shared)
            .incoming
            .push_back(Delivery::Data(bytes.to_vec()));
    }

    /// Closes the remote end once the queued deliveries are consumed.
    pub fn close(&self) {
        lock(&self.shared).incoming.push_back(Delivery::Eof);
    }

    /// Makes the next read (after queued data) fail with `kind`.
    pub fn fail_next_read(&self, kind: io::ErrorKind) {
        lock(&self.shared)
            .incoming
            .push_back(Delivery::Error(kind));
    }

    /// Makes every subsequent write fail with `BrokenPipe`.
    pub fn fail_writes(&self) {
        lock(&self.shared).fail_writes = true;
    }

    /// All bytes written by the local end so far.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.shared).written.clone()
    }

    /// Forgets the bytes written so far.
    pub fn clear_written(&self) {
        lock(&self.shared).written.clear();
    }

    /// How many times the local end called `shutdown`.
    pub fn shutdown_count(&self) -> usize {
        lock(&self.shared).shutdowns
    }

    /// How many times the local end was dropped (0 or 1).
    pub fn drop_count(&self) -> usize {
        lock(&self.shared).drops
    }
}
