//! Recording transport for tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::transport::Transport;

#[derive(Debug, Default)]
struct Shared {
    connected: bool,
    fail_connect: bool,
    writes: Vec<Bytes>,
    replies: VecDeque<Bytes>,
    default_reply: Bytes,
    reads: usize,
}

/// A transport that records writes and plays back queued replies.
///
/// Clones share state, so a test can keep one handle after moving another
/// into the code under test.
#[derive(Debug, Clone)]
pub(crate) struct MockTransport {
    shared: Arc<Mutex<Shared>>,
}

impl MockTransport {
    /// A transport that acknowledges everything.
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                default_reply: Bytes::from_static(b"ACK"),
                ..Shared::default()
            })),
        }
    }

    /// A transport whose `connect` fails.
    pub(crate) fn unavailable() -> Self {
        let mock = Self::new();
        mock.shared.lock().unwrap().fail_connect = true;
        mock
    }

    /// Queues the reply for the next read.
    pub(crate) fn reply(&self, data: &'static [u8]) {
        self.shared
            .lock()
            .unwrap()
            .replies
            .push_back(Bytes::from_static(data));
    }

    /// Sets the reply used once the queue is empty.
    pub(crate) fn default_reply(&self, data: &'static [u8]) {
        self.shared.lock().unwrap().default_reply = Bytes::from_static(data);
    }

    /// Everything written so far.
    pub(crate) fn writes(&self) -> Vec<Bytes> {
        self.shared.lock().unwrap().writes.clone()
    }

    /// Forgets recorded writes.
    pub(crate) fn clear_writes(&self) {
        self.shared.lock().unwrap().writes.clear();
    }

    /// Number of reads performed.
    pub(crate) fn reads(&self) -> usize {
        self.shared.lock().unwrap().reads
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut shared = self.shared.lock().unwrap();
            if shared.fail_connect {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such port",
                )));
            }
            shared.connected = true;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.shared.lock().unwrap().connected = false;
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut shared = self.shared.lock().unwrap();
            if !shared.connected {
                return Err(Error::NotConnected);
            }
            shared.writes.push(data);
            Ok(())
        })
    }

    fn read_available(&mut self) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move {
            let mut shared = self.shared.lock().unwrap();
            if !shared.connected {
                return Err(Error::NotConnected);
            }
            shared.reads += 1;
            match shared.replies.pop_front() {
                Some(reply) => Ok(reply),
                None => Ok(shared.default_reply.clone()),
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.shared.lock().unwrap().connected
    }
}
