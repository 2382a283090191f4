//! Transport Boundary
//!
//! The link layer (BLE, serial) is an external collaborator: the engine only
//! needs to write bytes and receive the inbound byte stream. Inbound bytes
//! arrive on an mpsc channel so framing always happens on the engine's own
//! task, never concurrently.

use crate::error::EngineError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Outbound half of the adapter link
pub trait Transport: Send {
    /// Write raw bytes to the adapter
    fn write(&mut self, bytes: &[u8]) -> Result<(), EngineError>;

    /// Whether an adapter is currently connected
    fn is_connected(&self) -> bool;
}

/// Scripted transport for tests: records writes and answers each one with
/// the next queued reply, delivered in the scripted fragments.
pub struct MockTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    replies: Arc<Mutex<VecDeque<Vec<Vec<u8>>>>>,
    tx: Option<mpsc::Sender<Vec<u8>>>,
    connected: bool,
}

impl MockTransport {
    /// Create a mock transport and the inbound byte channel the engine
    /// reads from.
    pub fn new() -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(32);
        (
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                replies: Arc::new(Mutex::new(VecDeque::new())),
                tx: Some(tx),
                connected: true,
            },
            rx,
        )
    }

    /// Queue a reply for the next write, split into the given fragments
    pub fn push_reply(&self, fragments: &[&[u8]]) {
        let fragments: Vec<Vec<u8>> = fragments.iter().map(|f| f.to_vec()).collect();
        self.replies.lock().unwrap().push_back(fragments);
    }

    /// Handle for inspecting the write log after the transport has been
    /// moved into an engine
    pub fn sent_log(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.sent)
    }

    /// Handle for scripting replies after the transport has been moved
    /// into an engine
    pub fn reply_script(&self) -> Arc<Mutex<VecDeque<Vec<Vec<u8>>>>> {
        Arc::clone(&self.replies)
    }

    /// Simulate the peripheral going away: the inbound stream closes once
    /// buffered fragments drain.
    pub fn drop_link(&mut self) {
        self.connected = false;
        self.tx = None;
    }

    /// Close only the inbound stream, leaving the outbound half up. Models
    /// a peripheral that accepts writes but then disconnects.
    pub fn close_inbound(&mut self) {
        self.tx = None;
    }

    /// Sender for delivering bytes outside the write/reply scripting, e.g.
    /// a reply that arrives after the exchange already timed out.
    pub fn inbound_sender(&self) -> mpsc::Sender<Vec<u8>> {
        self.tx.clone().expect("inbound stream closed")
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        if !self.connected {
            return Err(EngineError::TransportUnavailable);
        }
        self.sent.lock().unwrap().push(bytes.to_vec());

        if let Some(fragments) = self.replies.lock().unwrap().pop_front() {
            if let Some(tx) = &self.tx {
                for fragment in fragments {
                    tx.try_send(fragment)
                        .map_err(|e| EngineError::Transport(e.to_string()))?;
                }
            }
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_recorded_and_replies_delivered() {
        let (mut transport, mut rx) = MockTransport::new();
        let sent = transport.sent_log();

        transport.push_reply(&[b"OK", b">"]);
        transport.write(b"ATZ\r").unwrap();

        assert_eq!(sent.lock().unwrap().as_slice(), &[b"ATZ\r".to_vec()]);
        assert_eq!(rx.recv().await.unwrap(), b"OK".to_vec());
        assert_eq!(rx.recv().await.unwrap(), b">".to_vec());
    }

    #[tokio::test]
    async fn test_dropped_link_rejects_writes() {
        let (mut transport, mut rx) = MockTransport::new();
        transport.drop_link();
        assert_eq!(
            transport.write(b"010C\r"),
            Err(EngineError::TransportUnavailable)
        );
        assert_eq!(rx.recv().await, None);
    }
}
