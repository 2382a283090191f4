//! Adapter Response Framing
//!
//! The transport delivers reply bytes in arbitrary fragments. The framer
//! accumulates them until the buffered text contains an ELM327 prompt (`>`)
//! or a carriage return, then returns the cleaned reply and clears itself.
//! The engine guarantees exactly one command is in flight, so a frame never
//! spans two commands.

use tracing::warn;

/// Incremental framer for ELM327 replies
#[derive(Debug, Default)]
pub struct ResponseFramer {
    buf: Vec<u8>,
}

impl ResponseFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed received bytes. Returns the cleaned reply text once a
    /// terminator has arrived, `None` while the frame is still incomplete.
    ///
    /// A chunk that is not ASCII is dropped without surfacing an error;
    /// the adapter speaks pure ASCII and anything else is line noise.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<String> {
        if !bytes.is_ascii() {
            warn!("dropping {} non-ASCII bytes from adapter", bytes.len());
            return None;
        }
        self.buf.extend_from_slice(bytes);

        // ASCII by construction, so the buffer always converts.
        let text = String::from_utf8_lossy(&self.buf);
        if !text.contains('>') && !text.contains('\r') {
            return None;
        }

        let cleaned = text
            .replace('>', "")
            .replace('\r', "")
            .replace('\n', "")
            .trim()
            .to_string();
        self.buf.clear();
        Some(cleaned)
    }

    /// Discard any partially accumulated frame (used on disconnect)
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Whether bytes are currently buffered
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
