//! OBD-II Command Engine
//!
//! Owns the single-outstanding-command invariant on top of a byte-oriented
//! transport: serializes commands, reassembles fragmented replies, runs the
//! adapter initialization handshake, and drives the periodic polling cycle.
//! Callers go through an [`EngineHandle`] whose bounded FIFO queue
//! serializes overlapping requests instead of dropping one.

mod engine;
mod error;
mod handle;
mod poller;
mod transport;

pub use engine::{CommandEngine, EngineConfig};
pub use error::EngineError;
pub use handle::{spawn, spawn_with_queue_depth, EngineHandle, DEFAULT_QUEUE_DEPTH};
pub use poller::{PollCycle, PollPhase, Poller, PollerConfig, POLL_BATTERY};
pub use transport::{MockTransport, Transport};
