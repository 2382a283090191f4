//! Engine Error Types

use obd_protocol::DecodeError;
use thiserror::Error;

/// Errors that can occur while exchanging commands with an adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No adapter is connected
    #[error("no adapter connected")]
    TransportUnavailable,

    /// The adapter did not reply within the command timeout
    #[error("timeout waiting for adapter reply after {0}ms")]
    Timeout(u64),

    /// The transport went away while a command was outstanding
    #[error("transport disconnected")]
    Disconnected,

    /// An initialization directive did not get a reply
    #[error("adapter initialization failed at {directive}")]
    InitializationFailed { directive: String },

    /// The engine request queue is full
    #[error("engine request queue is full")]
    QueueFull,

    /// Transport write failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The reply arrived but could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
