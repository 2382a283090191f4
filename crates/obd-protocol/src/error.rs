//! Decode Error Types

use thiserror::Error;

/// Errors that can occur while decoding an adapter reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer payload bytes than the PID formula requires
    #[error("short buffer: need {needed} bytes, got {got}")]
    ShortBuffer { needed: usize, got: usize },

    /// A two-character group in the reply was not valid hexadecimal
    #[error("invalid hex pair: {0:?}")]
    BadHex(String),

    /// The cleaned reply contained no payload at all
    #[error("empty reply")]
    EmptyReply,
}
