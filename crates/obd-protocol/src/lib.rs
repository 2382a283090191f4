//! OBD-II Protocol Implementation
//!
//! This crate provides the wire-level pieces of talking to an
//! ELM327-compatible adapter: command construction, response framing over a
//! fragmented byte stream, numeric PID decoding, and diagnostic trouble code
//! (DTC) decoding.

mod command;
mod dtc;
mod error;
mod framer;
mod hex;
mod pid;
mod reading;

pub use command::{Command, INIT_SEQUENCE};
pub use dtc::{decode_word, parse_reply as parse_dtc_reply, DtcCode, Severity};
pub use error::DecodeError;
pub use framer::ResponseFramer;
pub use hex::extract_bytes;
pub use pid::Pid;
pub use reading::Reading;

/// OBD-II mode constants
pub mod mode {
    /// Current data
    pub const CURRENT_DATA: u8 = 0x01;
    /// Diagnostic trouble codes
    pub const READ_DTC: u8 = 0x03;
    /// Clear trouble codes
    pub const CLEAR_DTC: u8 = 0x04;
}
