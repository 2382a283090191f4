//! OBD-II PID Definitions and Response Decoding
//!
//! Defines the Mode 01 Parameter IDs this system polls and their decoding
//! formulas over the raw payload bytes.

use crate::command::Command;
use crate::error::DecodeError;
use crate::hex::extract_bytes;
use serde::{Deserialize, Serialize};

/// Standard OBD-II PIDs for Mode 01 (current data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Pid {
    /// Engine RPM (0x0C)
    Rpm = 0x0C,
    /// Vehicle speed (0x0D)
    Speed = 0x0D,
    /// Engine coolant temperature (0x05)
    CoolantTemp = 0x05,
    /// Fuel tank level (0x2F)
    FuelLevel = 0x2F,
    /// Throttle position (0x11)
    ThrottlePosition = 0x11,
    /// Calculated engine load (0x04)
    EngineLoad = 0x04,
    /// Mass air flow rate (0x10)
    Maf = 0x10,
}

impl Pid {
    /// Get the PID hex value
    pub fn as_hex(&self) -> u8 {
        *self as u8
    }

    /// The Mode 01 request command for this PID
    pub fn request(&self) -> Command {
        Command::pid_query(self.as_hex())
    }

    /// Number of payload bytes the decode formula consumes
    pub fn response_bytes(&self) -> usize {
        match self {
            Pid::Rpm | Pid::Maf => 2,
            _ => 1,
        }
    }

    /// Decode raw payload bytes (mode/PID echo already removed) into the
    /// physical value for this PID.
    pub fn decode(&self, bytes: &[u8]) -> Result<f64, DecodeError> {
        let needed = self.response_bytes();
        if bytes.len() < needed {
            return Err(DecodeError::ShortBuffer {
                needed,
                got: bytes.len(),
            });
        }

        let value = match self {
            // RPM: ((A*256)+B)/4, reported as a whole rev/min
            Pid::Rpm => (f64::from(bytes[0]) * 256.0 + f64::from(bytes[1])) / 4.0,
            // Speed: A (km/h)
            Pid::Speed => f64::from(bytes[0]),
            // Coolant temp: A - 40 (°C, may go negative)
            Pid::CoolantTemp => f64::from(bytes[0]) - 40.0,
            // Fuel level / throttle / load: A * 100 / 255 (%)
            Pid::FuelLevel | Pid::ThrottlePosition | Pid::EngineLoad => {
                f64::from(bytes[0]) * 100.0 / 255.0
            }
            // MAF: ((A*256)+B) / 100 (g/s)
            Pid::Maf => (f64::from(bytes[0]) * 256.0 + f64::from(bytes[1])) / 100.0,
        };

        Ok(value)
    }

    /// Decode a cleaned reply string for this PID.
    ///
    /// Extracts hex pairs, discards a leading `41 <pid>` mode/PID echo when
    /// the adapter includes one, then applies the decode formula.
    pub fn decode_reply(&self, reply: &str) -> Result<f64, DecodeError> {
        let bytes = extract_bytes(reply)?;
        if bytes.is_empty() {
            return Err(DecodeError::EmptyReply);
        }

        let payload = match bytes.as_slice() {
            [0x41, pid, rest @ ..] if *pid == self.as_hex() => rest,
            other => other,
        };

        self.decode(payload)
    }
}
