//! OBD-II and ELM327 Command Construction
//!
//! Commands are short ASCII strings: a two-character mode plus PID bytes for
//! vehicle queries, or an `AT` directive for adapter configuration. The wire
//! form is the text followed by a carriage return.

use crate::mode;
use serde::{Deserialize, Serialize};

/// ELM327 initialization handshake, in send order. Each directive must get
/// a reply before the next is sent.
pub const INIT_SEQUENCE: [&str; 6] = [
    "ATZ",  // Reset
    "ATE0", // Echo off
    "ATL0", // Linefeeds off
    "ATS0", // Spaces off
    "ATH0", // Headers off
    "ATSP0", // Auto protocol
];

/// A single command for the adapter, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    text: String,
}

impl Command {
    /// Mode 01 query for a single PID
    pub fn pid_query(pid: u8) -> Self {
        Self {
            text: format!("{:02X}{:02X}", mode::CURRENT_DATA, pid),
        }
    }

    /// Mode 03: read stored diagnostic trouble codes
    pub fn read_dtcs() -> Self {
        Self {
            text: format!("{:02X}", mode::READ_DTC),
        }
    }

    /// Mode 04: clear diagnostic trouble codes
    pub fn clear_dtcs() -> Self {
        Self {
            text: format!("{:02X}", mode::CLEAR_DTC),
        }
    }

    /// Adapter configuration directive, e.g. `ATE0`
    pub fn at(directive: &str) -> Self {
        Self {
            text: directive.to_string(),
        }
    }

    /// The command text without the terminator
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this is an adapter configuration directive rather than a
    /// vehicle query
    pub fn is_at(&self) -> bool {
        self.text.starts_with("AT")
    }

    /// The bytes to put on the wire: ASCII text plus `\r`
    pub fn wire_bytes(&self) -> Vec<u8> {
        let mut bytes = self.text.as_bytes().to_vec();
        bytes.push(b'\r');
        bytes
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_query_text() {
        assert_eq!(Command::pid_query(0x0C).text(), "010C");
        assert_eq!(Command::pid_query(0x2F).text(), "012F");
    }

    #[test]
    fn test_dtc_commands() {
        assert_eq!(Command::read_dtcs().text(), "03");
        assert_eq!(Command::clear_dtcs().text(), "04");
    }

    #[test]
    fn test_wire_bytes_terminated() {
        assert_eq!(Command::at("ATZ").wire_bytes(), b"ATZ\r".to_vec());
    }

    #[test]
    fn test_at_detection() {
        assert!(Command::at("ATE0").is_at());
        assert!(!Command::pid_query(0x0D).is_at());
    }

    #[test]
    fn test_init_sequence_order() {
        assert_eq!(
            INIT_SEQUENCE,
            ["ATZ", "ATE0", "ATL0", "ATS0", "ATH0", "ATSP0"]
        );
    }
}
