//! Diagnostic Trouble Code Decoding
//!
//! Mode 03 replies carry DTCs as fixed-width 16-bit words. Bits 15-14 select
//! the code category prefix and the low twelve bits render as three hex
//! digits. The source decoder discards bits 13-12 of the word; that behavior
//! is preserved here rather than second-guessed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Severity classification for a trouble code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

/// A decoded diagnostic trouble code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtcCode {
    /// Five-character code such as "P0300"
    pub code: String,
    /// Human-readable description
    pub description: String,
    /// Severity from the known-code table, `Minor` for unknown codes
    pub severity: Severity,
    /// When the code was decoded
    pub timestamp: DateTime<Utc>,
}

/// Codes this system recognizes, with description and severity
const KNOWN_CODES: [(&str, &str, Severity); 8] = [
    ("P0300", "Random/multiple cylinder misfire detected", Severity::Major),
    ("P0420", "Catalyst system efficiency below threshold (Bank 1)", Severity::Major),
    ("P0171", "System too lean (Bank 1)", Severity::Major),
    ("P0172", "System too rich (Bank 1)", Severity::Major),
    ("P0401", "Insufficient EGR flow detected", Severity::Minor),
    ("P0442", "Evaporative emission system small leak detected", Severity::Minor),
    ("P0128", "Coolant temperature below thermostat regulating temperature", Severity::Minor),
    ("P0133", "O2 sensor slow response (Bank 1, Sensor 1)", Severity::Minor),
];

impl DtcCode {
    /// Build a code, filling description and severity from the known-code
    /// table. Unrecognized codes get a generic description and `Minor`.
    pub fn from_code(code: &str) -> Self {
        let (description, severity) = match KNOWN_CODES.iter().find(|(c, _, _)| *c == code) {
            Some((_, description, severity)) => (description.to_string(), *severity),
            None => ("Unknown trouble code".to_string(), Severity::Minor),
        };

        Self {
            code: code.to_string(),
            description,
            severity,
            timestamp: Utc::now(),
        }
    }
}

/// Decode one 16-bit DTC word into its five-character code.
///
/// `0x0000` means "no code" and yields `None`. Bits 13-12 of the word are
/// not used in the rendered code.
pub fn decode_word(word: u16) -> Option<String> {
    if word == 0 {
        return None;
    }

    let prefix = match (word >> 14) & 0x03 {
        0 => "P0",
        1 => "P1",
        2 => "P2",
        3 => "P3",
        _ => "P0",
    };

    let third = (word >> 8) & 0x0F;
    let fourth = (word >> 4) & 0x0F;
    let fifth = word & 0x0F;

    Some(format!("{}{:X}{:X}{:X}", prefix, third, fourth, fifth))
}

/// Parse a cleaned Mode 03 reply into zero or more trouble codes.
///
/// Spaces are removed and a leading `43` mode echo is discarded when
/// present; the remaining text splits into 4-hex-digit words in order.
/// Malformed or all-zero words are skipped, not reported.
pub fn parse_reply(reply: &str) -> Vec<DtcCode> {
    let mut cleaned: String = reply.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() > 2 && cleaned.starts_with("43") && cleaned.len() % 4 == 2 {
        cleaned.drain(..2);
    }

    let chars: Vec<char> = cleaned.chars().collect();
    let mut codes = Vec::new();

    for group in chars.chunks(4) {
        if group.len() != 4 {
            continue;
        }
        let word_text: String = group.iter().collect();
        let Ok(word) = u16::from_str_radix(&word_text, 16) else {
            debug!("skipping malformed DTC word {:?}", word_text);
            continue;
        };
        if let Some(code) = decode_word(word) {
            codes.push(DtcCode::from_code(&code));
        }
    }

    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_word_basic() {
        assert_eq!(decode_word(0x0300).as_deref(), Some("P0300"));
        assert_eq!(decode_word(0x0420).as_deref(), Some("P0420"));
    }

    #[test]
    fn test_decode_word_prefix_bits() {
        assert_eq!(decode_word(0x4123).as_deref(), Some("P1123"));
        assert_eq!(decode_word(0x8123).as_deref(), Some("P2123"));
        assert_eq!(decode_word(0xC123).as_deref(), Some("P3123"));
    }

    #[test]
    fn test_decode_word_zero_is_none() {
        assert_eq!(decode_word(0x0000), None);
    }

    #[test]
    fn test_parse_reply_order_preserved() {
        let codes = parse_reply("0300 0420");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].code, "P0300");
        assert_eq!(codes[1].code, "P0420");
    }

    #[test]
    fn test_parse_reply_skips_zero_words() {
        let codes = parse_reply("0300 0000");
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].code, "P0300");
    }

    #[test]
    fn test_parse_reply_strips_mode_echo() {
        let codes = parse_reply("43 03 00 04 20");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].code, "P0300");
        assert_eq!(codes[1].code, "P0420");
    }

    #[test]
    fn test_parse_reply_skips_malformed_word() {
        let codes = parse_reply("ZZZZ0300");
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].code, "P0300");
    }

    #[test]
    fn test_parse_reply_empty() {
        assert!(parse_reply("").is_empty());
    }

    #[test]
    fn test_known_code_lookup() {
        let code = DtcCode::from_code("P0300");
        assert_eq!(code.severity, Severity::Major);
        assert!(!code.description.is_empty());
        assert_ne!(code.description, "Unknown trouble code");
    }

    #[test]
    fn test_unknown_code_lookup() {
        let code = DtcCode::from_code("P3FFF");
        assert_eq!(code.severity, Severity::Minor);
        assert_eq!(code.description, "Unknown trouble code");
    }
}
