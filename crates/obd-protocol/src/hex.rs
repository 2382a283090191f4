//! Hex Payload Extraction
//!
//! Adapter replies are ASCII hex pairs, optionally space-separated when the
//! adapter was not configured with ATS0.

use crate::error::DecodeError;

/// Extract payload bytes from a cleaned reply string.
///
/// Spaces are removed, then the text is scanned two characters at a time.
/// A trailing odd character is dropped. A pair that is not valid
/// hexadecimal fails the whole extraction.
pub fn extract_bytes(text: &str) -> Result<Vec<u8>, DecodeError> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let mut bytes = Vec::with_capacity(cleaned.len() / 2);
    let chars: Vec<char> = cleaned.chars().collect();
    for pair in chars.chunks_exact(2) {
        let group: String = pair.iter().collect();
        let byte = u8::from_str_radix(&group, 16)
            .map_err(|_| DecodeError::BadHex(group.clone()))?;
        bytes.push(byte);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_spaced_pairs() {
        assert_eq!(extract_bytes("41 0C 1F 40").unwrap(), vec![0x41, 0x0C, 0x1F, 0x40]);
    }

    #[test]
    fn test_extract_unspaced_pairs() {
        assert_eq!(extract_bytes("410C1F40").unwrap(), vec![0x41, 0x0C, 0x1F, 0x40]);
    }

    #[test]
    fn test_trailing_odd_char_dropped() {
        assert_eq!(extract_bytes("410C1").unwrap(), vec![0x41, 0x0C]);
    }

    #[test]
    fn test_bad_pair_is_error() {
        assert_eq!(
            extract_bytes("41ZZ"),
            Err(DecodeError::BadHex("ZZ".to_string()))
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_bytes("").unwrap(), Vec::<u8>::new());
    }
}
