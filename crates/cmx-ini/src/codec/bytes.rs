//! Hex encoding for byte sequences.
//!
//! Bytes are stored as lowercase hex, two digits per byte and no separators:
//! `[0x0A, 0xFF]` is stored as `0aff`.

use super::CodecError;

/// Encodes `bytes` as lowercase hex.
pub fn encode_bytes(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes a hex string produced by [`encode_bytes`].
///
/// Upper-case digits are accepted.  The empty string decodes to an empty
/// vector.
///
/// # Errors
///
/// Returns [`CodecError::InvalidHex`] for non-hex characters or an odd number
/// of digits.
pub fn decode_bytes(raw: &str) -> Result<Vec<u8>, CodecError> {
    hex::decode(raw.trim()).map_err(|_| CodecError::InvalidHex(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_single_digit_bytes() {
        assert_eq!(encode_bytes(&[0x0A, 0xFF]), "0aff");
        assert_eq!(encode_bytes(&[0x00, 0x01]), "0001");
    }

    #[test]
    fn test_decode_known_value() {
        assert_eq!(decode_bytes("0aff"), Ok(vec![0x0A, 0xFF]));
    }

    #[test]
    fn test_decode_accepts_upper_case() {
        assert_eq!(decode_bytes("0AFF"), Ok(vec![0x0A, 0xFF]));
    }

    #[test]
    fn test_empty_string_is_empty_sequence() {
        assert_eq!(encode_bytes(&[]), "");
        assert_eq!(decode_bytes(""), Ok(Vec::new()));
    }

    #[test]
    fn test_decode_rejects_non_hex_digits() {
        assert_eq!(
            decode_bytes("zz"),
            Err(CodecError::InvalidHex("zz".to_string()))
        );
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        assert!(decode_bytes("0af").is_err());
    }
}
