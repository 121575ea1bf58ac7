//! Binary-to-text transfer encoding for frame payloads.
//!
//! Compressed frames are raw bytes, but the stream is JSON text frames, so
//! payloads travel as standard base64 (RFC 4648, with padding).  The pair
//! below is the single place both directions are defined; everything that
//! moves bytes through a text frame goes through it.
//!
//! Invariant: `decode_payload(&encode_payload(b)) == b` for every byte
//! sequence `b`, including the empty one and non-UTF8 bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Error decoding a transfer payload.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("payload is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
}

/// Encodes raw bytes for transport inside a text frame.
pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a text payload back to the original bytes.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, TransferError> {
    Ok(STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_simple_bytes() {
        let data = b"hello, desktop".to_vec();
        assert_eq!(decode_payload(&encode_payload(&data)).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_empty_input() {
        assert_eq!(encode_payload(&[]), "");
        assert_eq!(decode_payload("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_roundtrip_non_utf8_bytes() {
        let data: Vec<u8> = vec![0x00, 0xFF, 0xFE, 0x80, 0x7F, 0xC3, 0x28];
        assert_eq!(decode_payload(&encode_payload(&data)).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let data: Vec<u8> = (0u8..=255).collect();
        assert_eq!(decode_payload(&encode_payload(&data)).unwrap(), data);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(decode_payload("not base64 !!!").is_err());
    }

    #[test]
    fn test_known_vector() {
        // RFC 4648 test vector.
        assert_eq!(encode_payload(b"foobar"), "Zm9vYmFy");
    }
}
