//! Base64 transport of PNG images for embedding in documents

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Result;

/// First eight bytes of every PNG file
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

/// Standard alphabet, padded, no line breaks
pub fn encode_png_base64(png: &[u8]) -> String {
    STANDARD.encode(png)
}

/// Decode a base64 string, tolerating embedded line breaks
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_check() {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"rest");
        assert!(is_png(&bytes));
        assert!(!is_png(b"GIF89a"));
        assert!(!is_png(&PNG_SIGNATURE[..4]));
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let encoded = encode_png_base64(&PNG_SIGNATURE);
        let wrapped = format!("{}\n{}\n", &encoded[..4], &encoded[4..]);
        assert_eq!(decode_base64(&wrapped).unwrap(), PNG_SIGNATURE.to_vec());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64("not*base64").is_err());
    }
}
