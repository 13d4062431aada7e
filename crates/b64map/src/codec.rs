//! The fixed binary-to-text line encoding.
//!
//! All input and output lines use standard base64 with padding. The
//! encoding is fixed at build time; there is no runtime selection.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{PipelineError, Result};

/// Decode one assembled input line into document bytes.
///
/// `line` is the 1-based input line number, carried into the error so a
/// corrupt line can be located in the stream.
pub fn decode_line(encoded: &[u8], line: u64) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|source| PipelineError::Decode { line, source })
}

/// Encode filter output as one line, with trailing terminator.
pub fn encode_line(doc: &[u8]) -> Vec<u8> {
    let mut buf = STANDARD.encode(doc).into_bytes();
    buf.push(b'\n');
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"SGVsbG8=", 1).unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_empty_line_is_empty_document() {
        assert_eq!(decode_line(b"", 1).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_corrupt_line_reports_line_number() {
        let err = decode_line(b"not!base64", 7).unwrap_err();
        match err {
            PipelineError::Decode { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_encode_line_is_terminated() {
        assert_eq!(encode_line(b"Hello"), b"SGVsbG8=\n");
        assert_eq!(encode_line(b""), b"\n");
    }

    #[test]
    fn test_encoded_line_decodes_back() {
        let raw = b"\x00\xffbinary\n\r bytes";
        let mut line = encode_line(raw);
        assert_eq!(line.pop(), Some(b'\n'));
        assert_eq!(decode_line(&line, 1).unwrap(), raw);
    }
}
