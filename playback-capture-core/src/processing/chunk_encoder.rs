use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encode one PCM frame as RFC 4648 standard base64.
///
/// Standard alphabet with `=` padding, no line wrapping, no whitespace.
/// Pure and total on any byte sequence.
pub fn encode_chunk(frame: &[u8]) -> String {
    STANDARD.encode(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(ascii: &str) -> Vec<u8> {
        STANDARD.decode(ascii).unwrap()
    }

    #[test]
    fn known_vectors() {
        assert_eq!(encode_chunk(&[0x01, 0x02, 0x03, 0x04]), "AQIDBA==");
        assert_eq!(encode_chunk(&[0x05, 0x06]), "BQY=");
        assert_eq!(encode_chunk(&[0x07, 0x08, 0x09, 0x0A]), "BwgJCg==");
        assert_eq!(encode_chunk(&[0xFF, 0xFE]), "//4=");
    }

    #[test]
    fn empty_frame() {
        assert_eq!(encode_chunk(&[]), "");
    }

    #[test]
    fn full_buffer_round_trips() {
        let frame: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let ascii = encode_chunk(&frame);
        assert_eq!(decode(&ascii), frame);
    }

    #[test]
    fn no_line_wrapping() {
        // A 4096-byte frame encodes to well past any 76-column wrap point.
        let ascii = encode_chunk(&[0u8; 4096]);
        assert_eq!(ascii.len(), 4096 / 3 * 4 + 4);
        assert!(!ascii.contains('\n'));
        assert!(!ascii.contains('\r'));
        assert!(!ascii.contains(' '));
    }

    #[test]
    fn odd_tail_lengths_keep_padding() {
        assert_eq!(encode_chunk(&[0x00]), "AA==");
        assert_eq!(encode_chunk(&[0x00, 0x00]), "AAA=");
        assert_eq!(encode_chunk(&[0x00, 0x00, 0x00]), "AAAA");
    }
}
