//! RSP wire grammar: framing, checksums, hex sub-grammar helpers.
//!
//! Every command and reply travels in one frame:
//!
//! ```text
//! ┌─────┬─────────────┬─────┬────────────┐
//! │ '$' │   payload   │ '#' │ checksum   │
//! │     │  (opaque)   │     │ 2 hex dig. │
//! └─────┴─────────────┴─────┴────────────┘
//! ```
//!
//! The checksum is the sum of the payload bytes mod 256, rendered as two
//! lowercase hex digits. Payloads are opaque byte sequences; the first `#`
//! after the leading `$` always terminates the payload.
//!
//! Outside frame syntax the protocol uses three raw bytes: `+` (ack),
//! `-` (request retransmit) and `0x03` (break-in).

/// Maximum frame payload advertised to the client (`PacketSize`).
pub const PACKET_SIZE: usize = 4096;

/// Transmission ceiling for one packet under the ack handshake.
pub const MAX_ATTEMPTS: usize = 3;

/// Positive acknowledgment byte.
pub const ACK: u8 = b'+';

/// Negative acknowledgment byte (request retransmit).
pub const NACK: u8 = b'-';

/// Break-in byte, sent by the client outside frame syntax.
pub const INTERRUPT: u8 = 0x03;

/// Frame start marker.
pub const PACKET_START: u8 = b'$';

/// Frame payload terminator, followed by the two checksum digits.
pub const PACKET_END: u8 = b'#';

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Computes the RSP checksum: sum of the payload bytes mod 256.
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// Encodes a payload into a complete `$<payload>#<cc>` frame.
///
/// Never fails and is deterministic; the checksum is recomputed on every
/// call.
///
/// # Example
///
/// ```
/// use rspstub::protocol::wire;
///
/// assert_eq!(wire::encode(b"?"), b"$?#3f");
/// assert_eq!(wire::encode(b""), b"$#00");
/// ```
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 4);
    frame.push(PACKET_START);
    frame.extend_from_slice(payload);
    frame.push(PACKET_END);
    frame.extend_from_slice(&hex_encode(&[checksum(payload)]));
    frame
}

/// Outcome of [`decode`].
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// A complete frame. `consumed` is the total frame length including
    /// `$`, `#` and the checksum digits; `checksum` is the transmitted
    /// value, not yet verified against the payload.
    Packet {
        payload: &'a [u8],
        checksum: u8,
        consumed: usize,
    },
    /// No complete frame yet; wait for more bytes.
    NeedMoreData,
    /// The terminator was found but the checksum field is not hex.
    Malformed,
}

/// Decodes the frame at the front of `buf`, if one is complete.
///
/// The payload runs from the leading `$` to the first `#`; the two bytes
/// after `#` are the checksum digits (either case accepted). A buffer that
/// does not yet hold all of that yields [`Decoded::NeedMoreData`] — never
/// an error, the caller simply waits for the next read.
pub fn decode(buf: &[u8]) -> Decoded<'_> {
    match buf.first() {
        Some(&PACKET_START) => {}
        _ => return Decoded::NeedMoreData,
    }
    let Some(end) = buf.iter().position(|&b| b == PACKET_END) else {
        return Decoded::NeedMoreData;
    };
    if buf.len() < end + 3 {
        return Decoded::NeedMoreData;
    }
    match (hex_digit(buf[end + 1]), hex_digit(buf[end + 2])) {
        (Some(hi), Some(lo)) => Decoded::Packet {
            payload: &buf[1..end],
            checksum: (hi << 4) | lo,
            consumed: end + 3,
        },
        _ => Decoded::Malformed,
    }
}

/// Checks a transmitted checksum against the payload it came with.
///
/// A mismatch is a recoverable condition (the receiver nacks and waits for
/// a retransmission), never a fatal error.
#[inline]
pub fn verify(payload: &[u8], transmitted: u8) -> bool {
    checksum(payload) == transmitted
}

/// Renders a byte slice as lowercase ASCII hex.
pub fn hex_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for &byte in data {
        out.push(HEX_DIGITS[(byte >> 4) as usize]);
        out.push(HEX_DIGITS[(byte & 0x0f) as usize]);
    }
    out
}

/// Parses an ASCII hex field (no prefix, either case) into a `u64`.
///
/// Returns `None` on an empty field, a non-hex byte, or overflow.
pub fn parse_hex(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for &byte in digits {
        let digit = hex_digit(byte)?;
        value = value.checked_mul(16)?.checked_add(u64::from(digit))?;
    }
    Some(value)
}

#[inline]
fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_mod_256_sum() {
        assert_eq!(checksum(b""), 0x00);
        assert_eq!(checksum(b"?"), 0x3f);
        assert_eq!(checksum(b"S05"), 0xb8);
        // 0x80 * 4 wraps around
        assert_eq!(checksum(&[0x80, 0x80, 0x80, 0x80]), 0x00);
    }

    #[test]
    fn test_encode_known_frames() {
        assert_eq!(encode(b"?"), b"$?#3f");
        assert_eq!(encode(b"S05"), b"$S05#b8");
        assert_eq!(encode(b""), b"$#00");
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(encode(b"qSupported"), encode(b"qSupported"));
    }

    #[test]
    fn test_decode_roundtrip_identity() {
        let payloads: &[&[u8]] = &[b"", b"?", b"S05", b"m4000,100", &[0x00, 0xff, 0x7f]];
        for &payload in payloads {
            let frame = encode(payload);
            match decode(&frame) {
                Decoded::Packet {
                    payload: decoded,
                    checksum: transmitted,
                    consumed,
                } => {
                    assert_eq!(decoded, payload);
                    assert_eq!(transmitted, checksum(payload));
                    assert_eq!(consumed, frame.len());
                }
                other => panic!("expected packet, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_incomplete_is_need_more_data() {
        assert_eq!(decode(b""), Decoded::NeedMoreData);
        assert_eq!(decode(b"$"), Decoded::NeedMoreData);
        assert_eq!(decode(b"$?"), Decoded::NeedMoreData);
        assert_eq!(decode(b"$?#"), Decoded::NeedMoreData);
        assert_eq!(decode(b"$?#3"), Decoded::NeedMoreData);
    }

    #[test]
    fn test_decode_stops_at_first_terminator() {
        // '#' inside what looks like payload ends the frame there
        match decode(b"$ab#61cd") {
            Decoded::Packet {
                payload, consumed, ..
            } => {
                assert_eq!(payload, b"ab");
                assert_eq!(consumed, 6);
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_uppercase_checksum_accepted() {
        match decode(b"$S05#B8") {
            Decoded::Packet { checksum, .. } => assert_eq!(checksum, 0xb8),
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_hex_checksum_is_malformed() {
        assert_eq!(decode(b"$?#zz"), Decoded::Malformed);
        assert_eq!(decode(b"$?#3z"), Decoded::Malformed);
    }

    #[test]
    fn test_verify_matches_rendered_checksum() {
        for payload in [&b"?"[..], b"S05", b""] {
            assert!(verify(payload, checksum(payload)));
            assert!(!verify(payload, checksum(payload).wrapping_add(1)));
        }
    }

    #[test]
    fn test_hex_encode_lowercase() {
        assert_eq!(hex_encode(&[0xde, 0xad, 0x00]), b"dead00");
        assert_eq!(hex_encode(b""), b"");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex(b"0"), Some(0));
        assert_eq!(parse_hex(b"4000"), Some(0x4000));
        assert_eq!(parse_hex(b"DeadBeef"), Some(0xdead_beef));
        assert_eq!(parse_hex(b""), None);
        assert_eq!(parse_hex(b"12g4"), None);
        assert_eq!(parse_hex(b"10000000000000000"), None); // overflows u64
    }
}
