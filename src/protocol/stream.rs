//! Packet extraction from a fragmented byte stream.
//!
//! A stream socket delivers bytes with no respect for frame boundaries: a
//! read may hold half a frame, several frames, or a break-in byte queued
//! ahead of a command. [`PacketBuffer`] accumulates whatever arrives and
//! hands back complete items one at a time.
//!
//! Extraction order per wake-up:
//! 1. a leading `0x03` yields [`Inbound::Interrupt`] immediately — break-in
//!    pre-empts any complete frame buffered behind it;
//! 2. leading `+`/`-` bytes (stale acknowledgment noise) are dropped;
//! 3. otherwise the buffer is matched against the `$...#cc` grammar and a
//!    complete frame is removed from the front.
//!
//! Checksum verification and acknowledgment stay with the caller; the
//! buffer reports the transmitted checksum untouched.

use bytes::{Buf, Bytes, BytesMut};

use super::wire::{self, Decoded};

/// One extracted item from the inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The break-in byte `0x03`, sent outside frame syntax.
    Interrupt,
    /// A complete frame: its payload and the checksum it was sent with.
    Packet { payload: Bytes, checksum: u8 },
}

/// Buffer for accumulating inbound bytes and extracting complete items.
///
/// Owned by one session; no other component reads or writes it. There is
/// no hidden state beyond the accumulated bytes — an incomplete or
/// malformed frame simply stays buffered until more bytes complete it or
/// the connection closes.
#[derive(Debug, Default)]
pub struct PacketBuffer {
    buffer: BytesMut,
}

impl PacketBuffer {
    /// Create an empty packet buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(wire::PACKET_SIZE),
        }
    }

    /// Append newly read transport bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete item from the front of the buffer.
    ///
    /// Returns `None` when the buffered bytes do not yet form a complete
    /// item ("need more data") — including the malformed-checksum case,
    /// which is deliberately indistinguishable from an incomplete frame.
    pub fn try_extract(&mut self) -> Option<Inbound> {
        loop {
            match self.buffer.first() {
                Some(&wire::INTERRUPT) => {
                    self.buffer.advance(1);
                    return Some(Inbound::Interrupt);
                }
                // Ack bytes ahead of a frame are handshake leftovers, not
                // frame data. Same tolerance the ack wait applies.
                Some(&wire::ACK) | Some(&wire::NACK) => {
                    self.buffer.advance(1);
                }
                _ => break,
            }
        }
        let (checksum, consumed) = match wire::decode(&self.buffer) {
            Decoded::Packet {
                checksum, consumed, ..
            } => (checksum, consumed),
            Decoded::NeedMoreData | Decoded::Malformed => return None,
        };
        let frame = self.buffer.split_to(consumed).freeze();
        // strip the leading '$' and the '#cc' tail
        let payload = frame.slice(1..consumed - 3);
        Some(Inbound::Packet { payload, checksum })
    }

    /// Number of buffered, not-yet-consumed bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no unconsumed bytes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_all(buffer: &mut PacketBuffer) -> Vec<Inbound> {
        let mut items = Vec::new();
        while let Some(item) = buffer.try_extract() {
            items.push(item);
        }
        items
    }

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = PacketBuffer::new();
        buffer.extend(b"$?#3f");

        match buffer.try_extract() {
            Some(Inbound::Packet { payload, checksum }) => {
                assert_eq!(&payload[..], b"?");
                assert_eq!(checksum, 0x3f);
            }
            other => panic!("expected packet, got {other:?}"),
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = PacketBuffer::new();
        let mut items = Vec::new();

        for &byte in b"$S05#b8".iter() {
            buffer.extend(&[byte]);
            items.extend(extract_all(&mut buffer));
        }

        assert_eq!(items.len(), 1);
        match &items[0] {
            Inbound::Packet { payload, .. } => assert_eq!(&payload[..], b"S05"),
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_frames_in_one_read() {
        let mut buffer = PacketBuffer::new();
        buffer.extend(b"$?#3f$g#67");

        let items = extract_all(&mut buffer);
        assert_eq!(items.len(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_interrupt_preempts_buffered_frame() {
        let mut buffer = PacketBuffer::new();
        buffer.extend(&[wire::INTERRUPT]);
        buffer.extend(b"$?#3f");

        assert_eq!(buffer.try_extract(), Some(Inbound::Interrupt));
        match buffer.try_extract() {
            Some(Inbound::Packet { payload, .. }) => assert_eq!(&payload[..], b"?"),
            other => panic!("expected packet, got {other:?}"),
        }
    }

    #[test]
    fn test_leading_ack_noise_is_stripped() {
        let mut buffer = PacketBuffer::new();
        buffer.extend(b"+-$?#3f");

        match buffer.try_extract() {
            Some(Inbound::Packet { payload, .. }) => assert_eq!(&payload[..], b"?"),
            other => panic!("expected packet, got {other:?}"),
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_incomplete_frame_waits() {
        let mut buffer = PacketBuffer::new();
        buffer.extend(b"$m4000,");

        assert_eq!(buffer.try_extract(), None);
        assert_eq!(buffer.len(), 7);

        buffer.extend(b"100#5e");
        assert!(matches!(
            buffer.try_extract(),
            Some(Inbound::Packet { .. })
        ));
    }

    #[test]
    fn test_malformed_checksum_field_waits() {
        let mut buffer = PacketBuffer::new();
        buffer.extend(b"$?#zz");

        // indistinguishable from an incomplete frame: nothing is consumed
        assert_eq!(buffer.try_extract(), None);
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_checksum_reported_untouched() {
        let mut buffer = PacketBuffer::new();
        // deliberately wrong checksum: extraction still succeeds
        buffer.extend(b"$?#00");

        match buffer.try_extract() {
            Some(Inbound::Packet { payload, checksum }) => {
                assert_eq!(&payload[..], b"?");
                assert_eq!(checksum, 0x00);
                assert!(!wire::verify(&payload, checksum));
            }
            other => panic!("expected packet, got {other:?}"),
        }
    }
}
