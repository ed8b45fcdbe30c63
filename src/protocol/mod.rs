//! Protocol module - RSP wire grammar and packet extraction.
//!
//! Pure byte logic, no I/O:
//! - `$...#cc` frame encoding/decoding and checksum verification
//! - packet buffer for accumulating fragmented reads

pub mod stream;
pub mod wire;

pub use stream::{Inbound, PacketBuffer};
pub use wire::{checksum, decode, encode, verify, Decoded, MAX_ATTEMPTS, PACKET_SIZE};
