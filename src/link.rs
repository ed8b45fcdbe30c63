//! The acknowledged wire link.
//!
//! [`Link`] owns the transport and runs both sides of the `+`/`-`
//! handshake around the pure framing layer:
//!
//! ```text
//!             ┌────────────────────── Link ──────────────────────┐
//! transport ──► PacketBuffer ─► verify ─► ack/nack ─► session    │
//! transport ◄─ encode ◄─ send ◄──────────── handler replies      │
//!             └──────────────────────────────────────────────────┘
//! ```
//!
//! The two sides are deliberately asymmetric: the *sender* gives up after
//! [`wire::MAX_ATTEMPTS`] rejected transmissions (a fatal error — the line
//! cannot be trusted), while the *receiver* nacks a bad checksum and waits
//! for the retransmission with no bound at all. Once no-ack mode is
//! negotiated both sides go quiet: sends become single-shot and inbound
//! verification is skipped.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{Result, RspError};
use crate::events::{Event, EventSink};
use crate::protocol::stream::{Inbound, PacketBuffer};
use crate::protocol::wire;
use crate::transport::Transport;

/// One item received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A frame payload, checksum-verified and acknowledged as needed.
    Packet(Bytes),
    /// The break-in byte.
    Interrupt,
    /// The peer half-closed with no further complete frame pending.
    /// A graceful end of session, not an error.
    Closed,
}

/// Transport plus ack state for one session.
pub struct Link<T> {
    io: T,
    buffer: PacketBuffer,
    ack_enabled: bool,
    events: Arc<dyn EventSink>,
}

impl<T: Transport> Link<T> {
    /// Wrap a transport. Acknowledgments start enabled.
    pub fn new(io: T, events: Arc<dyn EventSink>) -> Self {
        Self {
            io,
            buffer: PacketBuffer::new(),
            ack_enabled: true,
            events,
        }
    }

    /// Whether the ack handshake is still active.
    #[inline]
    pub fn ack_enabled(&self) -> bool {
        self.ack_enabled
    }

    /// Switch into no-ack mode. One-way: negotiated once per session via
    /// `QStartNoAckMode`, after the confirming reply went out under the
    /// old regime.
    pub fn disable_ack(&mut self) {
        self.ack_enabled = false;
    }

    /// Read the connection's opening acknowledgment byte.
    ///
    /// The client leads with `+` before its first command; anything else
    /// is a fatal handshake failure.
    pub async fn read_first_ack(&mut self) -> Result<()> {
        match self.read_byte().await? {
            wire::ACK => {
                self.events.emit(Event::AckReceived { ok: true });
                Ok(())
            }
            other => Err(RspError::Handshake(other)),
        }
    }

    /// Receive the next inbound item.
    ///
    /// Fills the packet buffer from the transport until an item completes.
    /// With acks enabled, a checksum-valid packet (and a break-in) is
    /// acknowledged with `+` before being returned; a mismatch is answered
    /// `-` and the wait continues for the retransmission. With acks
    /// disabled, packets are returned unverified and unacknowledged.
    pub async fn recv(&mut self) -> Result<Received> {
        let mut chunk = [0u8; wire::PACKET_SIZE];
        loop {
            while let Some(item) = self.buffer.try_extract() {
                match item {
                    Inbound::Interrupt => {
                        self.events.emit(Event::Interrupt);
                        if self.ack_enabled {
                            self.write_ack(true).await?;
                        }
                        return Ok(Received::Interrupt);
                    }
                    Inbound::Packet { payload, checksum } => {
                        if !self.ack_enabled {
                            self.events.emit(Event::PacketReceived { payload: &payload });
                            return Ok(Received::Packet(payload));
                        }
                        if wire::verify(&payload, checksum) {
                            self.events.emit(Event::PacketReceived { payload: &payload });
                            self.write_ack(true).await?;
                            return Ok(Received::Packet(payload));
                        }
                        // ask for a retransmission, then keep waiting;
                        // the receiver side has no attempt ceiling
                        self.write_ack(false).await?;
                    }
                }
            }
            let n = self.io.read(&mut chunk).await?;
            if n == 0 {
                return Ok(Received::Closed);
            }
            self.buffer.extend(&chunk[..n]);
        }
    }

    /// Send one reply packet.
    ///
    /// With acks disabled the frame is written exactly once. Otherwise the
    /// frame is transmitted and the link waits for the peer's verdict:
    /// `+` completes the send, `-` triggers a retransmission, and any
    /// other byte is line noise to be ignored. After
    /// [`wire::MAX_ATTEMPTS`] rejected transmissions the link gives up
    /// with [`RspError::AckLimit`] — the session must close.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        let frame = wire::encode(payload);
        if !self.ack_enabled {
            self.events.emit(Event::PacketSent {
                payload,
                attempt: 1,
            });
            self.io.write_all(&frame).await?;
            self.io.flush().await?;
            return Ok(());
        }
        for attempt in 1..=wire::MAX_ATTEMPTS {
            self.events.emit(Event::PacketSent { payload, attempt });
            self.io.write_all(&frame).await?;
            self.io.flush().await?;
            loop {
                match self.read_byte().await? {
                    wire::ACK => {
                        self.events.emit(Event::AckReceived { ok: true });
                        return Ok(());
                    }
                    wire::NACK => {
                        self.events.emit(Event::AckReceived { ok: false });
                        break;
                    }
                    // noise on the line; keep waiting for a verdict
                    _ => {}
                }
            }
        }
        Err(RspError::AckLimit(wire::MAX_ATTEMPTS))
    }

    async fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        if self.io.read(&mut byte).await? == 0 {
            return Err(RspError::ConnectionClosed);
        }
        Ok(byte[0])
    }

    async fn write_ack(&mut self, ok: bool) -> Result<()> {
        let byte = if ok { wire::ACK } else { wire::NACK };
        self.io.write_all(&[byte]).await?;
        self.io.flush().await?;
        self.events.emit(Event::AckSent { ok });
        Ok(())
    }
}
