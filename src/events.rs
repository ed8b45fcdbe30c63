//! Structured protocol events.
//!
//! The engine reports what happens on the wire — packets, acks, dispatch
//! outcomes, state transitions — to an injected [`EventSink`] rather than
//! a global logger. The stock [`TracingSink`] forwards everything to
//! `tracing`; tests swap in a recording sink to assert on event order.

use std::fmt;

use crate::command::Command;
use crate::session::SessionState;

/// One observable protocol event.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The session moved to a new state.
    State {
        from: SessionState,
        to: SessionState,
    },
    /// A frame was written to the transport. `attempt` counts transmissions
    /// of the same frame under the ack handshake (1 for the first).
    PacketSent { payload: &'a [u8], attempt: usize },
    /// A checksum-valid frame was accepted from the transport.
    PacketReceived { payload: &'a [u8] },
    /// An acknowledgment byte was written (`+` when `ok`, else `-`).
    AckSent { ok: bool },
    /// An acknowledgment byte was read (`+` when `ok`, else `-`).
    AckReceived { ok: bool },
    /// The break-in byte arrived.
    Interrupt,
    /// A frame was dispatched. `command` is `None` for an unknown
    /// identifier; `handled` is false when the empty reply was sent.
    Dispatch {
        command: Option<Command>,
        handled: bool,
    },
}

/// Observer for protocol events.
///
/// Implementations must be cheap and non-blocking; the engine emits events
/// inline on the session task.
pub trait EventSink: Send + Sync {
    /// Receive one event.
    fn emit(&self, event: Event<'_>);
}

/// Sink that forwards events to `tracing`.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: Event<'_>) {
        match event {
            Event::State { from, to } => tracing::debug!(?from, ?to, "session state changed"),
            Event::PacketSent { payload, attempt } if attempt > 1 => {
                tracing::debug!(payload = %Preview(payload), attempt, "packet retransmitted")
            }
            Event::PacketSent { payload, .. } => {
                tracing::debug!(payload = %Preview(payload), "packet sent")
            }
            Event::PacketReceived { payload } => {
                tracing::debug!(payload = %Preview(payload), "packet received")
            }
            Event::AckSent { ok: true } => tracing::trace!("ack sent"),
            Event::AckSent { ok: false } => {
                tracing::debug!("invalid checksum, nack sent")
            }
            Event::AckReceived { ok: true } => tracing::trace!("ack received"),
            Event::AckReceived { ok: false } => tracing::debug!("nack received, retransmitting"),
            Event::Interrupt => tracing::debug!("break-in received"),
            Event::Dispatch { command, handled } => {
                tracing::debug!(?command, handled, "command dispatched")
            }
        }
    }
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event<'_>) {}
}

/// Lossy, truncated payload rendering for log lines.
struct Preview<'a>(&'a [u8]);

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LIMIT: usize = 70;
        let text = String::from_utf8_lossy(self.0);
        for (index, ch) in text.chars().enumerate() {
            if index == LIMIT {
                return write!(f, "...");
            }
            write!(f, "{}", ch.escape_debug())?;
        }
        Ok(())
    }
}
