//! Error types for rspstub.

use thiserror::Error;

/// Main error type for all stub operations.
///
/// Only session-fatal conditions surface here. The recoverable protocol
/// conditions (checksum mismatch, incomplete frame, unknown command) are
/// handled in-band and never become an `RspError`.
#[derive(Debug, Error)]
pub enum RspError {
    /// I/O error on the debugger transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport closed while the engine still needed a byte from it.
    #[error("connection closed")]
    ConnectionClosed,

    /// The connection's first acknowledgment byte was not `+`.
    #[error("handshake failed: expected '+', got {0:#04x}")]
    Handshake(u8),

    /// The peer kept rejecting a packet until the retransmission ceiling.
    #[error("no acknowledgment after {0} transmissions")]
    AckLimit(usize),

    /// Protocol violation outside the recoverable paths.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type alias using RspError.
pub type Result<T> = std::result::Result<T, RspError>;
