//! Command identifiers and stop signals.
//!
//! An inbound frame's payload starts with a command identifier — a single
//! byte for most commands, two bytes for the backward-execution pair — and
//! the rest of the payload is the command's arguments. The identifier set
//! is fixed by the protocol:
//! <https://sourceware.org/gdb/current/onlinedocs/gdb/Packets.html>

use crate::protocol::wire;

/// A command identifier, split off the front of a frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `q` — general query, get.
    QueryGet,
    /// `Q` — general query, set.
    QuerySet,
    /// `H` — set thread for subsequent operations.
    SetThread,
    /// `?` — report target halt status.
    Status,
    /// `!` — enable extended mode.
    ExtendedMode,
    /// `g` — read general registers.
    ReadRegisters,
    /// `G` — write general registers.
    WriteRegisters,
    /// `D` — detach from the target.
    Detach,
    /// `k` — kill the target.
    Kill,
    /// `m` — read memory.
    ReadMemory,
    /// `M` — write memory (hex data).
    WriteMemory,
    /// `X` — write memory (binary data).
    WriteBinaryMemory,
    /// `c` — continue execution.
    Continue,
    /// `s` — single step.
    Step,
    /// `bc` — backward continue.
    BackwardContinue,
    /// `bs` — backward single step.
    BackwardStep,
    /// `T` — query whether a thread is alive.
    ThreadAlive,
    /// `z` — remove a break- or watchpoint.
    RemoveBreakpoint,
    /// `Z` — insert a break- or watchpoint.
    InsertBreakpoint,
    /// `0x03` — break-in, delivered outside frame syntax.
    Interrupt,
    /// `v` — multi-letter extension commands (`vCont`, ...).
    Extended,
}

impl Command {
    /// Splits a frame payload into its command identifier and arguments.
    ///
    /// The two-byte `bc`/`bs` identifiers are matched before the one-byte
    /// forms. An empty payload or an unknown leading byte yields `None`;
    /// the dispatcher answers those with the canonical empty reply.
    pub fn split(payload: &[u8]) -> Option<(Self, &[u8])> {
        if let Some(args) = payload.strip_prefix(b"bc") {
            return Some((Self::BackwardContinue, args));
        }
        if let Some(args) = payload.strip_prefix(b"bs") {
            return Some((Self::BackwardStep, args));
        }
        let (&first, args) = payload.split_first()?;
        let command = match first {
            b'q' => Self::QueryGet,
            b'Q' => Self::QuerySet,
            b'H' => Self::SetThread,
            b'?' => Self::Status,
            b'!' => Self::ExtendedMode,
            b'g' => Self::ReadRegisters,
            b'G' => Self::WriteRegisters,
            b'D' => Self::Detach,
            b'k' => Self::Kill,
            b'm' => Self::ReadMemory,
            b'M' => Self::WriteMemory,
            b'X' => Self::WriteBinaryMemory,
            b'c' => Self::Continue,
            b's' => Self::Step,
            b'T' => Self::ThreadAlive,
            b'z' => Self::RemoveBreakpoint,
            b'Z' => Self::InsertBreakpoint,
            b'v' => Self::Extended,
            wire::INTERRUPT => Self::Interrupt,
            _ => return None,
        };
        Some((command, args))
    }
}

/// Stop signals reported to the debugger in `S<nn>` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Signal {
    /// SIGTRAP — the all-purpose breakpoint/step stop.
    Trap = 5,
}

impl Signal {
    /// Renders the `S<nn>` stop-reply payload for this signal.
    pub fn stop_reply(self) -> Vec<u8> {
        format!("S{:02x}", self as u8).into_bytes()
    }
}
