//! Stock command handlers.
//!
//! These cover the protocol-level commands every stub answers the same way
//! (capability negotiation, no-ack switching, detach/kill) and the
//! introspection commands that only need a [`Backend`] (stop status,
//! memory map transfer, thread listing, register/memory reads, software
//! breakpoints). [`stock_table`] wires them all up; sessions with special
//! needs register their own handlers instead.
//!
//! Every handler follows the dispatch contract: decline with `Ok(false)`
//! and the dispatcher sends the empty "unsupported" reply.

use std::sync::Arc;

use crate::backend::Backend;
use crate::chunked::{self, ChunkRequest};
use crate::command::{Command, Signal};
use crate::dispatch::{BoxFuture, CommandTable, Exchange, Handler};
use crate::error::Result;
use crate::features::FeatureSet;
use crate::protocol::wire;
use crate::transport::Transport;

/// Builds the standard handler table over a shared backend.
pub fn stock_table<T: Transport, B: Backend>(backend: Arc<B>) -> CommandTable<T> {
    let mut table = CommandTable::new();
    table.insert(Command::Status, StatusHandler);
    table.insert(Command::Interrupt, StatusHandler);
    table.insert(Command::QueryGet, QueryHandler::new(backend.clone()));
    table.insert(Command::QuerySet, SetHandler);
    table.insert(Command::ReadRegisters, ReadRegistersHandler::new(backend.clone()));
    table.insert(Command::ReadMemory, ReadMemoryHandler::new(backend.clone()));
    table.insert(
        Command::InsertBreakpoint,
        BreakpointHandler::insert(backend.clone()),
    );
    table.insert(Command::RemoveBreakpoint, BreakpointHandler::remove(backend));
    table.insert(Command::Detach, DetachHandler);
    table.insert(Command::Kill, KillHandler);
    table
}

/// Answers `?` (and the break-in byte) with a TRAP stop reply.
pub struct StatusHandler;

impl<T: Transport> Handler<T> for StatusHandler {
    fn call<'a>(&'a self, _args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            cx.link.send(&Signal::Trap.stop_reply()).await?;
            Ok(true)
        })
    }
}

/// Routes `q` sub-queries: `Supported`, `Xfer:memory-map:read`,
/// `fThreadInfo`/`sThreadInfo`, `ThreadExtraInfo`.
pub struct QueryHandler<B> {
    backend: Arc<B>,
}

impl<B> QueryHandler<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

impl<T: Transport, B: Backend> Handler<T> for QueryHandler<B> {
    fn call<'a>(&'a self, args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            if args == b"Supported" || args.starts_with(b"Supported:") {
                *cx.remote_features = FeatureSet::parse_requested(args);
                let reply = cx.features.supported_reply();
                cx.link.send(&reply).await?;
                return Ok(true);
            }
            if let Some(window) = args.strip_prefix(b"Xfer:memory-map:read::") {
                let Some(request) = ChunkRequest::parse(window) else {
                    return Ok(false);
                };
                let blob = self.backend.memory_map_xml();
                let reply = chunked::page(&blob, request, cx.features.packet_size());
                cx.link.send(&reply).await?;
                return Ok(true);
            }
            if args == b"fThreadInfo" {
                let reply = chunked::thread_list_reply(&self.backend.thread_ids());
                cx.link.send(&reply).await?;
                return Ok(true);
            }
            if args == b"sThreadInfo" {
                cx.link.send(&chunked::end_of_list_reply()).await?;
                return Ok(true);
            }
            if let Some(id) = args.strip_prefix(b"ThreadExtraInfo,") {
                let Some(id) = wire::parse_hex(id) else {
                    return Ok(false);
                };
                let Some(thread) = self.backend.thread(id) else {
                    return Ok(false);
                };
                let reply = wire::hex_encode(thread.name.as_bytes());
                cx.link.send(&reply).await?;
                return Ok(true);
            }
            Ok(false)
        })
    }
}

/// Routes `Q` sub-commands; only `StartNoAckMode` is implemented.
pub struct SetHandler;

impl<T: Transport> Handler<T> for SetHandler {
    fn call<'a>(&'a self, args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            if args == b"StartNoAckMode" {
                // confirm under the old regime, then go quiet
                cx.link.send(b"OK").await?;
                cx.link.disable_ack();
                return Ok(true);
            }
            Ok(false)
        })
    }
}

/// Answers `g` with the hex-encoded register file.
pub struct ReadRegistersHandler<B> {
    backend: Arc<B>,
}

impl<B> ReadRegistersHandler<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

impl<T: Transport, B: Backend> Handler<T> for ReadRegistersHandler<B> {
    fn call<'a>(&'a self, _args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let Some(registers) = self.backend.read_registers() else {
                return Ok(false);
            };
            cx.link.send(&wire::hex_encode(&registers)).await?;
            Ok(true)
        })
    }
}

/// Answers `m<addr>,<length>` with hex-encoded target memory.
pub struct ReadMemoryHandler<B> {
    backend: Arc<B>,
}

impl<B> ReadMemoryHandler<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }
}

impl<T: Transport, B: Backend> Handler<T> for ReadMemoryHandler<B> {
    fn call<'a>(&'a self, args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let Some(comma) = args.iter().position(|&b| b == b',') else {
                return Ok(false);
            };
            let (Some(addr), Some(length)) = (
                wire::parse_hex(&args[..comma]),
                wire::parse_hex(&args[comma + 1..]),
            ) else {
                return Ok(false);
            };
            let Ok(length) = usize::try_from(length) else {
                return Ok(false);
            };
            let Some(data) = self.backend.read_memory(addr, length) else {
                return Ok(false);
            };
            cx.link.send(&wire::hex_encode(&data)).await?;
            Ok(true)
        })
    }
}

/// Answers `Z0`/`z0` software break-point requests; other point types
/// decline.
pub struct BreakpointHandler<B> {
    backend: Arc<B>,
    insert: bool,
}

impl<B> BreakpointHandler<B> {
    pub fn insert(backend: Arc<B>) -> Self {
        Self {
            backend,
            insert: true,
        }
    }

    pub fn remove(backend: Arc<B>) -> Self {
        Self {
            backend,
            insert: false,
        }
    }
}

impl<T: Transport, B: Backend> Handler<T> for BreakpointHandler<B> {
    fn call<'a>(&'a self, args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            // args: <type>,<addr>,<kind>
            let mut fields = args.split(|&b| b == b',');
            let (Some(point_type), Some(addr)) = (fields.next(), fields.next()) else {
                return Ok(false);
            };
            if point_type != b"0" {
                // only software breakpoints are offered
                return Ok(false);
            }
            let Some(addr) = wire::parse_hex(addr) else {
                return Ok(false);
            };
            let accepted = if self.insert {
                self.backend.insert_breakpoint(addr)
            } else {
                self.backend.remove_breakpoint(addr)
            };
            if !accepted {
                return Ok(false);
            }
            cx.link.send(b"OK").await?;
            Ok(true)
        })
    }
}

/// Answers `D` with `OK` and ends the command loop.
pub struct DetachHandler;

impl<T: Transport> Handler<T> for DetachHandler {
    fn call<'a>(&'a self, _args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            cx.link.send(b"OK").await?;
            *cx.attached = false;
            Ok(true)
        })
    }
}

/// Ends the command loop on `k`. The client expects no reply; this is the
/// zero-frame handled case.
pub struct KillHandler;

impl<T: Transport> Handler<T> for KillHandler {
    fn call<'a>(&'a self, _args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            *cx.attached = false;
            Ok(true)
        })
    }
}
