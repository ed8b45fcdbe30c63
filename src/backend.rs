//! Target introspection backend interface.
//!
//! The engine never touches target memory, registers, or threads itself;
//! everything target-specific comes through a [`Backend`]. The stock
//! handlers translate a declining backend (`None`/`false` returns) into
//! the protocol's empty "unsupported" reply, so a minimal backend only has
//! to provide its memory map.

use bytes::Bytes;

/// Description of one target thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    /// Human-readable thread name, shown by the debugger client.
    pub name: String,
}

/// Introspection interface onto the debugged target.
///
/// Implementations are shared by the stock handlers via `Arc`, so all
/// methods take `&self`; interior mutability is the backend's business.
pub trait Backend: Send + Sync + 'static {
    /// The target's memory map as `<memory-map>` XML, served in chunks
    /// through `qXfer:memory-map:read`.
    fn memory_map_xml(&self) -> Bytes;

    /// Identifiers of all live target threads.
    fn thread_ids(&self) -> Vec<u64> {
        Vec::new()
    }

    /// Look up one thread by id.
    fn thread(&self, _id: u64) -> Option<ThreadInfo> {
        None
    }

    /// Raw bytes of the general register file, in target order.
    fn read_registers(&self) -> Option<Bytes> {
        None
    }

    /// Read `length` bytes of target memory at `addr`.
    fn read_memory(&self, _addr: u64, _length: usize) -> Option<Bytes> {
        None
    }

    /// Plant a software breakpoint. `false` declines the request.
    fn insert_breakpoint(&self, _addr: u64) -> bool {
        false
    }

    /// Remove a software breakpoint. `false` declines the request.
    fn remove_breakpoint(&self, _addr: u64) -> bool {
        false
    }
}
