//! Command dispatch.
//!
//! A [`CommandTable`] maps command identifiers to [`Handler`]s. The table
//! is populated before the session starts and handed over by value; it is
//! never mutated once the command loop runs.
//!
//! The dispatch contract is deliberately narrow: a handler either serves
//! the command itself — sending zero or more reply packets through the
//! [`Exchange`] — and returns `Ok(true)`, or it returns `Ok(false)` and
//! the dispatcher sends the protocol's canonical empty reply (`$#00` on
//! the wire). An unknown identifier produces the bit-identical empty
//! reply; the client cannot tell the two cases apart. A handler `Err` is
//! session-fatal, never client-visible.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::command::Command;
use crate::error::Result;
use crate::features::{FeatureSet, FeatureValue};
use crate::link::Link;

/// Boxed future returned by handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Everything a handler may touch while serving one command.
///
/// Borrows pieces of the running session for the duration of one dispatch.
pub struct Exchange<'a, T> {
    /// Wire link, for sending reply packets and flipping no-ack mode.
    pub link: &'a mut Link<T>,
    /// Capability table offered to this client.
    pub features: &'a FeatureSet,
    /// Features the client announced in its `qSupported` query; written by
    /// the query handler, preserved across the session.
    pub remote_features: &'a mut Vec<(String, FeatureValue)>,
    /// Cleared by detach/kill handlers to end the command loop.
    pub attached: &'a mut bool,
}

/// One registered command handler.
pub trait Handler<T>: Send + Sync {
    /// Serve one command.
    ///
    /// `Ok(true)`: the handler sent its own reply (possibly none at all —
    /// kill replies with nothing). `Ok(false)`: not handled, the
    /// dispatcher answers with the empty reply.
    fn call<'a>(&'a self, args: &'a [u8], cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>>;
}

/// Fixed command → handler mapping for one session.
pub struct CommandTable<T> {
    handlers: HashMap<Command, Box<dyn Handler<T>>>,
}

impl<T> CommandTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler. Re-inserting a command replaces its handler;
    /// registration ends when the table is handed to the session.
    pub fn insert(&mut self, command: Command, handler: impl Handler<T> + 'static) {
        self.handlers.insert(command, Box::new(handler));
    }

    /// Look up the handler for a command.
    pub fn get(&self, command: Command) -> Option<&dyn Handler<T>> {
        self.handlers.get(&command).map(|handler| handler.as_ref())
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for CommandTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NopHandler;

    impl<T> Handler<T> for NopHandler {
        fn call<'a>(&'a self, _args: &'a [u8], _cx: Exchange<'a, T>) -> BoxFuture<'a, Result<bool>> {
            Box::pin(async { Ok(true) })
        }
    }

    #[test]
    fn test_table_insert_and_get() {
        let mut table: CommandTable<tokio::io::DuplexStream> = CommandTable::new();
        assert!(table.is_empty());

        table.insert(Command::Status, NopHandler);
        table.insert(Command::Kill, NopHandler);

        assert_eq!(table.len(), 2);
        assert!(table.get(Command::Status).is_some());
        assert!(table.get(Command::Detach).is_none());
    }

    #[test]
    fn test_reinsert_replaces() {
        let mut table: CommandTable<tokio::io::DuplexStream> = CommandTable::new();
        table.insert(Command::Status, NopHandler);
        table.insert(Command::Status, NopHandler);
        assert_eq!(table.len(), 1);
    }
}
