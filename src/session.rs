//! Per-connection session state machine.
//!
//! One [`Session`] serves one accepted connection:
//!
//! ```text
//! Connecting ─► Handshaking ─► Attached ─► Closed
//!                   │                        ▲
//!                   └── bad first ack ───────┘
//! ```
//!
//! While attached the loop is strictly half-duplex: receive a frame (the
//! link acknowledges it), dispatch it, and only once the reply has been
//! fully sent read the next frame. The loop ends when a detach/kill
//! handler clears the attached flag, the peer closes, or a fatal error
//! (handshake, ack ceiling, I/O) occurs. Either way the terminal state is
//! `Closed`.
//!
//! # Example
//!
//! ```ignore
//! let backend = Arc::new(MyTarget::open()?);
//! let mut session = Session::builder()
//!     .table(handlers::stock_table(backend))
//!     .build(stream);
//! session.run().await?;
//! ```

use std::sync::Arc;

use crate::command::Command;
use crate::dispatch::{CommandTable, Exchange, Handler};
use crate::error::Result;
use crate::events::{Event, EventSink, TracingSink};
use crate::features::{FeatureSet, FeatureValue};
use crate::link::{Link, Received};
use crate::protocol::wire;
use crate::transport::Transport;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, handshake not yet started.
    Connecting,
    /// Waiting for the connection's first acknowledgment byte.
    Handshaking,
    /// Command loop active.
    Attached,
    /// Terminal.
    Closed,
}

/// Builder for configuring a session before it runs.
pub struct SessionBuilder<T> {
    table: CommandTable<T>,
    features: FeatureSet,
    events: Arc<dyn EventSink>,
}

impl<T: Transport> SessionBuilder<T> {
    /// Start from an empty handler table, the stock capability set, and
    /// the tracing event sink.
    pub fn new() -> Self {
        Self {
            table: CommandTable::new(),
            features: FeatureSet::stock(),
            events: Arc::new(TracingSink),
        }
    }

    /// Replace the whole handler table.
    pub fn table(mut self, table: CommandTable<T>) -> Self {
        self.table = table;
        self
    }

    /// Register one handler on top of the current table.
    pub fn handler(mut self, command: Command, handler: impl Handler<T> + 'static) -> Self {
        self.table.insert(command, handler);
        self
    }

    /// Replace the capability table.
    pub fn features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Override the advertised maximum frame payload.
    pub fn packet_size(mut self, bytes: usize) -> Self {
        self.features.set_packet_size(bytes);
        self
    }

    /// Replace the event sink.
    pub fn events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Bind the configuration to a transport.
    pub fn build(self, transport: T) -> Session<T> {
        Session {
            link: Link::new(transport, self.events.clone()),
            table: self.table,
            features: self.features,
            remote_features: Vec::new(),
            attached: true,
            state: SessionState::Connecting,
            events: self.events,
        }
    }
}

impl<T: Transport> Default for SessionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One debugger connection, from handshake to close.
pub struct Session<T> {
    link: Link<T>,
    table: CommandTable<T>,
    features: FeatureSet,
    remote_features: Vec<(String, FeatureValue)>,
    attached: bool,
    state: SessionState,
    events: Arc<dyn EventSink>,
}

impl<T: Transport> Session<T> {
    /// Create a session builder.
    pub fn builder() -> SessionBuilder<T> {
        SessionBuilder::new()
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Features the client announced in its `qSupported` query, in the
    /// order they were requested. Empty until that query arrives.
    pub fn remote_features(&self) -> &[(String, FeatureValue)] {
        &self.remote_features
    }

    /// Run the session to completion.
    ///
    /// Performs the first-ack handshake, then the command loop. Returns
    /// `Ok(())` on detach, kill, or remote close; any error is fatal and
    /// the transport should be dropped. The session always ends `Closed`.
    pub async fn run(&mut self) -> Result<()> {
        self.set_state(SessionState::Handshaking);
        let outcome = match self.link.read_first_ack().await {
            Ok(()) => {
                self.set_state(SessionState::Attached);
                self.command_loop().await
            }
            Err(err) => Err(err),
        };
        self.set_state(SessionState::Closed);
        outcome
    }

    async fn command_loop(&mut self) -> Result<()> {
        while self.attached {
            match self.link.recv().await? {
                Received::Closed => break,
                Received::Interrupt => self.dispatch(&[wire::INTERRUPT]).await?,
                Received::Packet(payload) => self.dispatch(&payload).await?,
            }
        }
        Ok(())
    }

    /// Route one frame payload to its handler.
    ///
    /// Unknown identifiers and handlers that decline both get the
    /// canonical empty reply, bit-identical on the wire.
    async fn dispatch(&mut self, payload: &[u8]) -> Result<()> {
        let Session {
            table,
            link,
            features,
            remote_features,
            attached,
            events,
            ..
        } = self;

        let (command, handled) = match Command::split(payload) {
            None => (None, false),
            Some((command, args)) => {
                let handled = match table.get(command) {
                    None => false,
                    Some(handler) => {
                        let cx = Exchange {
                            link: &mut *link,
                            features: &*features,
                            remote_features: &mut *remote_features,
                            attached: &mut *attached,
                        };
                        handler.call(args, cx).await?
                    }
                };
                (Some(command), handled)
            }
        };
        events.emit(Event::Dispatch { command, handled });
        if !handled {
            link.send(b"").await?;
        }
        Ok(())
    }

    fn set_state(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        self.events.emit(Event::State { from, to });
    }
}
