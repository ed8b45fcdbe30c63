//! # rspstub
//!
//! A GDB Remote Serial Protocol stub engine.
//!
//! This crate implements the protocol side of a debug stub: `$...#cc`
//! framing with checksum validation, the `+`/`-` acknowledgment handshake
//! with bounded retransmission, break-in handling, command dispatch,
//! capability negotiation, and chunked transfer of large replies. What the
//! commands *mean* — reading target memory, enumerating threads — is
//! supplied by a [`Backend`] implementation; the engine never inspects a
//! target itself.
//!
//! ## Architecture
//!
//! - **Wire layer** ([`protocol`]): pure framing, checksums, packet
//!   extraction from a fragmented stream.
//! - **Link layer** ([`link`]): the ack handshake on both sides of the
//!   conversation, over any `AsyncRead + AsyncWrite` transport.
//! - **Session layer** ([`session`], [`dispatch`]): the per-connection
//!   state machine and the command → handler table.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rspstub::{handlers, Listener, Session};
//!
//! #[tokio::main]
//! async fn main() -> rspstub::Result<()> {
//!     let listener = Listener::bind("127.0.0.1:44444").await?;
//!     loop {
//!         let (stream, _peer) = listener.accept().await?;
//!         let backend = Arc::new(MyTarget::open()?);
//!         tokio::spawn(async move {
//!             let mut session = Session::builder()
//!                 .table(handlers::stock_table(backend))
//!                 .build(stream);
//!             let _ = session.run().await;
//!         });
//!     }
//! }
//! ```

pub mod backend;
pub mod chunked;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod features;
pub mod handlers;
pub mod link;
pub mod protocol;
pub mod session;
pub mod transport;

pub use backend::{Backend, ThreadInfo};
pub use command::{Command, Signal};
pub use dispatch::{BoxFuture, CommandTable, Exchange, Handler};
pub use error::{Result, RspError};
pub use events::{Event, EventSink, NullSink, TracingSink};
pub use features::{FeatureSet, FeatureValue};
pub use link::{Link, Received};
pub use session::{Session, SessionBuilder, SessionState};
pub use transport::{Listener, Transport};
