//! Minimal stub server: serves a static in-memory target over TCP.
//!
//! Run it, then attach with a debugger client:
//!
//! ```text
//! cargo run --example gdbserver
//! gdb -ex 'target remote 127.0.0.1:44444'
//! ```

use std::sync::Arc;

use bytes::Bytes;

use rspstub::handlers::stock_table;
use rspstub::{Backend, Listener, Session, ThreadInfo};

/// A target that never runs: one thread, a fixed memory map.
struct StaticTarget;

impl Backend for StaticTarget {
    fn memory_map_xml(&self) -> Bytes {
        Bytes::from_static(
            b"<memory-map>\
              <memory type=\"ram\" start=\"0x0\" length=\"0x40000000\"/>\
              </memory-map>",
        )
    }

    fn thread_ids(&self) -> Vec<u64> {
        vec![1]
    }

    fn thread(&self, id: u64) -> Option<ThreadInfo> {
        (id == 1).then(|| ThreadInfo {
            name: "main".to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> rspstub::Result<()> {
    tracing_subscriber::fmt::init();

    let listener = Listener::bind("127.0.0.1:44444").await?;
    tracing::info!(addr = %listener.local_addr()?, "listening for debugger connections");

    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::info!(%peer, "debugger connected");

        tokio::spawn(async move {
            let mut session = Session::builder()
                .table(stock_table(Arc::new(StaticTarget)))
                .build(stream);
            match session.run().await {
                Ok(()) => tracing::info!(%peer, "session closed"),
                Err(err) => tracing::warn!(%peer, %err, "session failed"),
            }
        });
    }
}
