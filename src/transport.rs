//! Transport abstraction and the TCP accept path.
//!
//! The engine only needs a byte stream with end-of-stream detection, so
//! [`Transport`] is a blanket alias over tokio's async I/O traits. Any
//! `TcpStream`, Unix socket, or in-memory duplex qualifies — tests run
//! whole sessions over `tokio::io::duplex`.

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;

/// Byte-stream transport between the stub and a debugger client.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Accepts debugger connections for the stub.
///
/// One accepted stream backs exactly one session; callers typically spawn
/// a task per connection.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to the given address (e.g. `127.0.0.1:44444`).
    pub async fn bind(addr: &str) -> Result<Self> {
        Ok(Self {
            inner: TcpListener::bind(addr).await?,
        })
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Wait for the next debugger connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        Ok(self.inner.accept().await?)
    }
}
