//! Transport connection establishment.
//!
//! # Responsibilities
//! - Resolve the target host and open one connection to it
//! - Stay free of timing concerns; the executor bounds the call
//!
//! # Design Decisions
//! - `Connector` is the seam between the executor and the network
//! - Exactly one connection attempt: the first resolved address is used

use std::io;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{lookup_host, TcpStream};

use crate::net::target::Target;

/// Opens the byte stream an exchange runs over.
pub trait Connector: Send + Sync {
    type Io: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    fn connect<'a>(&'a self, target: &'a Target) -> BoxFuture<'a, io::Result<Self::Io>>;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Io = TcpStream;

    fn connect<'a>(&'a self, target: &'a Target) -> BoxFuture<'a, io::Result<TcpStream>> {
        async move {
            let addr = lookup_host((target.host(), target.port()))
                .await?
                .next()
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("no addresses found for {}", target.host()),
                    )
                })?;

            tracing::trace!(addr = %addr, "Connecting");
            let stream = TcpStream::connect(addr).await?;
            stream.set_nodelay(true)?;
            Ok(stream)
        }
        .boxed()
    }
}
