//! TCP transport.
//!
//! Each transport owns a `current_thread` tokio runtime and drives the async
//! [`Connection`] with `block_on`, so callers see plain blocking calls.

use crate::config::non_zero;
use crate::transport::{Connector, Transport, TransportError};
use crate::{Connection, Frame};

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{self, TcpStream};
use tokio::runtime::Runtime;
use tokio::time;
use tracing::debug;

/// Opens [`TcpTransport`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

/// A TCP connection to the server plus the runtime that drives it.
#[derive(Debug)]
pub struct TcpTransport {
    /// Declared before `rt` so the socket is dropped while its runtime is
    /// still alive.
    connection: Connection,

    /// Bound applied to every `send`.
    timeout: Option<Duration>,

    rt: Runtime,
}

impl Connector for TcpConnector {
    type Transport = TcpTransport;

    fn open(
        &mut self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<TcpTransport, TransportError> {
        // Nothing here needs more than one thread; the runtime only runs
        // while a caller is blocked inside `block_on`.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TransportError::Runtime)?;

        let stream = rt.block_on(async {
            match timeout.and_then(non_zero) {
                Some(limit) => time::timeout(limit, connect_stream(host, port))
                    .await
                    .map_err(|_| TransportError::timed_out())?,
                None => connect_stream(host, port).await,
            }
        })?;

        Ok(TcpTransport {
            connection: Connection::new(stream),
            timeout: None,
            rt,
        })
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, command: &Frame) -> Result<Frame, TransportError> {
        let limit = self.timeout;
        let connection = &mut self.connection;

        self.rt.block_on(async move {
            let exchange = async {
                connection.write_frame(command).await?;
                connection.read_frame().await?.ok_or(TransportError::Eof)
            };

            match limit {
                Some(limit) => time::timeout(limit, exchange)
                    .await
                    .map_err(|_| TransportError::timed_out())?,
                None => exchange.await,
            }
        })
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        self.timeout = timeout.and_then(non_zero);
        Ok(())
    }
}

/// Resolve `host` and connect to the first address that accepts.
async fn connect_stream(host: &str, port: u16) -> Result<TcpStream, TransportError> {
    let addrs: Vec<SocketAddr> = net::lookup_host((host, port))
        .await
        .map_err(|_| TransportError::Resolve(host.to_string()))?
        .collect();

    if addrs.is_empty() {
        return Err(TransportError::Resolve(host.to_string()));
    }

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                // Commands are small; don't let Nagle hold them back.
                stream.set_nodelay(true)?;
                debug!(%addr, "connected");
                return Ok(stream);
            }
            Err(err) => {
                debug!(%addr, %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(last_err
        .map(TransportError::Io)
        .unwrap_or_else(|| TransportError::Resolve(host.to_string())))
}
