//! The wire-level collaborator of the client core.
//!
//! A [`Connector`] opens one [`Transport`], and a transport carries one
//! command frame out and one reply frame back per call. Closing a transport
//! is dropping it. The core only needs to tell I/O-level failures apart from
//! everything else, which is what [`TransportError::is_crash`] exposes.

use crate::Frame;

use std::fmt;
use std::io;
use std::time::Duration;

mod tcp;
pub use tcp::{TcpConnector, TcpTransport};

#[cfg(test)]
pub(crate) mod mock;

/// A live, exclusively owned link to the server.
pub trait Transport {
    /// Write `command` and wait for exactly one reply.
    fn send(&mut self, command: &Frame) -> Result<Frame, TransportError>;

    /// Bound every subsequent `send`. `None` removes the bound.
    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError>;
}

/// Opens transports to a server.
pub trait Connector {
    type Transport: Transport;

    /// Open a transport to `host:port`, giving up after `timeout` if set.
    fn open(
        &mut self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Self::Transport, TransportError>;
}

/// Errors reported by a transport.
#[derive(Debug)]
pub enum TransportError {
    /// Socket level failure, including refused connections and timeouts.
    Io(io::Error),

    /// The peer closed the stream while a reply was expected.
    Eof,

    /// The host name did not resolve to any address.
    Resolve(String),

    /// The peer sent bytes that are not a valid frame.
    Protocol(String),

    /// The runtime driving the socket could not be created.
    Runtime(io::Error),

    /// No transport is open.
    Closed,
}

impl TransportError {
    pub(crate) fn timed_out() -> TransportError {
        TransportError::Io(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"))
    }

    /// `true` when the failure means the server died or became unreachable
    /// mid-session: an I/O error or an unexpected end of stream.
    pub fn is_crash(&self) -> bool {
        matches!(self, TransportError::Io(_) | TransportError::Eof)
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> TransportError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            TransportError::Eof
        } else {
            TransportError::Io(err)
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Io(err) => write!(f, "io error: {}", err),
            TransportError::Eof => "connection closed by server".fmt(f),
            TransportError::Resolve(host) => write!(f, "could not resolve `{}`", host),
            TransportError::Protocol(msg) => write!(f, "protocol error: {}", msg),
            TransportError::Runtime(err) => write!(f, "runtime error: {}", err),
            TransportError::Closed => "not connected".fmt(f),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(err) | TransportError::Runtime(err) => Some(err),
            _ => None,
        }
    }
}
