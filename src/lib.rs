//! A blocking Redis client that survives server restarts.
//!
//! Commands go through a single lazily opened connection. A command that hits
//! a broken connection is retried once on a fresh one; after the server has
//! been seen crashing, reconnect attempts are refused for a configurable
//! interval so callers fail fast instead of piling onto a server that is
//! coming back up.
//!
//! The layers, bottom up:
//!
//! * `frame` and `connection`: the RESP codec over a TCP stream.
//! * `transport`: the blocking request/reply seam, [`Transport`] and the
//!   [`Connector`] that opens it.
//! * [`ConnectionManager`]: connect, authenticate, select, back off.
//! * [`CommandExecutor`]: classify each reply as an [`Outcome`] and retry at
//!   most once.
//! * [`Client`]: the public handle and its typed commands.

pub mod clients;
pub use clients::Client;

pub mod cmd;
pub use cmd::Command;

pub mod config;
pub use config::ClientConfig;

pub mod connection;
pub use connection::Connection;

pub mod crash;
pub use crash::CrashMark;

pub mod executor;
pub use executor::CommandExecutor;

pub mod frame;
pub use frame::Frame;

pub mod manager;
pub use manager::ConnectionManager;

pub mod outcome;
pub use outcome::Outcome;

pub mod transport;
pub use transport::{Connector, TcpConnector, TcpTransport, Transport, TransportError};

use std::fmt;

/// Default port that a redis server listens on
///
/// Used if no port is specified
pub const DEFAULT_PORT: u16 = 6379;

/// Error returned by client operations.
///
/// Transport details are logged, not returned: whatever went wrong with the
/// connection, the caller sees [`Error::Unavailable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No usable connection: the server is unreachable, still inside its
    /// crash backoff, or failed again on the retry.
    Unavailable,

    /// The server answered with an error, or with a status other than `OK`.
    Rejected(String),

    /// The reply did not have the shape the command expects.
    UnexpectedReply,
}

/// A specialized `Result` type for client operations.
///
/// This is defined as a convenience.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unavailable => "server unavailable".fmt(fmt),
            Error::Rejected(msg) => write!(fmt, "server rejected command: {}", msg),
            Error::UnexpectedReply => "unexpected reply shape".fmt(fmt),
        }
    }
}

impl std::error::Error for Error {}
