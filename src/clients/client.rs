//! Blocking Redis client.
//!
//! Provides a lazily connecting client and the entry point every typed
//! command goes through.

use crate::cmd::Command;
use crate::transport::{Connector, TcpConnector};
use crate::{ClientConfig, CommandExecutor, ConnectionManager, Frame};

use std::time::Duration;

/// A client for one Redis server.
///
/// Backed by a single connection that is opened on first use, `Client`
/// reconnects once when a command hits a broken connection and refuses to
/// reconnect for [`reconnection_interval`](ClientConfig::reconnection_interval)
/// after the server has been seen crashing.
///
/// Every method blocks the calling thread and takes `&mut self`: one command
/// is in flight at a time. Use one client per thread, or put it behind a
/// `Mutex`, to share it.
///
/// Errors carry no more detail than a caller can act on; see
/// [`Error`](crate::Error).
#[derive(Debug)]
pub struct Client<C: Connector = TcpConnector> {
    manager: ConnectionManager<C>,
}

impl Client {
    /// Create a client for the server described by `config`.
    ///
    /// No connection is made until the first command or an explicit
    /// [`connect`](Client::connect).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use steady_redis::{Client, ClientConfig};
    ///
    /// fn main() {
    ///     let config = ClientConfig::new("127.0.0.1", 6379).password("secret").database(2);
    ///     let mut client = Client::new(config);
    ///
    ///     client.set("foo", "bar".into()).unwrap();
    ///     let value = client.get("foo").unwrap();
    ///     assert_eq!(value.as_deref(), Some(&b"bar"[..]));
    /// }
    /// ```
    pub fn new(config: ClientConfig) -> Client {
        Client::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Client<C> {
    /// Create a client that opens its connections through `connector`.
    pub fn with_connector(config: ClientConfig, connector: C) -> Client<C> {
        Client {
            manager: ConnectionManager::new(config, connector),
        }
    }

    /// Execute `command` and return the raw reply.
    ///
    /// This is what every typed method uses; call it directly for commands
    /// without a wrapper.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use steady_redis::{Client, ClientConfig, Command};
    ///
    /// fn main() {
    ///     let mut client = Client::new(ClientConfig::default());
    ///     let reply = client.execute(&Command::new("TTL").arg("session")).unwrap();
    ///     println!("{}", reply);
    /// }
    /// ```
    pub fn execute(&mut self, command: &Command) -> crate::Result<Frame> {
        CommandExecutor::new(&mut self.manager).execute(command)
    }

    /// Connect now instead of on the first command. Returns `true` when a
    /// connection is ready.
    pub fn connect(&mut self) -> bool {
        self.manager.connect()
    }

    pub fn disconnect(&mut self) {
        self.manager.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn set_reconnection_interval(&mut self, interval: Duration) {
        self.manager.set_reconnection_interval(interval);
    }

    /// Zero disables the timeout. Applies from the next connection on.
    pub fn set_connection_timeout(&mut self, timeout: Duration) {
        self.manager
            .set_connection_timeout(crate::config::non_zero(timeout));
    }

    /// Zero disables the timeout. Applies from the next connection on.
    pub fn set_operation_timeout(&mut self, timeout: Duration) {
        self.manager
            .set_operation_timeout(crate::config::non_zero(timeout));
    }

    /// The connection manager, for inspecting connection and crash state.
    pub fn manager(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    pub(crate) fn manager_mut(&mut self) -> &mut ConnectionManager<C> {
        &mut self.manager
    }
}
