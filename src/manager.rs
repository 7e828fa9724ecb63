//! Lifecycle of the single server connection.

use crate::cmd::Command;
use crate::transport::{Connector, TcpConnector, Transport, TransportError};
use crate::config::non_zero;
use crate::{ClientConfig, CommandExecutor, CrashMark, Error, Frame, Outcome};

use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Owns the one transport of a client, the crash mark, and the handshake that
/// turns a fresh socket into a usable connection.
///
/// Two questions are answered here and nowhere else: "is there a connection
/// to use right now" and "should we even try to open one".
pub struct ConnectionManager<C: Connector = TcpConnector> {
    config: ClientConfig,
    connector: C,

    /// `None` while disconnected.
    transport: Option<C::Transport>,

    crash: CrashMark,

    /// Database applied by the handshake. Starts as the configured index and
    /// follows successful `select` calls.
    current_database: u32,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager. Nothing is opened until the first command.
    pub fn new(config: ClientConfig, connector: C) -> ConnectionManager<C> {
        let current_database = config.database;
        ConnectionManager {
            config,
            connector,
            transport: None,
            crash: CrashMark::never(),
            current_database,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn crash_mark(&self) -> &CrashMark {
        &self.crash
    }

    pub fn current_database(&self) -> u32 {
        self.current_database
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn set_reconnection_interval(&mut self, interval: Duration) {
        self.config.reconnection_interval = interval;
    }

    /// Takes effect on the next connect. `None` or zero disables it.
    pub fn set_connection_timeout(&mut self, timeout: Option<Duration>) {
        self.config.connection_timeout = timeout.and_then(non_zero);
    }

    /// Takes effect on the next connect. `None` or zero disables it.
    pub fn set_operation_timeout(&mut self, timeout: Option<Duration>) {
        self.config.operation_timeout = timeout.and_then(non_zero);
    }

    /// Make sure a connection is available, opening one if needed.
    ///
    /// An existing connection is reused without any I/O. Otherwise nothing is
    /// attempted while the last crash lies within the reconnection interval.
    pub fn ensure_connected(&mut self) -> bool {
        if self.transport.is_some() {
            return true;
        }

        let interval = self.config.reconnection_interval;
        if self.crash.is_backing_off(interval, Instant::now()) {
            debug!(?interval, "server crashed recently; not reconnecting yet");
            return false;
        }

        self.connect()
    }

    /// Open the transport and run the handshake: operation timeout, `AUTH`
    /// when a password is configured, `SELECT` when the database is not 0.
    ///
    /// Returns `true` right away if already connected. Never retries; on
    /// failure no connection is left behind.
    #[instrument(skip(self), fields(host = %self.config.host, port = self.config.port))]
    pub fn connect(&mut self) -> bool {
        if self.transport.is_some() {
            return true;
        }

        let opened = self.connector.open(
            &self.config.host,
            self.config.port,
            self.config.connection_timeout.and_then(non_zero),
        );

        let transport = match opened {
            Ok(transport) => transport,
            Err(err) => {
                if Outcome::of_error(&err) == Outcome::ServerCrash {
                    warn!(%err, "server unreachable");
                    self.mark_crash();
                } else {
                    warn!(%err, "failed to open connection");
                    self.disconnect();
                }
                return false;
            }
        };
        self.transport = Some(transport);

        if let Some(timeout) = self.config.operation_timeout.and_then(non_zero) {
            let applied = match self.transport.as_mut() {
                Some(transport) => transport.set_timeout(Some(timeout)),
                None => Err(TransportError::Closed),
            };
            if let Err(err) = applied {
                warn!(%err, "failed to apply operation timeout");
                self.disconnect();
                return false;
            }
        }

        if let Some(password) = self.config.password.clone() {
            if !self.handshake(&Command::new("AUTH").arg(password)) {
                return false;
            }
        }

        if self.current_database != 0 {
            let select = Command::new("SELECT").arg(self.current_database.to_string());
            if !self.handshake(&select) {
                return false;
            }
        }

        debug!(database = self.current_database, "connection ready");
        true
    }

    /// Drop the transport, if any.
    pub fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            debug!("disconnected");
        }
    }

    /// Switch the connection to database `index`.
    ///
    /// Goes through the executor, so it is subject to the backoff gate and the
    /// single retry like any other command. Once the server accepts, later
    /// reconnects select `index` too.
    pub fn select(&mut self, index: u32) -> crate::Result<()> {
        let command = Command::new("SELECT").arg(index.to_string());
        let reply = CommandExecutor::new(self).execute(&command)?;

        if reply.as_status().is_none() {
            warn!(?reply, "unexpected reply to SELECT");
            self.disconnect();
            return Err(Error::UnexpectedReply);
        }

        self.current_database = index;
        Ok(())
    }

    /// Remember that the server just died and drop the connection.
    pub fn mark_crash(&mut self) {
        self.crash.record();
        self.disconnect();
    }

    pub(crate) fn transport_mut(&mut self) -> Option<&mut C::Transport> {
        self.transport.as_mut()
    }

    /// One handshake step. Only an `OK` status reply lets the connect go on.
    #[instrument(skip_all, fields(command = command.name()))]
    fn handshake(&mut self, command: &Command) -> bool {
        let result = match self.transport.as_mut() {
            Some(transport) => transport.send(command.frame()),
            None => Err(TransportError::Closed),
        };

        match (Outcome::classify(&result), &result) {
            (Outcome::Ok, Ok(Frame::Simple(_))) => true,
            (Outcome::ServerCrash, _) => {
                warn!("server crashed during handshake");
                self.mark_crash();
                false
            }
            (outcome, _) => {
                warn!(?outcome, "handshake refused");
                self.disconnect();
                false
            }
        }
    }
}

impl<C: Connector> fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("connected", &self.transport.is_some())
            .field("crash", &self.crash)
            .field("current_database", &self.current_database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockConnector;
    use std::io;

    fn manager(config: ClientConfig) -> (ConnectionManager<MockConnector>, MockConnector) {
        let connector = MockConnector::new();
        (ConnectionManager::new(config, connector.clone()), connector)
    }

    #[test]
    fn connected_manager_does_no_io() {
        let (mut manager, connector) = manager(ClientConfig::default());
        assert!(manager.ensure_connected());
        assert!(manager.ensure_connected());
        assert!(manager.connect());

        let script = connector.script.borrow();
        assert_eq!(script.open_calls, 1);
        assert!(script.sent.is_empty());
    }

    #[test]
    fn plain_connect_skips_auth_and_select() {
        let (mut manager, connector) = manager(ClientConfig::default());
        assert!(manager.connect());
        assert!(connector.script.borrow().sent.is_empty());
    }

    #[test]
    fn timeouts_are_handed_to_the_transport() {
        let config = ClientConfig::default()
            .connection_timeout(Duration::from_micros(250))
            .operation_timeout(Duration::from_millis(40));
        let (mut manager, connector) = manager(config);
        assert!(manager.connect());

        let script = connector.script.borrow();
        assert_eq!(script.open_timeouts, vec![Some(Duration::from_micros(250))]);
        assert_eq!(script.applied_timeouts, vec![Some(Duration::from_millis(40))]);
    }

    #[test]
    fn zero_timeouts_are_not_applied() {
        let config = ClientConfig::default()
            .connection_timeout(Duration::ZERO)
            .operation_timeout(Duration::ZERO);
        let (mut manager, connector) = manager(config);
        assert!(manager.connect());

        let script = connector.script.borrow();
        assert_eq!(script.open_timeouts, vec![None]);
        assert!(script.applied_timeouts.is_empty());
    }

    #[test]
    fn zero_timeouts_in_config_fields_are_not_applied() {
        let mut config = ClientConfig::default();
        config.connection_timeout = Some(Duration::ZERO);
        config.operation_timeout = Some(Duration::ZERO);
        let (mut manager, connector) = manager(config);
        assert!(manager.connect());

        let script = connector.script.borrow();
        assert_eq!(script.open_timeouts, vec![None]);
        assert!(script.applied_timeouts.is_empty());
    }

    #[test]
    fn zero_timeout_setters_disable_the_timeouts() {
        let (mut manager, connector) = manager(ClientConfig::default());
        manager.set_connection_timeout(Some(Duration::ZERO));
        manager.set_operation_timeout(Some(Duration::ZERO));
        assert_eq!(manager.config().connection_timeout, None);
        assert_eq!(manager.config().operation_timeout, None);

        assert!(manager.connect());
        let script = connector.script.borrow();
        assert_eq!(script.open_timeouts, vec![None]);
        assert!(script.applied_timeouts.is_empty());
    }

    #[test]
    fn failing_to_apply_timeout_tears_down() {
        let (mut manager, connector) = manager(ClientConfig::default());
        connector.script.borrow_mut().fail_set_timeout = true;

        assert!(!manager.connect());
        assert!(!manager.is_connected());
        assert_eq!(manager.crash_mark().count(), 0);
    }

    #[test]
    fn auth_then_select_then_no_reauth() {
        let config = ClientConfig::default().password("secret").database(2);
        let (mut manager, connector) = manager(config);
        connector.push_status("OK").push_status("OK");

        assert!(manager.connect());
        assert!(manager.is_connected());
        assert!(manager.ensure_connected());

        let script = connector.script.borrow();
        assert_eq!(
            script.sent,
            vec![
                vec!["AUTH".to_string(), "secret".to_string()],
                vec!["SELECT".to_string(), "2".to_string()],
            ]
        );
        assert_eq!(script.open_calls, 1);
    }

    #[test]
    fn rejected_auth_leaves_no_connection() {
        let config = ClientConfig::default().password("wrong");
        let (mut manager, connector) = manager(config);
        connector.push_reply(Ok(Frame::Error("WRONGPASS invalid password".into())));

        assert!(!manager.connect());
        assert!(!manager.is_connected());
        assert_eq!(manager.crash_mark().count(), 0);
    }

    #[test]
    fn auth_needs_a_status_reply() {
        let config = ClientConfig::default().password("secret");
        let (mut manager, connector) = manager(config);
        connector.push_reply(Ok(Frame::Integer(1)));

        assert!(!manager.connect());
        assert!(!manager.is_connected());
    }

    #[test]
    fn auth_status_must_be_ok() {
        let config = ClientConfig::default().password("secret");
        let (mut manager, connector) = manager(config);
        connector.push_status("NOPE");

        assert!(!manager.connect());
        assert!(!manager.is_connected());
    }

    #[test]
    fn crash_during_select_marks_crash() {
        let config = ClientConfig::default().database(3);
        let (mut manager, connector) = manager(config);
        connector.push_io_error();

        assert!(!manager.connect());
        assert!(!manager.is_connected());
        assert_eq!(manager.crash_mark().count(), 1);
    }

    #[test]
    fn unreachable_server_marks_crash() {
        let (mut manager, connector) = manager(ClientConfig::default());
        connector.push_open(Err(TransportError::Io(io::Error::from(
            io::ErrorKind::ConnectionRefused,
        ))));

        assert!(!manager.connect());
        assert_eq!(manager.crash_mark().count(), 1);
    }

    #[test]
    fn unresolvable_host_does_not_mark_crash() {
        let (mut manager, connector) = manager(ClientConfig::default());
        connector.push_open(Err(TransportError::Resolve("nowhere.invalid".into())));

        assert!(!manager.connect());
        assert!(!manager.is_connected());
        assert_eq!(manager.crash_mark().count(), 0);
    }

    #[test]
    fn backoff_gate_blocks_without_io() {
        let config = ClientConfig::default().reconnection_interval(Duration::from_secs(60));
        let (mut manager, connector) = manager(config);
        manager.crash.record();

        assert!(!manager.ensure_connected());
        assert_eq!(connector.script.borrow().open_calls, 0);
    }

    #[test]
    fn backoff_gate_opens_after_interval() {
        let interval = Duration::from_millis(2);
        let config = ClientConfig::default().reconnection_interval(interval);
        let (mut manager, connector) = manager(config);
        manager.crash.record_at(Instant::now());

        std::thread::sleep(interval * 3);
        assert!(!manager.crash.is_backing_off(interval, Instant::now()));

        assert!(manager.ensure_connected());
        assert_eq!(connector.script.borrow().open_calls, 1);
    }

    #[test]
    fn connect_bypasses_backoff_gate() {
        let config = ClientConfig::default().reconnection_interval(Duration::from_secs(60));
        let (mut manager, connector) = manager(config);
        manager.crash.record();

        assert!(manager.connect());
        assert_eq!(connector.script.borrow().open_calls, 1);
        assert_eq!(manager.crash_mark().count(), 1);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut manager, _connector) = manager(ClientConfig::default());
        manager.disconnect();
        assert!(manager.connect());
        manager.disconnect();
        manager.disconnect();
        assert!(!manager.is_connected());
    }

    #[test]
    fn selected_database_survives_reconnect() {
        let (mut manager, connector) = manager(ClientConfig::default());
        connector.push_status("OK");

        manager.select(5).unwrap();
        assert_eq!(manager.current_database(), 5);

        manager.disconnect();
        connector.push_status("OK");
        assert!(manager.connect());

        let script = connector.script.borrow();
        assert_eq!(script.sent_names(), vec!["SELECT", "SELECT"]);
        assert_eq!(script.sent[1][1], "5");
    }

    #[test]
    fn refused_select_keeps_database_and_connection() {
        let (mut manager, connector) = manager(ClientConfig::default().database(1));
        connector
            .push_status("OK")
            .push_reply(Ok(Frame::Error("ERR DB index is out of range".into())));

        assert!(matches!(manager.select(99), Err(Error::Rejected(_))));
        assert_eq!(manager.current_database(), 1);
        assert!(manager.is_connected());
    }
}
