use crate::DEFAULT_PORT;

use std::fmt;
use std::time::Duration;

/// Default wait after a crash before reconnecting is attempted again.
pub const DEFAULT_RECONNECTION_INTERVAL: Duration = Duration::from_secs(1);

/// Default bound on opening the connection and on each command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1000);

/// Everything needed to reach and prepare the server connection.
///
/// The timeouts and the reconnection interval may be changed between calls
/// through the setters on [`Client`](crate::Client); the rest is fixed once
/// the client is built.
#[derive(Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,

    /// Sent with `AUTH` on every new connection.
    pub password: Option<String>,

    /// Database index selected on every new connection; 0 is the server
    /// default and needs no `SELECT`.
    pub database: u32,

    /// After a crash, reconnecting is refused until this much time has passed.
    pub reconnection_interval: Duration,

    /// `None` or zero waits for the operating system's own connect timeout.
    pub connection_timeout: Option<Duration>,

    /// `None` or zero lets a command wait forever for its reply.
    pub operation_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> ClientConfig {
        ClientConfig {
            host: host.into(),
            port,
            ..ClientConfig::default()
        }
    }

    /// An empty password disables authentication.
    pub fn password(mut self, password: impl Into<String>) -> ClientConfig {
        let password = password.into();
        self.password = if password.is_empty() {
            None
        } else {
            Some(password)
        };
        self
    }

    pub fn database(mut self, database: u32) -> ClientConfig {
        self.database = database;
        self
    }

    pub fn reconnection_interval(mut self, interval: Duration) -> ClientConfig {
        self.reconnection_interval = interval;
        self
    }

    /// A zero duration disables the timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> ClientConfig {
        self.connection_timeout = non_zero(timeout);
        self
    }

    /// A zero duration disables the timeout.
    pub fn operation_timeout(mut self, timeout: Duration) -> ClientConfig {
        self.operation_timeout = non_zero(timeout);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            password: None,
            database: 0,
            reconnection_interval: DEFAULT_RECONNECTION_INTERVAL,
            connection_timeout: Some(DEFAULT_TIMEOUT),
            operation_timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("reconnection_interval", &self.reconnection_interval)
            .field("connection_timeout", &self.connection_timeout)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

/// Zero means "no timeout" throughout the configuration.
pub(crate) fn non_zero(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() {
        None
    } else {
        Some(timeout)
    }
}
