//! Running one command with classification and a single retry.

use crate::cmd::Command;
use crate::transport::{Connector, Transport, TransportError};
use crate::{ConnectionManager, Error, Frame, Outcome};

use tracing::{debug, instrument, warn};

/// Executes fully built commands against the manager's connection.
///
/// Every call makes at most two round trips and at most one reconnection
/// handshake:
///
/// * an `Ok` reply is returned as is;
/// * an application error is returned without retrying, since the same
///   command would be refused again;
/// * a crash or connection failure drops the connection, reconnects once
///   (ignoring the backoff window, the caller is waiting) and resends once.
///   Whatever the second attempt yields is final.
#[derive(Debug)]
pub struct CommandExecutor<'a, C: Connector> {
    manager: &'a mut ConnectionManager<C>,
}

impl<'a, C: Connector> CommandExecutor<'a, C> {
    pub fn new(manager: &'a mut ConnectionManager<C>) -> CommandExecutor<'a, C> {
        CommandExecutor { manager }
    }

    #[instrument(skip_all, fields(command = command.name()))]
    pub fn execute(&mut self, command: &Command) -> crate::Result<Frame> {
        if !self.manager.ensure_connected() {
            debug!("no connection available");
            return Err(Error::Unavailable);
        }

        let outcome = match self.attempt(command) {
            Ok(reply) => return Ok(reply),
            Err(Failure::Rejected(msg)) => return Err(Error::Rejected(msg)),
            Err(Failure::Transient(outcome)) => outcome,
        };

        warn!(?outcome, "command failed; reconnecting once");
        self.drop_connection(outcome);

        if !self.manager.connect() {
            return Err(Error::Unavailable);
        }

        match self.attempt(command) {
            Ok(reply) => Ok(reply),
            Err(Failure::Rejected(msg)) => Err(Error::Rejected(msg)),
            Err(Failure::Transient(outcome)) => {
                warn!(?outcome, "retry failed");
                self.drop_connection(outcome);
                Err(Error::Unavailable)
            }
        }
    }

    /// Send once and classify.
    fn attempt(&mut self, command: &Command) -> Result<Frame, Failure> {
        let result = match self.manager.transport_mut() {
            Some(transport) => transport.send(command.frame()),
            None => Err(TransportError::Closed),
        };

        let outcome = Outcome::classify(&result);
        if outcome.is_transient() {
            if let Err(err) = &result {
                debug!(%err, "transport error");
            }
            return Err(Failure::Transient(outcome));
        }

        match result {
            Ok(reply) if outcome == Outcome::Ok => Ok(reply),
            Ok(Frame::Error(msg)) | Ok(Frame::Simple(msg)) => {
                debug!(%msg, "command refused by server");
                Err(Failure::Rejected(msg))
            }
            // Errors always classify as transient.
            _ => Err(Failure::Transient(Outcome::ConnectionFailure)),
        }
    }

    fn drop_connection(&mut self, outcome: Outcome) {
        if outcome == Outcome::ServerCrash {
            self.manager.mark_crash();
        } else {
            self.manager.disconnect();
        }
    }
}

enum Failure {
    Rejected(String),
    Transient(Outcome),
}
