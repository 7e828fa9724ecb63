use crate::transport::TransportError;
use crate::Frame;

/// What a single exchange with the server amounts to.
///
/// The classification drives both the retry policy of the executor and the
/// crash backoff of the connection manager. It is computed per reply and never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A usable reply.
    Ok,

    /// The server understood the request and refused it: an error reply, or a
    /// status reply other than `OK`. The connection is healthy.
    ApplicationError,

    /// No reply, for a reason other than the server going away: the host did
    /// not resolve, the stream was garbled, or there is no transport at all.
    ConnectionFailure,

    /// No reply because of an I/O error or an unexpected end of stream. The
    /// server is presumed dead or unreachable.
    ServerCrash,
}

impl Outcome {
    /// Classify the result of one send.
    pub fn classify(result: &Result<Frame, TransportError>) -> Outcome {
        match result {
            Ok(reply) => Outcome::of_reply(reply),
            Err(err) => Outcome::of_error(err),
        }
    }

    /// Classify a reply that was received.
    pub fn of_reply(reply: &Frame) -> Outcome {
        match reply {
            Frame::Error(_) => Outcome::ApplicationError,
            Frame::Simple(text) if !text.eq_ignore_ascii_case("OK") => Outcome::ApplicationError,
            _ => Outcome::Ok,
        }
    }

    /// Classify a failure to obtain a reply, or to open a transport.
    pub fn of_error(err: &TransportError) -> Outcome {
        if err.is_crash() {
            Outcome::ServerCrash
        } else {
            Outcome::ConnectionFailure
        }
    }

    /// Whether a reconnect-and-retry may help.
    pub fn is_transient(self) -> bool {
        matches!(self, Outcome::ConnectionFailure | Outcome::ServerCrash)
    }
}
