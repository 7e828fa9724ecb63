//! Scripted in-memory transport for unit tests.

use crate::transport::{Connector, Transport, TransportError};
use crate::Frame;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

/// Shared record of everything the core asked the transport to do.
#[derive(Debug, Default)]
pub(crate) struct Script {
    /// Results handed out by successive `open` calls; `Ok` once exhausted.
    pub(crate) opens: VecDeque<Result<(), TransportError>>,
    /// Replies handed out by successive `send` calls; `Eof` once exhausted.
    pub(crate) replies: VecDeque<Result<Frame, TransportError>>,
    pub(crate) fail_set_timeout: bool,

    pub(crate) open_calls: usize,
    pub(crate) open_timeouts: Vec<Option<Duration>>,
    pub(crate) applied_timeouts: Vec<Option<Duration>>,
    pub(crate) sent: Vec<Vec<String>>,
}

impl Script {
    /// Names of the commands sent so far, e.g. `["AUTH", "GET"]`.
    pub(crate) fn sent_names(&self) -> Vec<&str> {
        self.sent.iter().map(|args| args[0].as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockConnector {
    pub(crate) script: Rc<RefCell<Script>>,
}

#[derive(Debug)]
pub(crate) struct MockTransport {
    script: Rc<RefCell<Script>>,
}

impl MockConnector {
    pub(crate) fn new() -> MockConnector {
        MockConnector::default()
    }

    pub(crate) fn push_open(&self, result: Result<(), TransportError>) -> &Self {
        self.script.borrow_mut().opens.push_back(result);
        self
    }

    pub(crate) fn push_reply(&self, reply: Result<Frame, TransportError>) -> &Self {
        self.script.borrow_mut().replies.push_back(reply);
        self
    }

    pub(crate) fn push_status(&self, text: &str) -> &Self {
        self.push_reply(Ok(Frame::Simple(text.to_string())))
    }

    pub(crate) fn push_io_error(&self) -> &Self {
        self.push_reply(Err(io_error()))
    }
}

pub(crate) fn io_error() -> TransportError {
    TransportError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn open(
        &mut self,
        _host: &str,
        _port: u16,
        timeout: Option<Duration>,
    ) -> Result<MockTransport, TransportError> {
        let mut script = self.script.borrow_mut();
        script.open_calls += 1;
        script.open_timeouts.push(timeout);
        script.opens.pop_front().unwrap_or(Ok(()))?;

        Ok(MockTransport {
            script: self.script.clone(),
        })
    }
}

impl Transport for MockTransport {
    fn send(&mut self, command: &Frame) -> Result<Frame, TransportError> {
        let mut script = self.script.borrow_mut();
        let args = match command {
            Frame::Array(parts) => parts
                .iter()
                .map(|part| match part {
                    Frame::Bulk(data) => String::from_utf8_lossy(data).into_owned(),
                    other => other.to_string(),
                })
                .collect(),
            other => vec![other.to_string()],
        };
        script.sent.push(args);
        script.replies.pop_front().unwrap_or(Err(TransportError::Eof))
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        let mut script = self.script.borrow_mut();
        if script.fail_set_timeout {
            return Err(TransportError::Protocol("timeout rejected".into()));
        }
        script.applied_timeouts.push(timeout);
        Ok(())
    }
}
