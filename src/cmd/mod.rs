//! Commands and the typed wrappers built on top of them.
//!
//! A wrapper is three steps: build a [`Command`], run it through
//! [`Client::execute`](crate::Client::execute), decode the reply. Retry and
//! backoff live in the executor, so wrappers never deal with them.

use crate::{Error, Frame};

use bytes::Bytes;
use std::borrow::Cow;
use std::fmt;
use std::str;

mod hash;
mod keys;
mod list;
mod set;
mod string;
mod zset;

/// A command name plus its arguments, encoded as an array of bulk strings.
#[derive(Clone)]
pub struct Command {
    name: Cow<'static, str>,
    frame: Frame,
}

impl Command {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Command {
        let name = name.into();
        let mut frame = Frame::array();
        frame.push_bulk(Bytes::copy_from_slice(name.as_bytes()));
        Command { name, frame }
    }

    /// Append one argument.
    pub fn arg(mut self, value: impl AsRef<[u8]>) -> Command {
        self.frame.push_bulk(Bytes::copy_from_slice(value.as_ref()));
        self
    }

    /// Append every item of `values`.
    pub fn args<I>(mut self, values: I) -> Command
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        for value in values {
            self = self.arg(value);
        }
        self
    }

    pub fn arg_int(self, value: i64) -> Command {
        self.arg(value.to_string())
    }

    pub fn arg_float(self, value: f64) -> Command {
        self.arg(value.to_string())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn frame(&self) -> &Frame {
        &self.frame
    }
}

// Arguments may hold a password; only the shape is printed.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = match &self.frame {
            Frame::Array(parts) => parts.len().saturating_sub(1),
            _ => 0,
        };
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("args", &args)
            .finish()
    }
}

// Reply decoders shared by the wrappers.

pub(crate) fn into_unit(reply: Frame) -> crate::Result<()> {
    match reply {
        Frame::Simple(_) => Ok(()),
        _ => Err(Error::UnexpectedReply),
    }
}

pub(crate) fn into_int(reply: Frame) -> crate::Result<i64> {
    match reply {
        Frame::Integer(value) => Ok(value),
        _ => Err(Error::UnexpectedReply),
    }
}

pub(crate) fn into_count(reply: Frame) -> crate::Result<u64> {
    u64::try_from(into_int(reply)?).map_err(|_| Error::UnexpectedReply)
}

pub(crate) fn into_bool(reply: Frame) -> crate::Result<bool> {
    Ok(into_int(reply)? == 1)
}

/// `None` for a nil reply.
pub(crate) fn into_optional_int(reply: Frame) -> crate::Result<Option<i64>> {
    match reply {
        Frame::Null => Ok(None),
        reply => into_int(reply).map(Some),
    }
}

/// `None` for a nil reply.
pub(crate) fn into_optional_bulk(reply: Frame) -> crate::Result<Option<Bytes>> {
    match reply {
        Frame::Bulk(data) => Ok(Some(data)),
        Frame::Null => Ok(None),
        _ => Err(Error::UnexpectedReply),
    }
}

/// Floats travel as bulk strings.
pub(crate) fn into_float(reply: Frame) -> crate::Result<f64> {
    match reply {
        Frame::Bulk(data) => parse_float(&data),
        _ => Err(Error::UnexpectedReply),
    }
}

pub(crate) fn into_optional_float(reply: Frame) -> crate::Result<Option<f64>> {
    match reply {
        Frame::Null => Ok(None),
        reply => into_float(reply).map(Some),
    }
}

/// A nil array decodes as empty.
pub(crate) fn into_array(reply: Frame) -> crate::Result<Vec<Frame>> {
    match reply {
        Frame::Array(items) => Ok(items),
        Frame::Null => Ok(Vec::new()),
        _ => Err(Error::UnexpectedReply),
    }
}

pub(crate) fn into_bulks(reply: Frame) -> crate::Result<Vec<Bytes>> {
    into_array(reply)?
        .into_iter()
        .map(|item| match item {
            Frame::Bulk(data) => Ok(data),
            _ => Err(Error::UnexpectedReply),
        })
        .collect()
}

pub(crate) fn into_optional_bulks(reply: Frame) -> crate::Result<Vec<Option<Bytes>>> {
    into_array(reply)?
        .into_iter()
        .map(into_optional_bulk)
        .collect()
}

/// A flat `[a1, b1, a2, b2, ..]` array, as pairs.
pub(crate) fn into_pairs(reply: Frame) -> crate::Result<Vec<(Bytes, Bytes)>> {
    let items = into_bulks(reply)?;
    if items.len() % 2 != 0 {
        return Err(Error::UnexpectedReply);
    }

    let mut pairs = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(first), Some(second)) = (iter.next(), iter.next()) {
        pairs.push((first, second));
    }
    Ok(pairs)
}

/// A `WITHSCORES` reply, as `(member, score)` pairs.
pub(crate) fn into_scored(reply: Frame) -> crate::Result<Vec<(Bytes, f64)>> {
    into_pairs(reply)?
        .into_iter()
        .map(|(member, score)| Ok((member, parse_float(&score)?)))
        .collect()
}

fn parse_float(data: &[u8]) -> crate::Result<f64> {
    str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or(Error::UnexpectedReply)
}
