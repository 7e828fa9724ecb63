//! Provides a type representing a Redis protocol frame as well as utilities for
//! parsing frames from a byte array

use bytes::{Buf, Bytes};
use std::convert::TryInto;
use std::fmt;
use std::io::Cursor;
use std::num::TryFromIntError;
use std::string::FromUtf8Error;

/// A frame in the Redis protocol
///
/// Replies from the server are decoded into this tree. `Simple` is the
/// status reply (`+OK`), `Null` covers both the nil bulk string and the nil
/// array.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

#[derive(Debug)]
pub enum Error {
    /// Not enough data is available to parse a message
    Incomplete,

    /// Invalid message encoding
    Other(String),
}

impl Frame {
    /// Returns an empty array
    pub(crate) fn array() -> Frame {
        Frame::Array(vec![])
    }

    /// Push a "bulk" frame into the array. `self` must be an Array frame.
    ///
    /// # Panics
    ///
    /// panics if `self` is not an array
    pub(crate) fn push_bulk(&mut self, bytes: Bytes) {
        match self {
            Frame::Array(vec) => {
                vec.push(Frame::Bulk(bytes));
            }
            _ => panic!("not an array frame"),
        }
    }

    /// Checks if an entire message can be decoded from `src`
    pub fn check(src: &mut Cursor<&[u8]>) -> Result<(), Error> {
        match get_u8(src)? {
            b'+' | b'-' => {
                get_line(src)?;
                Ok(())
            }
            b':' => {
                let _ = get_signed(src)?;
                Ok(())
            }
            b'$' => {
                let len = get_signed(src)?;
                if len < 0 {
                    // `$-1\r\n` is a nil bulk string
                    return Ok(());
                }
                let len: usize = len.try_into()?;
                skip(src, len)?;
                expect_crlf(src)
            }
            b'*' => {
                let len = get_signed(src)?;
                for _ in 0..len.max(0) {
                    Frame::check(src)?;
                }
                Ok(())
            }
            actual => Err(format!("protocol error; invalid frame type byte `{}`", actual).into()),
        }
    }

    /// The message has already been validated with `check`.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Frame, Error> {
        match get_u8(src)? {
            b'+' => {
                let line = get_line(src)?.to_vec();
                let string = String::from_utf8(line)?;
                Ok(Frame::Simple(string))
            }
            b'-' => {
                let line = get_line(src)?.to_vec();
                let string = String::from_utf8(line)?;
                Ok(Frame::Error(string))
            }
            b':' => {
                let value = get_signed(src)?;
                Ok(Frame::Integer(value))
            }
            b'$' => {
                let len = get_signed(src)?;
                if len < 0 {
                    return Ok(Frame::Null);
                }
                let len: usize = len.try_into()?;

                if src.remaining() < len {
                    return Err(Error::Incomplete);
                }

                let data = Bytes::copy_from_slice(&src.chunk()[..len]);
                skip(src, len)?;
                expect_crlf(src)?;

                Ok(Frame::Bulk(data))
            }
            b'*' => {
                let len = get_signed(src)?;
                if len < 0 {
                    return Ok(Frame::Null);
                }
                let len: usize = len.try_into()?;
                let mut out = Vec::with_capacity(len);

                for _ in 0..len {
                    out.push(Frame::parse(src)?);
                }

                Ok(Frame::Array(out))
            }
            actual => Err(format!("protocol error; invalid frame type byte `{}`", actual).into()),
        }
    }

    /// Text of a status reply, if this is one.
    pub fn as_status(&self) -> Option<&str> {
        match self {
            Frame::Simple(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use std::str;

        match self {
            Frame::Simple(response) => response.fmt(fmt),
            Frame::Error(msg) => write!(fmt, "(error) {}", msg),
            Frame::Integer(num) => write!(fmt, "(integer) {}", num),
            Frame::Bulk(msg) => match str::from_utf8(msg) {
                Ok(string) => write!(fmt, "\"{}\"", string),
                Err(_) => write!(fmt, "{:?}", msg),
            },
            Frame::Null => "(nil)".fmt(fmt),
            Frame::Array(parts) => {
                if parts.is_empty() {
                    return "(empty array)".fmt(fmt);
                }
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        writeln!(fmt)?;
                    }
                    write!(fmt, "{}) {}", i + 1, part)?;
                }
                Ok(())
            }
        }
    }
}

/// Read the byte under the cursor and advance by one
fn get_u8(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }

    Ok(src.get_u8())
}

/// Advance the cursor by `n` bytes
fn skip(src: &mut Cursor<&[u8]>, n: usize) -> Result<(), Error> {
    if src.remaining() < n {
        return Err(Error::Incomplete);
    }

    src.advance(n);
    Ok(())
}

/// Consume the `\r\n` that ends a bulk payload
fn expect_crlf(src: &mut Cursor<&[u8]>) -> Result<(), Error> {
    if src.remaining() < 2 {
        return Err(Error::Incomplete);
    }

    if &src.chunk()[..2] != b"\r\n" {
        return Err("protocol error; bulk string not terminated by CRLF".into());
    }

    src.advance(2);
    Ok(())
}

/// Read a line holding a signed decimal
fn get_signed(src: &mut Cursor<&[u8]>) -> Result<i64, Error> {
    use atoi::atoi;

    let line = get_line(src)?;
    atoi::<i64>(line).ok_or_else(|| "protocol error; invalid frame format".into())
}

/// Find a line terminated by `\r\n`
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len().saturating_sub(1);

    for i in start..end {
        if src.get_ref()[i] == b'\r' && src.get_ref()[i + 1] == b'\n' {
            src.set_position((i + 2) as u64);
            return Ok(&src.get_ref()[start..i]);
        }
    }

    Err(Error::Incomplete)
}

impl From<String> for Error {
    fn from(value: String) -> Error {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Error {
        value.to_string().into()
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_value: FromUtf8Error) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl From<TryFromIntError> for Error {
    fn from(_value: TryFromIntError) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Incomplete => "stream ended early".fmt(f),
            Error::Other(err) => err.fmt(f),
        }
    }
}
