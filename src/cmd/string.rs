use crate::cmd::{
    into_count, into_float, into_int, into_optional_bulk, into_optional_bulks, into_unit, Command,
};
use crate::transport::Connector;
use crate::Client;

use bytes::Bytes;

impl<C: Connector> Client<C> {
    /// Set `key` to hold `value`, discarding any previous value and TTL.
    pub fn set(&mut self, key: &str, value: Bytes) -> crate::Result<()> {
        let reply = self.execute(&Command::new("SET").arg(key).arg(value))?;
        into_unit(reply)
    }

    /// Get the value of `key`. `None` if the key does not exist.
    pub fn get(&mut self, key: &str) -> crate::Result<Option<Bytes>> {
        let reply = self.execute(&Command::new("GET").arg(key))?;
        into_optional_bulk(reply)
    }

    /// Set several keys at once.
    pub fn mset(&mut self, entries: &[(&str, Bytes)]) -> crate::Result<()> {
        let mut command = Command::new("MSET");
        for (key, value) in entries {
            command = command.arg(key).arg(value);
        }
        into_unit(self.execute(&command)?)
    }

    /// Get several keys at once. Missing keys yield `None` in their slot.
    pub fn mget(&mut self, keys: &[&str]) -> crate::Result<Vec<Option<Bytes>>> {
        let reply = self.execute(&Command::new("MGET").args(keys))?;
        into_optional_bulks(reply)
    }

    /// Set `key` to `value` and return the old value.
    pub fn getset(&mut self, key: &str, value: Bytes) -> crate::Result<Option<Bytes>> {
        let reply = self.execute(&Command::new("GETSET").arg(key).arg(value))?;
        into_optional_bulk(reply)
    }

    pub fn strlen(&mut self, key: &str) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("STRLEN").arg(key))?;
        into_count(reply)
    }

    /// Increment the integer at `key` and return the new value.
    pub fn incr(&mut self, key: &str) -> crate::Result<i64> {
        let reply = self.execute(&Command::new("INCR").arg(key))?;
        into_int(reply)
    }

    pub fn incr_by(&mut self, key: &str, increment: i64) -> crate::Result<i64> {
        let reply = self.execute(&Command::new("INCRBY").arg(key).arg_int(increment))?;
        into_int(reply)
    }

    pub fn incr_by_float(&mut self, key: &str, increment: f64) -> crate::Result<f64> {
        let reply = self.execute(&Command::new("INCRBYFLOAT").arg(key).arg_float(increment))?;
        into_float(reply)
    }

    pub fn decr(&mut self, key: &str) -> crate::Result<i64> {
        let reply = self.execute(&Command::new("DECR").arg(key))?;
        into_int(reply)
    }

    pub fn decr_by(&mut self, key: &str, decrement: i64) -> crate::Result<i64> {
        let reply = self.execute(&Command::new("DECRBY").arg(key).arg_int(decrement))?;
        into_int(reply)
    }

    /// Append `value` to the string at `key`. Returns the new length.
    pub fn append(&mut self, key: &str, value: Bytes) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("APPEND").arg(key).arg(value))?;
        into_count(reply)
    }
}
