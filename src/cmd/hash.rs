use crate::cmd::{
    into_bool, into_bulks, into_count, into_float, into_int, into_optional_bulk,
    into_optional_bulks, into_pairs, into_unit, Command,
};
use crate::transport::Connector;
use crate::Client;

use bytes::Bytes;

impl<C: Connector> Client<C> {
    /// Set `field` of the hash at `key`. Returns `true` if the field is new.
    pub fn hset(&mut self, key: &str, field: &str, value: Bytes) -> crate::Result<bool> {
        let reply = self.execute(&Command::new("HSET").arg(key).arg(field).arg(value))?;
        into_bool(reply)
    }

    pub fn hget(&mut self, key: &str, field: &str) -> crate::Result<Option<Bytes>> {
        let reply = self.execute(&Command::new("HGET").arg(key).arg(field))?;
        into_optional_bulk(reply)
    }

    pub fn hmset(&mut self, key: &str, entries: &[(&str, Bytes)]) -> crate::Result<()> {
        let mut command = Command::new("HMSET").arg(key);
        for (field, value) in entries {
            command = command.arg(field).arg(value);
        }
        into_unit(self.execute(&command)?)
    }

    /// Values of `fields`, `None` for the missing ones.
    pub fn hmget(&mut self, key: &str, fields: &[&str]) -> crate::Result<Vec<Option<Bytes>>> {
        let reply = self.execute(&Command::new("HMGET").arg(key).args(fields))?;
        into_optional_bulks(reply)
    }

    pub fn hlen(&mut self, key: &str) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("HLEN").arg(key))?;
        into_count(reply)
    }

    pub fn hkeys(&mut self, key: &str) -> crate::Result<Vec<Bytes>> {
        let reply = self.execute(&Command::new("HKEYS").arg(key))?;
        into_bulks(reply)
    }

    pub fn hvals(&mut self, key: &str) -> crate::Result<Vec<Bytes>> {
        let reply = self.execute(&Command::new("HVALS").arg(key))?;
        into_bulks(reply)
    }

    /// Every `(field, value)` pair of the hash.
    pub fn hgetall(&mut self, key: &str) -> crate::Result<Vec<(Bytes, Bytes)>> {
        let reply = self.execute(&Command::new("HGETALL").arg(key))?;
        into_pairs(reply)
    }

    pub fn hexists(&mut self, key: &str, field: &str) -> crate::Result<bool> {
        let reply = self.execute(&Command::new("HEXISTS").arg(key).arg(field))?;
        into_bool(reply)
    }

    /// Remove `fields`. Returns how many existed.
    pub fn hdel(&mut self, key: &str, fields: &[&str]) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("HDEL").arg(key).args(fields))?;
        into_count(reply)
    }

    pub fn hincr_by(&mut self, key: &str, field: &str, increment: i64) -> crate::Result<i64> {
        let command = Command::new("HINCRBY")
            .arg(key)
            .arg(field)
            .arg_int(increment);
        into_int(self.execute(&command)?)
    }

    pub fn hincr_by_float(&mut self, key: &str, field: &str, increment: f64) -> crate::Result<f64> {
        let command = Command::new("HINCRBYFLOAT")
            .arg(key)
            .arg(field)
            .arg_float(increment);
        into_float(self.execute(&command)?)
    }
}
