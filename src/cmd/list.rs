use crate::cmd::{into_bulks, into_count, into_optional_bulk, into_unit, Command};
use crate::transport::Connector;
use crate::Client;

use bytes::Bytes;

impl<C: Connector> Client<C> {
    /// Push `values` onto the head of the list. Returns the new length.
    pub fn lpush(&mut self, key: &str, values: &[Bytes]) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("LPUSH").arg(key).args(values))?;
        into_count(reply)
    }

    /// Push `values` onto the tail of the list. Returns the new length.
    pub fn rpush(&mut self, key: &str, values: &[Bytes]) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("RPUSH").arg(key).args(values))?;
        into_count(reply)
    }

    pub fn lpop(&mut self, key: &str) -> crate::Result<Option<Bytes>> {
        let reply = self.execute(&Command::new("LPOP").arg(key))?;
        into_optional_bulk(reply)
    }

    pub fn rpop(&mut self, key: &str) -> crate::Result<Option<Bytes>> {
        let reply = self.execute(&Command::new("RPOP").arg(key))?;
        into_optional_bulk(reply)
    }

    pub fn llen(&mut self, key: &str) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("LLEN").arg(key))?;
        into_count(reply)
    }

    /// Element at `index`; negative indexes count from the tail.
    pub fn lindex(&mut self, key: &str, index: i64) -> crate::Result<Option<Bytes>> {
        let reply = self.execute(&Command::new("LINDEX").arg(key).arg_int(index))?;
        into_optional_bulk(reply)
    }

    /// Elements from `start` to `stop`, both inclusive.
    pub fn lrange(&mut self, key: &str, start: i64, stop: i64) -> crate::Result<Vec<Bytes>> {
        let command = Command::new("LRANGE").arg(key).arg_int(start).arg_int(stop);
        into_bulks(self.execute(&command)?)
    }

    /// Remove up to `count` occurrences of `value` (all of them when 0, from
    /// the tail when negative). Returns how many were removed.
    pub fn lrem(&mut self, key: &str, count: i64, value: Bytes) -> crate::Result<u64> {
        let command = Command::new("LREM").arg(key).arg_int(count).arg(value);
        into_count(self.execute(&command)?)
    }

    /// Keep only the elements from `start` to `stop`.
    pub fn ltrim(&mut self, key: &str, start: i64, stop: i64) -> crate::Result<()> {
        let command = Command::new("LTRIM").arg(key).arg_int(start).arg_int(stop);
        into_unit(self.execute(&command)?)
    }
}
