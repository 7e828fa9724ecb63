use crate::cmd::{into_bool, into_bulks, into_count, into_optional_bulk, Command};
use crate::transport::Connector;
use crate::Client;

use bytes::Bytes;

impl<C: Connector> Client<C> {
    /// Add `members` to the set. Returns how many were not already there.
    pub fn sadd(&mut self, key: &str, members: &[Bytes]) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("SADD").arg(key).args(members))?;
        into_count(reply)
    }

    /// Remove and return a random member.
    pub fn spop(&mut self, key: &str) -> crate::Result<Option<Bytes>> {
        let reply = self.execute(&Command::new("SPOP").arg(key))?;
        into_optional_bulk(reply)
    }

    pub fn scard(&mut self, key: &str) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("SCARD").arg(key))?;
        into_count(reply)
    }

    /// Members of the first set that are in none of the others.
    pub fn sdiff(&mut self, keys: &[&str]) -> crate::Result<Vec<Bytes>> {
        let reply = self.execute(&Command::new("SDIFF").args(keys))?;
        into_bulks(reply)
    }

    pub fn sinter(&mut self, keys: &[&str]) -> crate::Result<Vec<Bytes>> {
        let reply = self.execute(&Command::new("SINTER").args(keys))?;
        into_bulks(reply)
    }

    pub fn sunion(&mut self, keys: &[&str]) -> crate::Result<Vec<Bytes>> {
        let reply = self.execute(&Command::new("SUNION").args(keys))?;
        into_bulks(reply)
    }

    pub fn sismember(&mut self, key: &str, member: Bytes) -> crate::Result<bool> {
        let reply = self.execute(&Command::new("SISMEMBER").arg(key).arg(member))?;
        into_bool(reply)
    }

    pub fn smembers(&mut self, key: &str) -> crate::Result<Vec<Bytes>> {
        let reply = self.execute(&Command::new("SMEMBERS").arg(key))?;
        into_bulks(reply)
    }

    /// Remove `members`. Returns how many were present.
    pub fn srem(&mut self, key: &str, members: &[Bytes]) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("SREM").arg(key).args(members))?;
        into_count(reply)
    }
}
