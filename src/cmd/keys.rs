use crate::cmd::{into_bool, into_count, Command};
use crate::transport::Connector;
use crate::Client;

impl<C: Connector> Client<C> {
    /// Switch to database `index`.
    ///
    /// The choice sticks: if the connection is later re-established, `index`
    /// is selected again.
    pub fn select(&mut self, index: u32) -> crate::Result<()> {
        self.manager_mut().select(index)
    }

    /// Remove `keys`. Returns how many existed.
    pub fn del(&mut self, keys: &[&str]) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("DEL").args(keys))?;
        into_count(reply)
    }

    pub fn exists(&mut self, key: &str) -> crate::Result<bool> {
        let reply = self.execute(&Command::new("EXISTS").arg(key))?;
        into_bool(reply)
    }
}
