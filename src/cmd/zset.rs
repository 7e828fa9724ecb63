use crate::cmd::{
    into_count, into_float, into_optional_float, into_optional_int, into_scored, Command,
};
use crate::transport::Connector;
use crate::{Client, Error};

use bytes::Bytes;

impl<C: Connector> Client<C> {
    /// Add `(score, member)` pairs, updating the score of existing members.
    /// Returns how many members are new.
    pub fn zadd(&mut self, key: &str, entries: &[(f64, Bytes)]) -> crate::Result<u64> {
        let mut command = Command::new("ZADD").arg(key);
        for (score, member) in entries {
            command = command.arg_float(*score).arg(member);
        }
        into_count(self.execute(&command)?)
    }

    pub fn zcard(&mut self, key: &str) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("ZCARD").arg(key))?;
        into_count(reply)
    }

    /// Number of members scored within `min..=max`.
    pub fn zcount(&mut self, key: &str, min: f64, max: f64) -> crate::Result<u64> {
        let command = Command::new("ZCOUNT").arg(key).arg_float(min).arg_float(max);
        into_count(self.execute(&command)?)
    }

    /// Add `increment` to the score of `member`. Returns the new score.
    pub fn zincr_by(&mut self, key: &str, increment: f64, member: Bytes) -> crate::Result<f64> {
        let command = Command::new("ZINCRBY")
            .arg(key)
            .arg_float(increment)
            .arg(member);
        into_float(self.execute(&command)?)
    }

    /// Members ranked `start..=stop` (lowest score first) with their scores.
    pub fn zrange(&mut self, key: &str, start: i64, stop: i64) -> crate::Result<Vec<(Bytes, f64)>> {
        let command = Command::new("ZRANGE")
            .arg(key)
            .arg_int(start)
            .arg_int(stop)
            .arg("WITHSCORES");
        into_scored(self.execute(&command)?)
    }

    /// Members scored within `min..=max` with their scores.
    pub fn zrange_by_score(
        &mut self,
        key: &str,
        min: f64,
        max: f64,
    ) -> crate::Result<Vec<(Bytes, f64)>> {
        let command = Command::new("ZRANGEBYSCORE")
            .arg(key)
            .arg_float(min)
            .arg_float(max)
            .arg("WITHSCORES");
        into_scored(self.execute(&command)?)
    }

    /// Rank of `member`, lowest score first. `None` if it is not in the set.
    pub fn zrank(&mut self, key: &str, member: Bytes) -> crate::Result<Option<u64>> {
        let reply = self.execute(&Command::new("ZRANK").arg(key).arg(member))?;
        match into_optional_int(reply)? {
            Some(rank) => u64::try_from(rank).map(Some).map_err(|_| Error::UnexpectedReply),
            None => Ok(None),
        }
    }

    /// Remove `members`. Returns how many were present.
    pub fn zrem(&mut self, key: &str, members: &[Bytes]) -> crate::Result<u64> {
        let reply = self.execute(&Command::new("ZREM").arg(key).args(members))?;
        into_count(reply)
    }

    pub fn zrem_range_by_rank(&mut self, key: &str, start: i64, stop: i64) -> crate::Result<u64> {
        let command = Command::new("ZREMRANGEBYRANK")
            .arg(key)
            .arg_int(start)
            .arg_int(stop);
        into_count(self.execute(&command)?)
    }

    pub fn zrem_range_by_score(&mut self, key: &str, min: f64, max: f64) -> crate::Result<u64> {
        let command = Command::new("ZREMRANGEBYSCORE")
            .arg(key)
            .arg_float(min)
            .arg_float(max);
        into_count(self.execute(&command)?)
    }

    pub fn zscore(&mut self, key: &str, member: Bytes) -> crate::Result<Option<f64>> {
        let reply = self.execute(&Command::new("ZSCORE").arg(key).arg(member))?;
        into_optional_float(reply)
    }
}
