//! Redis frontier store
//!
//! The networked backend that lets several crawl processes drain the same
//! domain. Keys follow `{domain}:in_progress`, `{domain}:finished`,
//! `{domain}:errored` for the sets and `{domain}:count` for the sample list.

use crate::state::{samples_key, FrontierSet};
use crate::storage::traits::{FrontierStore, StoreResult};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

/// Redis frontier backend
///
/// Holds one multiplexed connection; each operation clones the handle,
/// which shares the underlying socket.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connects to a Redis server
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Connection URL, e.g. `redis://127.0.0.1/`
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::debug!("Connected to frontier store at {}", redis_url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl FrontierStore for RedisStore {
    async fn count(&self, domain: &str, set: FrontierSet) -> StoreResult<u64> {
        let mut con = self.conn.clone();
        let count: u64 = con.scard(set.key(domain)).await?;
        Ok(count)
    }

    async fn add(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let mut con = self.conn.clone();
        let added: u64 = con.sadd(set.key(domain), path).await?;
        Ok(added > 0)
    }

    async fn remove(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let mut con = self.conn.clone();
        let removed: u64 = con.srem(set.key(domain), path).await?;
        Ok(removed > 0)
    }

    async fn contains(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let mut con = self.conn.clone();
        let member: bool = con.sismember(set.key(domain), path).await?;
        Ok(member)
    }

    async fn pick_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>> {
        let mut con = self.conn.clone();
        let path: Option<String> = con.srandmember(set.key(domain)).await?;
        Ok(path)
    }

    async fn take_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>> {
        let mut con = self.conn.clone();
        let path: Option<String> = con.spop(set.key(domain)).await?;
        Ok(path)
    }

    async fn members(&self, domain: &str, set: FrontierSet) -> StoreResult<Vec<String>> {
        let mut con = self.conn.clone();
        let paths: Vec<String> = con.smembers(set.key(domain)).await?;
        Ok(paths)
    }

    async fn append_sample(&self, domain: &str, in_progress: u64) -> StoreResult<()> {
        let mut con = self.conn.clone();
        let _: u64 = con.rpush(samples_key(domain), in_progress).await?;
        Ok(())
    }

    async fn samples(&self, domain: &str) -> StoreResult<Vec<u64>> {
        let mut con = self.conn.clone();
        let samples: Vec<u64> = con.lrange(samples_key(domain), 0, -1).await?;
        Ok(samples)
    }

    async fn clear(&self, domain: &str) -> StoreResult<()> {
        let mut con = self.conn.clone();
        let mut keys: Vec<String> = FrontierSet::all()
            .iter()
            .map(|set| set.key(domain))
            .collect();
        keys.push(samples_key(domain));
        let _: u64 = con.del(keys).await?;
        Ok(())
    }
}
