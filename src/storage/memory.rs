//! In-memory frontier store
//!
//! Backs tests and throwaway crawls. A single mutex guards all keys, which
//! gives every operation the same one-at-a-time semantics as a set server.

use crate::state::{samples_key, FrontierSet};
use crate::storage::traits::{FrontierStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Keyspace {
    sets: HashMap<String, HashSet<String>>,
    lists: HashMap<String, Vec<u64>>,
}

/// Frontier store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Keyspace>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Keyspace>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

#[async_trait]
impl FrontierStore for MemoryStore {
    async fn count(&self, domain: &str, set: FrontierSet) -> StoreResult<u64> {
        let keyspace = self.lock()?;
        Ok(keyspace
            .sets
            .get(&set.key(domain))
            .map_or(0, |members| members.len() as u64))
    }

    async fn add(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .sets
            .entry(set.key(domain))
            .or_default()
            .insert(path.to_string()))
    }

    async fn remove(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .sets
            .get_mut(&set.key(domain))
            .is_some_and(|members| members.remove(path)))
    }

    async fn contains(&self, domain: &str, set: FrontierSet, path: &str) -> StoreResult<bool> {
        let keyspace = self.lock()?;
        Ok(keyspace
            .sets
            .get(&set.key(domain))
            .is_some_and(|members| members.contains(path)))
    }

    async fn pick_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>> {
        let keyspace = self.lock()?;
        Ok(keyspace
            .sets
            .get(&set.key(domain))
            .and_then(|members| members.iter().next().cloned()))
    }

    async fn take_arbitrary(&self, domain: &str, set: FrontierSet) -> StoreResult<Option<String>> {
        let mut keyspace = self.lock()?;
        let Some(members) = keyspace.sets.get_mut(&set.key(domain)) else {
            return Ok(None);
        };
        let picked = members.iter().next().cloned();
        if let Some(path) = &picked {
            members.remove(path);
        }
        Ok(picked)
    }

    async fn members(&self, domain: &str, set: FrontierSet) -> StoreResult<Vec<String>> {
        let keyspace = self.lock()?;
        Ok(keyspace
            .sets
            .get(&set.key(domain))
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn append_sample(&self, domain: &str, in_progress: u64) -> StoreResult<()> {
        let mut keyspace = self.lock()?;
        keyspace
            .lists
            .entry(samples_key(domain))
            .or_default()
            .push(in_progress);
        Ok(())
    }

    async fn samples(&self, domain: &str) -> StoreResult<Vec<u64>> {
        let keyspace = self.lock()?;
        Ok(keyspace
            .lists
            .get(&samples_key(domain))
            .cloned()
            .unwrap_or_default())
    }

    async fn clear(&self, domain: &str) -> StoreResult<()> {
        let mut keyspace = self.lock()?;
        for set in FrontierSet::all() {
            keyspace.sets.remove(&set.key(domain));
        }
        keyspace.lists.remove(&samples_key(domain));
        Ok(())
    }
}
