//! The query cache itself.
//!
//! Entries are stored type-erased and downcast on read, so one cache serves
//! every query shape. The dependency table maps each [`Resource`] to the keys
//! tagged with it; invalidating a resource drops exactly those keys.

use std::any::Any;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use quill_core::error::Retryable;
use quill_core::resource::Resource;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::key::QueryKey;

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    deps: BTreeSet<Resource>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    /// Resource -> keys tagged with it.
    dependents: HashMap<Resource, HashSet<QueryKey>>,
    /// Bumped on every invalidation; a fetch that started before a bump
    /// does not store its result.
    generations: HashMap<Resource, u64>,
}

impl CacheState {
    fn generation(&self, deps: &BTreeSet<Resource>) -> u64 {
        deps.iter()
            .map(|r| self.generations.get(r).copied().unwrap_or(0))
            .sum()
    }

    fn remove_key(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.remove(key) {
            for dep in entry.deps {
                if let Some(keys) = self.dependents.get_mut(&dep) {
                    keys.remove(key);
                }
            }
        }
    }

    fn invalidate(&mut self, resource: Resource) -> usize {
        *self.generations.entry(resource).or_insert(0) += 1;
        let keys = self.dependents.remove(&resource).unwrap_or_default();
        let count = keys.len();
        for key in &keys {
            self.remove_key(key);
        }
        count
    }

    fn insert(&mut self, key: QueryKey, value: Arc<dyn Any + Send + Sync>, deps: BTreeSet<Resource>) {
        self.remove_key(&key);
        for dep in &deps {
            self.dependents.entry(*dep).or_default().insert(key.clone());
        }
        self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                deps,
            },
        );
    }
}

/// Shared read cache with staleness windows, bounded retry and
/// resource-tagged invalidation.
pub struct QueryCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
    pending_tx: mpsc::UnboundedSender<Resource>,
    pending_rx: Mutex<mpsc::UnboundedReceiver<Resource>>,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        Self {
            config,
            state: Mutex::new(CacheState::default()),
            pending_tx,
            pending_rx: Mutex::new(pending_rx),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached value for `key` when fresh, otherwise run `fetch`
    /// and store its result tagged with `deps` (and `key.resource`).
    ///
    /// Retryable failures are retried up to `config.retry.max_retries`
    /// times with exponential backoff; other failures return immediately.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: QueryKey,
        deps: &[Resource],
        mut fetch: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let deps: BTreeSet<Resource> = deps
            .iter()
            .copied()
            .chain(std::iter::once(key.resource))
            .collect();

        self.drain_pending().await;
        let generation = {
            let state = self.state.lock().await;
            if let Some(value) = self.fresh(&state, &key) {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            state.generation(&deps)
        };

        tracing::debug!(key = %key, "Cache miss, fetching");
        let value = self.fetch_with_retry(&key, &mut fetch).await?;

        self.drain_pending().await;
        let mut state = self.state.lock().await;
        if state.generation(&deps) == generation {
            state.insert(key, Arc::new(value.clone()), deps);
        } else {
            tracing::debug!(key = %key, "Invalidated during fetch, not storing");
        }
        Ok(value)
    }

    /// Cached value for `key`, if present, fresh and of type `T`.
    pub async fn peek<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.drain_pending().await;
        let state = self.state.lock().await;
        self.fresh(&state, key)
    }

    /// Queue an invalidation of every entry tagged with `resource`.
    ///
    /// Does not wait; the queue is drained on the next cache access.
    pub fn enqueue_invalidation(&self, resource: Resource) {
        tracing::debug!(resource = %resource, "Queueing cache invalidation");
        if self.pending_tx.send(resource).is_err() {
            tracing::warn!(resource = %resource, "Invalidation queue closed");
        }
    }

    /// Invalidate every entry tagged with `resource` right away. Returns the
    /// number of entries dropped.
    pub async fn invalidate_now(&self, resource: Resource) -> usize {
        self.drain_pending().await;
        let count = self.state.lock().await.invalidate(resource);
        tracing::info!(resource = %resource, count, "Invalidated cache entries");
        count
    }

    /// Drop a single entry.
    pub async fn remove(&self, key: &QueryKey) {
        self.state.lock().await.remove_key(key);
    }

    /// Drop everything (logout).
    pub async fn clear(&self) {
        let mut rx = self.pending_rx.lock().await;
        while rx.try_recv().is_ok() {}
        let mut state = self.state.lock().await;
        // Every resource, not only cached ones: reads still in flight must
        // not store their result.
        for resource in Resource::ALL {
            state.invalidate(resource);
        }
        state.entries.clear();
        state.dependents.clear();
        tracing::info!("Cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.drain_pending().await;
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // ---- private helpers ----

    fn fresh<T>(&self, state: &CacheState, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = state.entries.get(key)?;
        if entry.fetched_at.elapsed() >= self.config.stale_after_for(key.resource) {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    async fn drain_pending(&self) {
        let mut rx = self.pending_rx.lock().await;
        let mut drained = Vec::new();
        while let Ok(resource) = rx.try_recv() {
            drained.push(resource);
        }
        drop(rx);
        if drained.is_empty() {
            return;
        }
        let mut state = self.state.lock().await;
        for resource in drained {
            let count = state.invalidate(resource);
            tracing::info!(resource = %resource, count, "Invalidated cache entries");
        }
    }

    async fn fetch_with_retry<T, E, F, Fut>(&self, key: &QueryKey, fetch: &mut F) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let policy = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            match fetch().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                    attempt += 1;
                    let delay = policy.delay_for(attempt);
                    tracing::warn!(
                        key = %key,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Fetch attempt {attempt} failed, retrying",
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, attempt, "Fetch failed");
                    return Err(e);
                }
            }
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
