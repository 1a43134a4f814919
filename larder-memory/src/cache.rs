// Copyright 2026 larder Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt::Debug, hash::Hash, sync::Arc};

use equivalent::Equivalent;
use larder_common::{
    code::{Key, Value},
    error::{Error, Result},
    event::{Event, EventListener},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    eviction::{lru::Lru, Eviction, EvictionStrategy},
    raw::{Garbages, RawCache},
    record::CacheEntry,
};

/// Default percentage of the entries to evict when the cache overflows.
pub const DEFAULT_EVICTION_PERCENTAGE: usize = 30;

/// Serializable cache configuration.
///
/// Turn it into a [`CacheBuilder`] with [`CacheBuilder::from`] to build a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Max count of entries.
    pub capacity: usize,
    /// Eviction strategy.
    #[serde(default)]
    pub eviction_strategy: EvictionStrategy,
    /// Percentage of the entries to evict when the cache overflows, in `1..=100`.
    #[serde(default = "default_eviction_percentage")]
    pub eviction_percentage: usize,
}

fn default_eviction_percentage() -> usize {
    DEFAULT_EVICTION_PERCENTAGE
}

impl CacheConfig {
    /// Create a config with the given capacity and default options.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            eviction_strategy: EvictionStrategy::default(),
            eviction_percentage: DEFAULT_EVICTION_PERCENTAGE,
        }
    }
}

/// Builder for [`Cache`].
pub struct CacheBuilder<K, V>
where
    K: Key,
    V: Value,
{
    capacity: usize,
    eviction_strategy: EvictionStrategy,
    eviction_percentage: usize,
    eviction: Option<Box<dyn Eviction<Key = K, Value = V>>>,
    event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
}

impl<K, V> From<CacheConfig> for CacheBuilder<K, V>
where
    K: Key,
    V: Value,
{
    fn from(config: CacheConfig) -> Self {
        Self::new(config.capacity)
            .with_eviction_strategy(config.eviction_strategy)
            .with_eviction_percentage(config.eviction_percentage)
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Key,
    V: Value,
{
    /// Create a cache builder with the max count of entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            eviction_strategy: EvictionStrategy::default(),
            eviction_percentage: DEFAULT_EVICTION_PERCENTAGE,
            eviction: None,
            event_listener: None,
        }
    }

    /// Set the eviction strategy.
    ///
    /// The default strategy is [`EvictionStrategy::Lru`], which is the only supported one for now.
    pub fn with_eviction_strategy(mut self, eviction_strategy: EvictionStrategy) -> Self {
        self.eviction_strategy = eviction_strategy;
        self
    }

    /// Set the percentage of the entries to evict when the cache overflows.
    ///
    /// An eviction pass removes `percentage * size / 100` entries (truncated), and at least enough
    /// entries to get back within the capacity.
    ///
    /// The default value is 30.
    pub fn with_eviction_percentage(mut self, eviction_percentage: usize) -> Self {
        self.eviction_percentage = eviction_percentage;
        self
    }

    /// Use a customized eviction policy. The eviction strategy is ignored.
    ///
    /// The policy must start empty.
    pub fn with_eviction(mut self, eviction: impl Eviction<Key = K, Value = V>) -> Self {
        self.eviction = Some(Box::new(eviction));
        self
    }

    /// Set the event listener.
    pub fn with_event_listener(mut self, event_listener: Arc<dyn EventListener<Key = K, Value = V>>) -> Self {
        self.event_listener = Some(event_listener);
        self
    }

    /// Build the cache.
    ///
    /// Fails with a config error if the capacity is zero, the eviction percentage is out of
    /// `1..=100`, or the eviction strategy is not supported.
    pub fn build(self) -> Result<Cache<K, V>> {
        if self.capacity == 0 {
            return Err(Error::config("capacity must be positive").with_context("capacity", self.capacity));
        }
        if !(1..=100).contains(&self.eviction_percentage) {
            return Err(Error::config("eviction percentage must be in 1..=100")
                .with_context("eviction_percentage", self.eviction_percentage));
        }

        let (eviction, strategy) = match self.eviction {
            Some(eviction) => {
                if !eviction.is_empty() {
                    return Err(Error::config("customized eviction policy must start empty")
                        .with_context("tracked", eviction.len()));
                }
                (eviction, None)
            }
            None => {
                let eviction: Box<dyn Eviction<Key = K, Value = V>> = match self.eviction_strategy {
                    EvictionStrategy::Lru => Box::new(Lru::new(self.capacity)),
                    strategy @ (EvictionStrategy::Fifo | EvictionStrategy::Lifo | EvictionStrategy::FirstN) => {
                        return Err(
                            Error::config("unsupported eviction strategy").with_context("eviction_strategy", strategy)
                        );
                    }
                };
                (eviction, Some(self.eviction_strategy))
            }
        };

        tracing::debug!(
            capacity = self.capacity,
            eviction_percentage = self.eviction_percentage,
            eviction_strategy = ?strategy,
            "[memory]: build cache"
        );

        let inner = CacheInner {
            raw: RwLock::new(RawCache::new(self.capacity, self.eviction_percentage, eviction)),
            capacity: self.capacity,
            eviction_percentage: self.eviction_percentage,
            eviction_strategy: strategy,
            event_listener: self.event_listener,
        };
        Ok(Cache { inner: Arc::new(inner) })
    }
}

struct CacheInner<K, V>
where
    K: Key,
    V: Value,
{
    raw: RwLock<RawCache<K, V>>,
    capacity: usize,
    eviction_percentage: usize,
    eviction_strategy: Option<EvictionStrategy>,
    event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
}

/// A bounded in-memory cache with a pluggable eviction policy.
///
/// All mutating operations, including [`Cache::get`] which refreshes the recency of the key, take
/// the exclusive lock for their whole duration. The eviction pass triggered by an overflowing
/// [`Cache::insert`] runs inline within that call. Read-only inspection takes the shared lock and
/// never touches the eviction policy.
///
/// Cloning a cache is cheap; clones share the same state.
pub struct Cache<K, V>
where
    K: Key,
    V: Value,
{
    inner: Arc<CacheInner<K, V>>,
}

impl<K, V> Clone for Cache<K, V>
where
    K: Key,
    V: Value,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Debug for Cache<K, V>
where
    K: Key,
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let raw = self.inner.raw.read();
        f.debug_struct("Cache")
            .field("capacity", &self.inner.capacity)
            .field("len", &raw.len())
            .field("eviction_percentage", &self.inner.eviction_percentage)
            .field("eviction_strategy", &self.inner.eviction_strategy)
            .finish()
    }
}

impl<K, V> Cache<K, V>
where
    K: Key,
    V: Value,
{
    /// Insert or replace the entry of the key.
    ///
    /// If the insertion makes the cache overflow, an eviction pass runs before returning.
    ///
    /// An error is returned only if the cache and its eviction policy are found out of sync, which
    /// is a bug.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "larder::memory::cache::insert"))]
    pub fn insert(&self, key: K, value: V) -> Result<CacheEntry<K, V>> {
        let entry = CacheEntry::new(key, value);
        let mut garbages = vec![];

        let res = self.inner.raw.write().emplace(entry.clone(), &mut garbages);

        // Notify the listener out of the lock critical section.
        self.notify(garbages);

        res.map(|_| entry)
    }

    /// Get the entry of the key and refresh its recency.
    ///
    /// Returns `Ok(None)` if the key is not cached.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "larder::memory::cache::get"))]
    pub fn get<Q>(&self, key: &Q) -> Result<Option<CacheEntry<K, V>>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let res = self.inner.raw.write().get(key);
        if let Ok(None) = res {
            tracing::trace!("[memory]: miss");
        }
        res
    }

    /// Remove the entry of the key and return it.
    ///
    /// Removing a key that is not cached is a no-op and returns `Ok(None)`.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "larder::memory::cache::remove"))]
    pub fn remove<Q>(&self, key: &Q) -> Result<Option<CacheEntry<K, V>>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let res = self.inner.raw.write().remove(key);
        if let Ok(Some(entry)) = &res {
            if let Some(listener) = self.inner.event_listener.as_ref() {
                listener.on_leave(Event::Remove, entry.key(), entry.value());
            }
        }
        res
    }

    /// Returns `true` if the key is cached.
    ///
    /// The recency of the key is not refreshed.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.raw.read().contains(key)
    }

    /// Count of cached entries.
    pub fn len(&self) -> usize {
        self.inner.raw.read().len()
    }

    /// Returns `true` if no entry is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Max count of entries.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Percentage of the entries to evict when the cache overflows.
    pub fn eviction_percentage(&self) -> usize {
        self.inner.eviction_percentage
    }

    /// The eviction strategy the cache is built with, or `None` for a customized eviction policy.
    pub fn eviction_strategy(&self) -> Option<EvictionStrategy> {
        self.inner.eviction_strategy
    }

    /// All cached keys in ascending order, for inspection.
    ///
    /// The recency of the keys is not refreshed.
    pub fn keys_sorted(&self) -> Vec<K> {
        self.inner.raw.read().keys_sorted()
    }

    fn notify(&self, garbages: Garbages<K, V>) {
        if let Some(listener) = self.inner.event_listener.as_ref() {
            for (event, entry) in garbages {
                listener.on_leave(event, entry.key(), entry.value());
            }
        }
    }
}
