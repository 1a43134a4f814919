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

use std::hash::Hash;

use equivalent::Equivalent;
use hashbrown::{hash_map::Entry, HashMap};
use larder_common::{
    code::{Key, Value},
    error::{Error, Result},
    event::Event,
    strict_assert, strict_assert_eq,
};

use crate::{
    eviction::{prealloc, Eviction},
    record::CacheEntry,
};

/// Entries that left the cache within a lock section, with the reason.
///
/// They are handed to the event listener after the lock is released.
pub(crate) type Garbages<K, V> = Vec<(Event, CacheEntry<K, V>)>;

/// Number of entries to evict when the cache holds `size` entries.
///
/// The percentage is applied with truncating division. The quota never drops below the overflow, so
/// the cache is always back within capacity after an eviction pass.
pub(crate) fn eviction_quota(size: usize, capacity: usize, percentage: usize) -> usize {
    (size * percentage / 100).max(size.saturating_sub(capacity))
}

/// Cache state guarded by the cache lock.
///
/// `entries` and `eviction` always track the same set of keys when no operation is in progress.
pub(crate) struct RawCache<K, V>
where
    K: Key,
    V: Value,
{
    entries: HashMap<K, CacheEntry<K, V>>,
    eviction: Box<dyn Eviction<Key = K, Value = V>>,

    capacity: usize,
    eviction_percentage: usize,
}

impl<K, V> RawCache<K, V>
where
    K: Key,
    V: Value,
{
    pub(crate) fn new(
        capacity: usize,
        eviction_percentage: usize,
        eviction: Box<dyn Eviction<Key = K, Value = V>>,
    ) -> Self {
        Self {
            entries: HashMap::with_capacity(prealloc(capacity)),
            eviction,
            capacity,
            eviction_percentage,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert or replace an entry, then run an eviction pass if the cache overflows.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "larder::memory::raw::emplace"))]
    pub(crate) fn emplace(&mut self, entry: CacheEntry<K, V>, garbages: &mut Garbages<K, V>) -> Result<()> {
        match self.entries.entry(entry.key().clone()) {
            Entry::Occupied(mut o) => {
                let old = o.insert(entry);
                let res = self.eviction.on_update(o.key(), o.get().value());
                garbages.push((Event::Replace, old));
                res.map_err(|e| desync("update", o.key(), e))?;
            }
            Entry::Vacant(v) => {
                let inserted = v.insert(entry);
                self.eviction
                    .on_add(inserted.key())
                    .map_err(|e| desync("add", inserted.key(), e))?;
            }
        }

        if self.entries.len() > self.capacity {
            self.evict(garbages)?;
        }

        strict_assert!(self.entries.len() <= self.capacity);
        strict_assert_eq!(self.entries.len(), self.eviction.len());
        Ok(())
    }

    /// Evict entries picked by the eviction policy until the quota is met.
    #[cfg_attr(feature = "tracing", fastrace::trace(name = "larder::memory::raw::evict"))]
    fn evict(&mut self, garbages: &mut Garbages<K, V>) -> Result<()> {
        let size = self.entries.len();
        let quota = eviction_quota(size, self.capacity, self.eviction_percentage);
        tracing::debug!(
            size,
            capacity = self.capacity,
            quota,
            "[memory]: cache overflows, start eviction pass"
        );

        let entries = &mut self.entries;
        let mut evicted = 0;
        let mut untracked = None;

        self.eviction.evict(&mut |key| match entries.remove(&key) {
            Some(entry) => {
                tracing::trace!(?key, "[memory]: evict");
                garbages.push((Event::Evict, entry));
                evicted += 1;
                evicted < quota
            }
            None => {
                untracked = Some(key);
                false
            }
        })
        .map_err(|e| Error::inconsistent("eviction policy failed during eviction pass").with_source(e))?;

        if let Some(key) = untracked {
            tracing::warn!(?key, "[memory]: eviction policy picked a key that is not cached");
            return Err(Error::inconsistent("eviction policy picked a key that is not cached")
                .with_context("key", format!("{key:?}")));
        }
        if evicted < quota {
            tracing::warn!(evicted, quota, "[memory]: eviction policy exhausted before the quota is met");
            return Err(Error::inconsistent("eviction policy exhausted before the quota is met")
                .with_context("evicted", evicted)
                .with_context("quota", quota)
                .with_context("remaining", self.entries.len()));
        }

        tracing::debug!(evicted, size = self.entries.len(), "[memory]: eviction pass finished");
        Ok(())
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "larder::memory::raw::get"))]
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Result<Option<CacheEntry<K, V>>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let Some((key, entry)) = self.entries.get_key_value(key) else {
            return Ok(None);
        };
        self.eviction.on_access(key).map_err(|e| desync("access", key, e))?;
        Ok(Some(entry.clone()))
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "larder::memory::raw::remove"))]
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Result<Option<CacheEntry<K, V>>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let Some((key, entry)) = self.entries.remove_entry(key) else {
            return Ok(None);
        };
        self.eviction.on_delete(&key).map_err(|e| desync("delete", &key, e))?;

        strict_assert_eq!(self.entries.len(), self.eviction.len());
        Ok(Some(entry))
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub(crate) fn keys_sorted(&self) -> Vec<K> {
        let mut keys = self.entries.keys().cloned().collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }
}

fn desync<K: Key>(op: &'static str, key: &K, source: Error) -> Error {
    tracing::warn!(op, ?key, %source, "[memory]: eviction policy rejected a cached key");
    Error::inconsistent("eviction policy rejected a cached key")
        .with_context("op", op)
        .with_context("key", format!("{key:?}"))
        .with_source(source)
}
