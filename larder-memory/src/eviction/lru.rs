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

use std::marker::PhantomData;

use larder_common::{
    code::{Key, Value},
    error::{Error, ErrorKind, Result},
};

use super::{heap::IndexedHeap, prealloc, Eviction};

/// Least recently used eviction.
///
/// Every touch (add, access, update) stamps the key with the next value of a logical clock. The key
/// with the smallest stamp is the next victim. Stamps are unique, so the order is always total.
///
/// All operations are O(log n).
pub struct Lru<K, V>
where
    K: Key,
    V: Value,
{
    heap: IndexedHeap<K, u64>,
    clock: u64,
    _marker: PhantomData<V>,
}

impl<K, V> Lru<K, V>
where
    K: Key,
    V: Value,
{
    /// Create an lru policy for a cache of `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: IndexedHeap::with_capacity(prealloc(capacity)),
            clock: 0,
            _marker: PhantomData,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn refresh(&mut self, key: &K) -> Result<()> {
        let stamp = self.tick();
        match self.heap.update(key, stamp) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(key)),
        }
    }
}

impl<K, V> Eviction for Lru<K, V>
where
    K: Key,
    V: Value,
{
    type Key = K;
    type Value = V;

    fn on_add(&mut self, key: &K) -> Result<()> {
        let stamp = self.tick();
        if !self.heap.push(key.clone(), stamp) {
            return Err(
                Error::new(ErrorKind::Inconsistent, "key is already tracked").with_context("key", format!("{key:?}"))
            );
        }
        Ok(())
    }

    fn on_access(&mut self, key: &K) -> Result<()> {
        self.refresh(key)
    }

    fn on_update(&mut self, key: &K, _: &V) -> Result<()> {
        self.refresh(key)
    }

    fn on_delete(&mut self, key: &K) -> Result<()> {
        match self.heap.remove(key) {
            Some(_) => Ok(()),
            None => Err(Error::not_found(key)),
        }
    }

    fn evict(&mut self, f: &mut dyn FnMut(K) -> bool) -> Result<()> {
        if self.heap.is_empty() {
            return Err(Error::inconsistent("evict from an empty lru"));
        }
        while let Some((key, stamp)) = self.heap.pop() {
            tracing::trace!(?key, stamp, "[lru]: pop victim");
            if !f(key) {
                break;
            }
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}
