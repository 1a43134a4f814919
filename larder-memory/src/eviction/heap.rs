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

use std::{hash::Hash, mem};

use hashbrown::{hash_map::Entry, HashMap};
use larder_common::strict_assert;

#[derive(Debug)]
struct Slot<K, P> {
    key: K,
    priority: P,
}

/// A binary min-heap with a key to slot index.
///
/// The index makes it possible to re-prioritize or remove an arbitrary key in O(log n) instead of
/// scanning the heap.
#[derive(Debug)]
pub struct IndexedHeap<K, P> {
    slots: Vec<Slot<K, P>>,
    index: HashMap<K, usize>,
}

impl<K, P> Default for IndexedHeap<K, P> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K, P> IndexedHeap<K, P>
where
    K: Hash + Eq + Clone,
    P: Ord,
{
    /// Create an empty heap with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of keys in the heap.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the heap holds no keys.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` if the key is in the heap.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Get the priority of the key.
    pub fn priority(&self, key: &K) -> Option<&P> {
        self.index.get(key).map(|&pos| &self.slots[pos].priority)
    }

    /// Get the key with the minimum priority without removing it.
    pub fn peek(&self) -> Option<(&K, &P)> {
        self.slots.first().map(|slot| (&slot.key, &slot.priority))
    }

    /// Push a new key.
    ///
    /// Returns `false` and leaves the heap untouched if the key is already present.
    pub fn push(&mut self, key: K, priority: P) -> bool {
        let pos = self.slots.len();
        match self.index.entry(key.clone()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(v) => {
                v.insert(pos);
            }
        }
        self.slots.push(Slot { key, priority });
        self.sift_up(pos);
        true
    }

    /// Remove and return the key with the minimum priority.
    pub fn pop(&mut self) -> Option<(K, P)> {
        let last = self.slots.len().checked_sub(1)?;
        self.swap(0, last);
        let slot = self.slots.pop()?;
        self.index.remove(&slot.key);
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        Some((slot.key, slot.priority))
    }

    /// Replace the priority of the key and restore the heap order.
    ///
    /// Returns the old priority, or `None` if the key is not in the heap.
    pub fn update(&mut self, key: &K, priority: P) -> Option<P> {
        let pos = *self.index.get(key)?;
        let old = mem::replace(&mut self.slots[pos].priority, priority);
        self.restore(pos);
        Some(old)
    }

    /// Remove the key and return its priority.
    pub fn remove(&mut self, key: &K) -> Option<P> {
        let pos = self.index.remove(key)?;
        let last = self.slots.len() - 1;
        if pos != last {
            self.slots.swap(pos, last);
            self.reindex(pos);
        }
        let slot = self.slots.pop()?;
        if pos < self.slots.len() {
            self.restore(pos);
        }
        Some(slot.priority)
    }

    /// Iterate over all keys and priorities in heap layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &P)> {
        self.slots.iter().map(|slot| (&slot.key, &slot.priority))
    }

    fn restore(&mut self, pos: usize) {
        let pos = self.sift_up(pos);
        self.sift_down(pos);
    }

    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.slots[pos].priority >= self.slots[parent].priority {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.slots.len();
        loop {
            let left = pos * 2 + 1;
            let right = left + 1;
            let mut min = pos;
            if left < len && self.slots[left].priority < self.slots[min].priority {
                min = left;
            }
            if right < len && self.slots[right].priority < self.slots[min].priority {
                min = right;
            }
            if min == pos {
                break;
            }
            self.swap(pos, min);
            pos = min;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.slots.swap(a, b);
        self.reindex(a);
        self.reindex(b);
    }

    fn reindex(&mut self, pos: usize) {
        let slot = self.index.get_mut(&self.slots[pos].key);
        strict_assert!(slot.is_some());
        if let Some(slot) = slot {
            *slot = pos;
        }
    }
}
