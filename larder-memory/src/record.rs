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

use std::{fmt::Debug, ops::Deref, sync::Arc};

use larder_common::code::{Key, Value};

struct Record<K, V> {
    key: K,
    value: V,
}

/// An immutable cache entry.
///
/// Updating a key replaces its entry as a whole. Entries handed out before the update keep the old
/// value.
pub struct CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    record: Arc<Record<K, V>>,
}

impl<K, V> CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            record: Arc::new(Record { key, value }),
        }
    }

    /// Key of the entry.
    pub fn key(&self) -> &K {
        &self.record.key
    }

    /// Value of the entry.
    pub fn value(&self) -> &V {
        &self.record.value
    }

    /// Returns `true` if both handles point to the same entry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

impl<K, V> Clone for CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    fn clone(&self) -> Self {
        Self {
            record: self.record.clone(),
        }
    }
}

impl<K, V> Debug for CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}

impl<K, V> Deref for CacheEntry<K, V>
where
    K: Key,
    V: Value,
{
    type Target = V;

    fn deref(&self) -> &Self::Target {
        self.value()
    }
}
