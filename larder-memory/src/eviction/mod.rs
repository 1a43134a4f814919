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

use std::{fmt::Display, str::FromStr};

use larder_common::{
    code::{Key, Value},
    error::{Error, ErrorKind, Result},
};
use serde::{Deserialize, Serialize};

/// Upper bound of the slots reserved up front, whatever the configured capacity is.
const PREALLOC_LIMIT: usize = 1 << 16;

/// Slots to reserve for a cache of `capacity`, with one extra slot for the key that overflows it.
pub(crate) fn prealloc(capacity: usize) -> usize {
    capacity.saturating_add(1).min(PREALLOC_LIMIT)
}

/// Eviction policy of the cache.
///
/// An eviction policy tracks every key that is in the cache and decides which one leaves first when
/// the cache overflows. The cache decides *when* to evict and owns the entries; the policy decides
/// *who*.
///
/// The policy is always called with the cache lock held, so it needs no synchronization of its own.
/// Every key the cache holds must be tracked by the policy and vice versa. A policy returns
/// [`ErrorKind::NotFound`] when asked about a key it does not track.
pub trait Eviction: Send + Sync + 'static {
    /// Key type.
    type Key: Key;
    /// Value type.
    ///
    /// Values are opaque to the policy.
    type Value: Value;

    /// Start tracking a key that just entered the cache, as the most eligible to survive.
    fn on_add(&mut self, key: &Self::Key) -> Result<()>;

    /// A tracked key is read.
    fn on_access(&mut self, key: &Self::Key) -> Result<()>;

    /// The value of a tracked key is replaced.
    fn on_update(&mut self, key: &Self::Key, value: &Self::Value) -> Result<()>;

    /// Stop tracking a key that is removed from the cache.
    fn on_delete(&mut self, key: &Self::Key) -> Result<()>;

    /// Pop victims in policy order.
    ///
    /// Each victim is removed from the policy *before* `f` is called with it, and the caller must
    /// remove it from the cache. Stops when `f` returns `false` or no key is left.
    ///
    /// Calling `evict` on an empty policy returns an [`ErrorKind::Inconsistent`] error.
    fn evict(&mut self, f: &mut dyn FnMut(Self::Key) -> bool) -> Result<()>;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    /// Returns `true` if no key is tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Eviction strategies a cache can be built with.
///
/// Only [`EvictionStrategy::Lru`] is implemented. Building a cache with any other strategy fails with a
/// config error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EvictionStrategy {
    /// Evict the least recently touched key first.
    #[default]
    #[serde(alias = "LRU", alias = "Recency")]
    Lru,
    /// Evict the earliest inserted key first.
    #[serde(alias = "FIFO", alias = "InsertionOrderFirst")]
    Fifo,
    /// Evict the latest inserted key first.
    #[serde(alias = "LIFO", alias = "InsertionOrderLast")]
    Lifo,
    /// Evict the first keys found.
    FirstN,
}

impl EvictionStrategy {
    /// All strategies.
    pub const ALL: [EvictionStrategy; 4] = [Self::Lru, Self::Fifo, Self::Lifo, Self::FirstN];

    /// Returns `true` if a cache can be built with the strategy.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Lru)
    }
}

impl Display for EvictionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionStrategy::Lru => write!(f, "LRU"),
            EvictionStrategy::Fifo => write!(f, "FIFO"),
            EvictionStrategy::Lifo => write!(f, "LIFO"),
            EvictionStrategy::FirstN => write!(f, "FirstN"),
        }
    }
}

impl FromStr for EvictionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "lru" | "recency" => Ok(Self::Lru),
            "fifo" | "insertionorderfirst" => Ok(Self::Fifo),
            "lifo" | "insertionorderlast" => Ok(Self::Lifo),
            "firstn" => Ok(Self::FirstN),
            _ => Err(Error::new(ErrorKind::Parse, "unknown eviction strategy").with_context("input", s)),
        }
    }
}

/// Indexed binary heap backing the recency ranking.
pub mod heap;
/// Least recently used eviction.
pub mod lru;

/// Helpers for testing eviction policies.
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
