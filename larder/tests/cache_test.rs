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

//! Behavior tests for the larder cache.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    thread,
};

use itertools::Itertools;
use larder::{Cache, CacheBuilder, Error, ErrorKind, Event, EventListener, Eviction, EvictionStrategy, Lru, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn cache(capacity: usize) -> Cache<String, String> {
    CacheBuilder::new(capacity)
        .with_eviction_strategy(EvictionStrategy::Lru)
        .build()
        .unwrap()
}

fn put(cache: &Cache<String, String>, key: &str, value: &str) {
    cache.insert(key.to_string(), value.to_string()).unwrap();
}

fn get(cache: &Cache<String, String>, key: &str) -> Option<String> {
    cache.get(key).unwrap().map(|entry| entry.value().clone())
}

#[test_log::test]
fn test_overflow_evicts_least_recent_batch() {
    let cache = cache(10);

    for i in 0..10 {
        put(&cache, &format!("k{i}"), &format!("v{i}"));
    }
    assert_eq!(cache.len(), 10);

    // 11 > 10, evict floor(30 * 11 / 100) = 3.
    put(&cache, "k10", "v10");
    assert_eq!(cache.len(), 8);
    for key in ["k0", "k1", "k2"] {
        assert_eq!(get(&cache, key), None);
    }
    for i in 3..=10 {
        assert_eq!(get(&cache, &format!("k{i}")), Some(format!("v{i}")));
    }
}

#[test_log::test]
fn test_access_protects_from_eviction() {
    let cache = CacheBuilder::new(3).with_eviction_percentage(1).build().unwrap();
    for key in ["A", "B", "C"] {
        put(&cache, key, key);
    }
    assert_eq!(get(&cache, "A").as_deref(), Some("A"));

    put(&cache, "D", "D");
    assert_eq!(cache.keys_sorted(), vec!["A", "C", "D"]);
}

#[test_log::test]
fn test_update_refreshes_recency() {
    let cache = CacheBuilder::new(3).with_eviction_percentage(1).build().unwrap();
    for key in ["A", "B", "C"] {
        put(&cache, key, key);
    }
    put(&cache, "A", "A2");
    put(&cache, "B", "B2");

    put(&cache, "D", "D");
    assert_eq!(cache.keys_sorted(), vec!["A", "B", "D"]);
    assert_eq!(get(&cache, "A").as_deref(), Some("A2"));
}

#[test_log::test]
fn test_upsert() {
    let cache = cache(4);
    put(&cache, "k", "v1");
    let before = cache.get("k").unwrap().unwrap();
    put(&cache, "k", "v2");

    assert_eq!(cache.len(), 1);
    assert_eq!(get(&cache, "k").as_deref(), Some("v2"));
    // Entries are replaced as a whole.
    assert_eq!(before.value(), "v1");
}

#[test_log::test]
fn test_remove_is_idempotent() {
    let cache = cache(4);
    put(&cache, "a", "1");
    put(&cache, "b", "2");

    let removed = cache.remove("a").unwrap().unwrap();
    assert_eq!((removed.key().as_str(), removed.value().as_str()), ("a", "1"));
    assert_eq!(cache.len(), 1);

    assert!(cache.remove("a").unwrap().is_none());
    assert!(cache.remove("never").unwrap().is_none());
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.keys_sorted(), vec!["b"]);
}

#[test_log::test]
fn test_capacity_one() {
    let cache = cache(1);
    for i in 0..16 {
        put(&cache, &i.to_string(), "v");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.keys_sorted(), vec![i.to_string()]);
    }
}

#[test_log::test]
fn test_full_percentage_clears_cache() {
    let cache = CacheBuilder::new(4).with_eviction_percentage(100).build().unwrap();
    for i in 0..5 {
        put(&cache, &i.to_string(), "v");
    }
    assert!(cache.is_empty());
    assert!(cache.keys_sorted().is_empty());
}

/// Recency order model: front is the next victim.
struct Model {
    capacity: usize,
    percentage: usize,
    order: VecDeque<String>,
    values: HashMap<String, String>,
}

impl Model {
    fn touch(&mut self, key: &str) {
        if let Some((pos, _)) = self.order.iter().find_position(|k| *k == key) {
            let key = self.order.remove(pos).unwrap();
            self.order.push_back(key);
        }
    }

    fn put(&mut self, key: &str, value: &str) {
        if self.values.insert(key.to_string(), value.to_string()).is_some() {
            self.touch(key);
            return;
        }
        self.order.push_back(key.to_string());
        let size = self.order.len();
        if size > self.capacity {
            let quota = (size * self.percentage / 100).max(size - self.capacity);
            for key in self.order.drain(..quota) {
                self.values.remove(&key);
            }
        }
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let value = self.values.get(key).cloned();
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }
}

#[test_log::test]
fn test_random_ops_against_model() {
    for (capacity, percentage) in [(1, 30), (3, 30), (10, 30), (16, 50), (32, 100)] {
        let mut rng = SmallRng::seed_from_u64(capacity as u64 * 1000 + percentage as u64);
        let cache = CacheBuilder::new(capacity)
            .with_eviction_percentage(percentage)
            .build()
            .unwrap();
        let mut model = Model {
            capacity,
            percentage,
            order: VecDeque::new(),
            values: HashMap::new(),
        };

        for step in 0..5000 {
            let key = format!("k{}", rng.random_range(0..capacity * 3));
            match rng.random_range(0..10) {
                0..5 => {
                    let value = format!("v{step}");
                    put(&cache, &key, &value);
                    model.put(&key, &value);
                    assert!(cache.len() <= capacity);
                }
                5..9 => assert_eq!(get(&cache, &key), model.get(&key)),
                _ => {
                    cache.remove(&key).unwrap();
                    model.remove(&key);
                }
            }

            assert_eq!(cache.len(), model.values.len());
            assert_eq!(cache.keys_sorted().len(), cache.len());
        }

        assert_eq!(cache.keys_sorted(), model.values.keys().cloned().sorted().collect_vec());
    }
}

#[test_log::test]
fn test_concurrent_operations() {
    const THREADS: usize = 8;
    const OPS: usize = 2000;
    const CAPACITY: usize = 64;

    let cache = cache(CAPACITY);

    let handles = (0..THREADS)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(t as u64);
                for i in 0..OPS {
                    let key = format!("k{}", rng.random_range(0..CAPACITY * 4));
                    match rng.random_range(0..4) {
                        0 | 1 => {
                            cache.insert(key, format!("v{t}-{i}")).unwrap();
                            assert!(cache.len() <= CAPACITY);
                        }
                        2 => {
                            if let Some(entry) = cache.get(&key).unwrap() {
                                assert_eq!(entry.key(), &key);
                            }
                        }
                        _ => {
                            cache.remove(&key).unwrap();
                        }
                    }
                }
            })
        })
        .collect_vec();
    for handle in handles {
        handle.join().unwrap();
    }

    let keys = cache.keys_sorted();
    assert_eq!(keys.len(), cache.len());
    assert!(cache.len() <= CAPACITY);
    // Every cached key can still be accessed, so the policy tracks all of them.
    for key in keys {
        assert!(cache.get(&key).unwrap().is_some());
    }
}

#[derive(Debug, Default)]
struct RecentEvictions {
    events: Mutex<Vec<(Event, String)>>,
}

impl EventListener for RecentEvictions {
    type Key = String;
    type Value = String;

    fn on_leave(&self, reason: Event, key: &String, _: &String) {
        self.events.lock().unwrap().push((reason, key.clone()));
    }
}

#[test_log::test]
fn test_event_listener_sees_leaving_entries() {
    let listener = Arc::new(RecentEvictions::default());
    let cache: Cache<String, String> = CacheBuilder::new(4)
        .with_eviction_percentage(50)
        .with_event_listener(listener.clone())
        .build()
        .unwrap();

    for key in ["a", "b", "c", "d"] {
        put(&cache, key, "v");
    }
    put(&cache, "a", "v2");
    put(&cache, "e", "v");
    cache.remove("e").unwrap();

    let events = listener.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            (Event::Replace, "a".to_string()),
            (Event::Evict, "b".to_string()),
            (Event::Evict, "c".to_string()),
            (Event::Remove, "e".to_string()),
        ]
    );
    assert_eq!(cache.keys_sorted(), vec!["a", "d"]);
}

/// An LRU policy that refuses to touch one key and caps the victims of each pass.
struct Faulty {
    lru: Lru<String, String>,
    deny: &'static str,
    victims: usize,
}

impl Eviction for Faulty {
    type Key = String;
    type Value = String;

    fn on_add(&mut self, key: &String) -> Result<()> {
        self.lru.on_add(key)
    }

    fn on_access(&mut self, key: &String) -> Result<()> {
        if key == self.deny {
            return Err(Error::not_found(key));
        }
        self.lru.on_access(key)
    }

    fn on_update(&mut self, key: &String, value: &String) -> Result<()> {
        self.lru.on_update(key, value)
    }

    fn on_delete(&mut self, key: &String) -> Result<()> {
        if key == self.deny {
            return Err(Error::not_found(key));
        }
        self.lru.on_delete(key)
    }

    fn evict(&mut self, f: &mut dyn FnMut(String) -> bool) -> Result<()> {
        let mut left = self.victims;
        self.lru.evict(&mut |key| {
            left -= 1;
            f(key) && left > 0
        })
    }

    fn len(&self) -> usize {
        self.lru.len()
    }
}

fn faulty_cache(capacity: usize, percentage: usize, victims: usize) -> Cache<String, String> {
    CacheBuilder::new(capacity)
        .with_eviction_percentage(percentage)
        .with_eviction(Faulty {
            lru: Lru::new(capacity),
            deny: "denied",
            victims,
        })
        .build()
        .unwrap()
}

#[test_log::test]
fn test_desync_on_access_is_reported() {
    let cache = faulty_cache(4, 30, usize::MAX);
    put(&cache, "denied", "v");
    put(&cache, "a", "v");

    let err = cache.get("denied").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inconsistent);
    assert_eq!(err.downcast_ref::<Error>().map(|e| e.kind()), Some(ErrorKind::NotFound));
    assert_eq!(get(&cache, "a").as_deref(), Some("v"));

    let err = cache.remove("denied").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inconsistent);
}

#[test_log::test]
fn test_short_eviction_pass_is_reported() {
    let cache = faulty_cache(2, 100, 1);
    put(&cache, "a", "v");
    put(&cache, "b", "v");

    // 3 > 2, quota is 3 but the policy gives up after one victim.
    let err = cache.insert("c".to_string(), "v".to_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Inconsistent);
    assert_eq!(cache.keys_sorted(), vec!["b", "c"]);
}
