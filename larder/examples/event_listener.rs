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

use std::sync::Arc;

use larder::{Cache, CacheBuilder, Event, EventListener};

struct EchoEventListener;

impl EventListener for EchoEventListener {
    type Key = u64;
    type Value = String;

    fn on_leave(&self, reason: Event, key: &Self::Key, value: &Self::Value) {
        println!("Entry [key = {key}] [value = {value}] leaves the cache, reason: {reason:?}.")
    }
}

/// Output:
///
/// ```plain
/// Entry [key = 1] [value = First] leaves the cache, reason: Evict.
/// Entry [key = 3] [value = Third] leaves the cache, reason: Replace.
/// Entry [key = 2] [value = Second] leaves the cache, reason: Remove.
/// ```
fn main() -> larder::Result<()> {
    tracing_subscriber::fmt().with_env_filter("larder_memory=debug").init();

    let cache: Cache<u64, String> = CacheBuilder::new(2)
        .with_event_listener(Arc::new(EchoEventListener))
        .build()?;

    cache.insert(1, "First".to_string())?;
    cache.insert(2, "Second".to_string())?;
    cache.insert(3, "Third".to_string())?;
    cache.insert(3, "Forth".to_string())?;
    cache.remove(&2u64)?;

    Ok(())
}
