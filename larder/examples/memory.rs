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

use larder::{Cache, CacheBuilder, EvictionStrategy};

fn main() -> larder::Result<()> {
    let cache: Cache<String, String> = CacheBuilder::new(16)
        .with_eviction_strategy(EvictionStrategy::Lru)
        .build()?;

    let entry = cache.insert("hello".to_string(), "world".to_string())?;
    let e = cache.get("hello")?.unwrap();

    assert_eq!(entry.value(), e.value());
    assert_eq!(cache.keys_sorted(), vec!["hello".to_string()]);

    // Only LRU is supported for now.
    let err = CacheBuilder::<String, String>::new(16)
        .with_eviction_strategy(EvictionStrategy::Fifo)
        .build()
        .unwrap_err();
    println!("{err}");

    Ok(())
}
