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

//! larder - a bounded in-memory key-value cache with a pluggable eviction policy.
//!
//! ```
//! use larder::{Cache, CacheBuilder, EvictionStrategy};
//!
//! let cache: Cache<String, String> = CacheBuilder::new(10)
//!     .with_eviction_strategy(EvictionStrategy::Lru)
//!     .build()
//!     .unwrap();
//!
//! cache.insert("hello".to_string(), "world".to_string()).unwrap();
//! let entry = cache.get("hello").unwrap().unwrap();
//! assert_eq!(entry.value(), "world");
//! ```

/// Shared components.
pub mod common {
    pub use larder_common::*;
}

/// In-memory cache.
pub mod memory {
    pub use larder_memory::*;
}

mod prelude;
pub use prelude::*;
