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

//! In-memory cache with a pluggable eviction policy for larder.
//!
//! The cache owns the entries and decides when to evict; the [`Eviction`] policy tracks every cached
//! key and decides which one to evict. Both are guarded by one lock per cache.

mod cache;
/// Eviction policies.
pub mod eviction;
mod prelude;
mod raw;
mod record;

pub use prelude::*;
