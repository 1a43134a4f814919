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

use std::{fmt::Debug, hash::Hash};

/// Key trait for the cache.
///
/// `Ord` is required so that the cached keys can be listed in a stable order for inspection.
pub trait Key: Send + Sync + 'static + Hash + Eq + Ord + Clone + Debug {}
impl<T: Send + Sync + 'static + Hash + Eq + Ord + Clone + Debug> Key for T {}

/// Value trait for the cache.
///
/// Values are opaque to eviction policies and are never mutated in place.
pub trait Value: Send + Sync + 'static + Debug {}
impl<T: Send + Sync + 'static + Debug> Value for T {}
