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

use crate::eviction::Eviction;

/// Dump the tracked keys of an eviction policy in eviction order, the next victim first.
pub trait Dump: Eviction {
    /// Dump without changing the policy state.
    fn dump(&self) -> Vec<Self::Key>;
}

/// Assert that a policy yields exactly `expected` as victims, in order, and is left empty.
pub fn assert_eviction_order<E>(eviction: &mut E, expected: &[E::Key])
where
    E: Eviction,
{
    let mut victims = Vec::with_capacity(expected.len());
    if !eviction.is_empty() {
        eviction
            .evict(&mut |key| {
                victims.push(key);
                true
            })
            .unwrap();
    }
    assert_eq!(victims, expected);
    assert!(eviction.is_empty());
}
