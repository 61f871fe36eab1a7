// Copyright 2024 Saptak Santra
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

//! Name hashing and the entity-id mixer.
//!
//! Both functions are "injected dependencies" at the specification boundary:
//! any stable 64-bit hash and any bijective 64-bit mix satisfy the contract.
//! We pick concrete, deterministic implementations so the same component name
//! or entity id always maps to the same key within a process.

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Stable 64-bit hash of a component name, used as the component id.
///
/// `FxHasher` has no random seed, so two calls with the same string in the
/// same process (the only stability the spec requires) always agree.
pub fn hash_name(name: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish()
}

/// Strip the module path from a `std::any::type_name::<T>()` string, leaving
/// just the type's own name (generic arguments included verbatim).
///
/// Exists so a component's id agrees whether it was derived from its Rust
/// type (`descriptor::<T>()`) or from its bare name via the untyped,
/// string-keyed API (`set_by_name`, `register`); both end up hashing the
/// same short name for types with names unique per scope.
pub fn short_type_name(type_name: &str) -> &str {
    let generic_start = type_name.find('<').unwrap_or(type_name.len());
    let head = &type_name[..generic_start];
    let short_head_start = head.rfind("::").map(|i| i + 2).unwrap_or(0);
    &type_name[short_head_start..]
}

/// Bijective 64-bit mix (splitmix64's output step), used to key the entity
/// map so that dense entity indices and XOR-scattered archetype ids never
/// collide in the same key domain.
pub fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_within_process() {
        assert_eq!(hash_name("Position"), hash_name("Position"));
        assert_ne!(hash_name("Position"), hash_name("Velocity"));
    }

    #[test]
    fn mix_is_injective_on_sample() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..10_000u64 {
            assert!(seen.insert(mix64(i)), "collision at {i}");
        }
    }

    #[test]
    fn mix_is_deterministic() {
        assert_eq!(mix64(42), mix64(42));
    }

    #[test]
    fn short_type_name_strips_module_path() {
        assert_eq!(short_type_name("archetype_ecs::world::Position"), "Position");
        assert_eq!(short_type_name("Position"), "Position");
    }

    #[test]
    fn short_type_name_keeps_generic_args() {
        assert_eq!(
            short_type_name("my_crate::Wrapper<my_crate::inner::Foo>"),
            "Wrapper<my_crate::inner::Foo>"
        );
    }
}
