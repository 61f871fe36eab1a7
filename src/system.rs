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

//! System registration and the column view handed to a running system.

use crate::archetype::Archetype;
use crate::component::{descriptor, Component};
use crate::entity::EntityId;
use crate::hash::hash_name;

/// Id of a registered system: the XOR of the name-hashes of the components
/// it reads, which by construction equals the archetype id of its minimal
/// matching archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(pub u64);

/// A read-only view over one archetype's columns, handed to a system
/// callback for one invocation. The callback is blind to which columns exist
/// beyond the ones in its own component set; it asks for each by name or
/// type via `field`.
pub struct Columns<'a> {
    archetype: &'a Archetype,
}

impl<'a> Columns<'a> {
    pub(crate) fn new(archetype: &'a Archetype) -> Self {
        Self { archetype }
    }

    /// Typed field lookup: the first element of the named column,
    /// reinterpreted as a `&[T]` of `row_count` elements.
    pub fn field<T: Component>(&self) -> Option<&'a [T]> {
        let (component_id, stride) = descriptor::<T>();
        debug_assert_eq!(stride, std::mem::size_of::<T>());
        self.field_by_id(component_id)
    }

    /// Untyped field lookup by component name, mirroring the spec's
    /// `field(columns_ref, name)` boundary helper.
    pub fn field_by_name<T: Component>(&self, name: &str) -> Option<&'a [T]> {
        self.field_by_id(hash_name(name))
    }

    fn field_by_id<T>(&self, component_id: u64) -> Option<&'a [T]> {
        let col = self.archetype.get_column(component_id)?;
        if col.is_empty() {
            return None;
        }
        let bytes = col.as_bytes();
        debug_assert_eq!(bytes.len() % std::mem::size_of::<T>().max(1), 0);
        // SAFETY: the column was created with stride == size_of::<T>() by
        // whoever wrote to it via the typed API, and `bytes` covers exactly
        // `col.len()` contiguous, initialized elements.
        Some(unsafe {
            std::slice::from_raw_parts(bytes.as_ptr() as *const T, col.len())
        })
    }

    pub fn row_count(&self) -> usize {
        self.archetype.len()
    }

    pub fn entities(&self) -> &'a [EntityId] {
        self.archetype.entities()
    }
}

/// A system callback: given the columns of a matching archetype, its entity
/// row vector, and the row count, do whatever per-row work the caller wants.
/// May mutate component values in place but must not perform structural
/// mutation (spawn/despawn/add/remove) on entities in the archetype being
/// iterated; see the concurrency model.
pub type SystemFn = Box<dyn FnMut(&Columns, &[EntityId], usize)>;

pub(crate) struct SystemEntry {
    pub id: SystemId,
    pub func: SystemFn,
}

/// Parse a comma/space-separated component name list into its XOR'd system
/// id, matching `ecs_register`'s token-combining rule exactly.
pub fn parse_system_id(names: &str) -> u64 {
    names
        .split([',', ' '])
        .filter(|tok| !tok.is_empty())
        .fold(0u64, |acc, tok| acc ^ hash_name(tok))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_order_independent() {
        assert_eq!(parse_system_id("a, b"), parse_system_id("b a"));
    }

    #[test]
    fn parse_empty_is_zero() {
        assert_eq!(parse_system_id(""), 0);
        assert_eq!(parse_system_id("  "), 0);
    }

    #[test]
    fn parse_single_equals_its_own_hash() {
        assert_eq!(parse_system_id("Position"), hash_name("Position"));
    }
}
