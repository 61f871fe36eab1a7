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

//! Entity identifiers, their (version, index) packing, and the recyclable
//! identifier allocator backing them.

/// An opaque, versioned 64-bit entity identifier: 32-bit index in the low
/// half, 32-bit version in the high half. Equality is byte equality, so two
/// ids sharing an index but differing in version are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn new(version: u32, index: u32) -> Self {
        EntityId(((version as u64) << 32) | index as u64)
    }

    pub fn index(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    pub fn version(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

/// Location of a live entity: which archetype it's in, and its row there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    pub archetype_id: u64,
    pub row: usize,
}

const SENTINEL: u32 = u32::MAX;

/// Packs `(version, index)` into recyclable 64-bit ids.
///
/// Each slot in `ids` either holds the id of the live entity at that index,
/// or, when free, a packed value whose low 32 bits are the next free index
/// (the implicit freelist) and whose high 32 bits are the version to hand out
/// on the next allocation at that index.
pub struct IdAllocator {
    ids: Vec<u64>,
    next_idx: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            next_idx: SENTINEL,
        }
    }

    pub fn with_capacity(hint: usize) -> Self {
        Self {
            ids: Vec::with_capacity(hint),
            next_idx: SENTINEL,
        }
    }

    /// Allocate a fresh id, recycling a freed index when one is available.
    pub fn spawn_id(&mut self) -> EntityId {
        if self.next_idx == SENTINEL {
            let index = self.ids.len() as u32;
            let id = EntityId::new(0, index);
            self.ids.push(id.0);
            id
        } else {
            let index = self.next_idx;
            let slot = self.ids[index as usize];
            let version = (slot >> 32) as u32;
            self.next_idx = (slot & 0xFFFF_FFFF) as u32;
            let id = EntityId::new(version, index);
            self.ids[index as usize] = id.0;
            id
        }
    }

    /// Return `id` to the freelist, bumping the version stored at its index.
    pub fn free_id(&mut self, id: EntityId) {
        let index = id.index();
        let next_version = id.version().wrapping_add(1);
        let freed = ((next_version as u64) << 32) | self.next_idx as u64;
        self.ids[index as usize] = freed;
        self.next_idx = index;
    }

    /// Whether `id` is the currently live id at its index (not stale, not
    /// freed).
    pub fn is_live(&self, id: EntityId) -> bool {
        self.ids
            .get(id.index() as usize)
            .is_some_and(|&slot| slot == id.0)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_round_trips() {
        let id = EntityId::new(7, 42);
        assert_eq!(id.version(), 7);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn first_spawns_get_dense_indices_version_zero() {
        let mut a = IdAllocator::new();
        let e0 = a.spawn_id();
        let e1 = a.spawn_id();
        assert_eq!(e0.index(), 0);
        assert_eq!(e1.index(), 1);
        assert_eq!(e0.version(), 0);
        assert_eq!(e1.version(), 0);
        assert!(a.is_live(e0));
        assert!(a.is_live(e1));
    }

    #[test]
    fn free_then_spawn_reuses_index_with_bumped_version() {
        let mut a = IdAllocator::new();
        let e0 = a.spawn_id();
        let e1 = a.spawn_id();
        a.free_id(e0);
        let e2 = a.spawn_id();

        assert_eq!(e2.index(), e0.index());
        assert_eq!(e2.version(), e0.version() + 1);
        assert_ne!(e2, e0);
        assert!(!a.is_live(e0));
        assert!(a.is_live(e1));
        assert!(a.is_live(e2));
    }

    #[test]
    fn freelist_is_lifo() {
        let mut a = IdAllocator::new();
        let e0 = a.spawn_id();
        let e1 = a.spawn_id();
        a.free_id(e0);
        a.free_id(e1);
        let e2 = a.spawn_id();
        let e3 = a.spawn_id();
        assert_eq!(e2.index(), e1.index());
        assert_eq!(e3.index(), e0.index());
    }
}
