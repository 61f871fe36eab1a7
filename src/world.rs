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

//! World: the top-level container; entity index, archetype registry,
//! system registry, root archetype, and the public operations built on top
//! of them.

use crate::archetype::Archetype;
use crate::component::{descriptor, Bundle, Component};
use crate::entity::{EntityId, EntityLocation, IdAllocator};
use crate::error::{EcsError, Result};
use crate::hash::{hash_name, mix64};
use crate::robin_hood::RobinHoodMap;
use crate::system::{parse_system_id, Columns, SystemEntry, SystemFn, SystemId};

/// The root archetype, holding entities with no components, always has id 0.
pub const ROOT_ARCHETYPE_ID: u64 = 0;

/// Central ECS world: entities, archetypes, and registered systems.
pub struct World {
    /// entity-id-mixer(entity id) -> (archetype id, row)
    entities: RobinHoodMap<EntityLocation>,
    archetypes: Vec<Archetype>,
    /// archetype id -> index into `archetypes`
    archetype_lookup: RobinHoodMap<u32>,
    systems: Vec<SystemEntry>,
    /// system id -> index into `systems`
    system_lookup: RobinHoodMap<u32>,
    ids: IdAllocator,
}

impl World {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// `hint` pre-sizes the entity index and identifier table, exactly as
    /// `create(hint)` describes. Never fails; use `try_with_capacity` if a
    /// failure channel is needed.
    pub fn with_capacity(hint: usize) -> Self {
        Self::try_with_capacity(hint).expect("capacity hint fits in the 32-bit index space")
    }

    pub fn try_with_capacity(hint: usize) -> Result<Self> {
        if hint > u32::MAX as usize {
            return Err(EcsError::EntityCapacityExhausted { attempted: hint });
        }

        let mut world = Self {
            entities: RobinHoodMap::with_capacity(hint),
            archetypes: Vec::with_capacity(1),
            archetype_lookup: RobinHoodMap::with_capacity(1),
            systems: Vec::new(),
            system_lookup: RobinHoodMap::new(),
            ids: IdAllocator::with_capacity(hint),
        };

        let root = Archetype::new(ROOT_ARCHETYPE_ID);
        world.archetype_lookup.set(ROOT_ARCHETYPE_ID, 0);
        world.archetypes.push(root);

        Ok(world)
    }

    fn archetype_index(&self, archetype_id: u64) -> Option<usize> {
        self.archetype_lookup.get(archetype_id).map(|&i| i as usize)
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    pub fn get_archetype(&self, archetype_id: u64) -> Option<&Archetype> {
        self.archetype_index(archetype_id).map(|i| &self.archetypes[i])
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -----------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------

    /// Spawn a bare entity into the root archetype.
    pub fn spawn(&mut self) -> EntityId {
        let id = self.ids.spawn_id();
        let root = &mut self.archetypes[0];
        let row = root.push_entity(id);
        self.entities.set(mix64(id.0), EntityLocation {
            archetype_id: ROOT_ARCHETYPE_ID,
            row,
        });

        #[cfg(feature = "profiling")]
        tracing::trace!(entity = ?id, "world.spawn");

        id
    }

    /// Spawn an entity with every component of `bundle` already attached, in
    /// one structural transition.
    pub fn spawn_with<B: Bundle>(&mut self, bundle: B) -> EntityId {
        let id = self.ids.spawn_id();
        let descs = B::descriptors();

        let mut archetype_id = ROOT_ARCHETYPE_ID;
        for &(component_id, stride) in &descs {
            archetype_id = self.obtain(archetype_id, component_id, stride, true);
        }

        let idx = self.archetype_index(archetype_id).unwrap();
        B::register_columns(&mut self.archetypes[idx]);
        let archetype = &mut self.archetypes[idx];
        let row = archetype.push_entity(id);

        let mut ptrs = [std::ptr::null_mut(); crate::component::MAX_BUNDLE_COMPONENTS];
        for (i, &(component_id, _)) in descs.iter().enumerate() {
            let col = archetype.get_column_mut(component_id).unwrap();
            col.grow_to(row);
            ptrs[i] = col.get(row).as_ptr() as *mut u8;
        }
        // SAFETY: every pointer was just grown to cover `row` in a column of
        // matching stride for its component, in the same order as `descs`.
        unsafe { bundle.write_into(&ptrs[..descs.len()]) };

        self.entities.set(mix64(id.0), EntityLocation { archetype_id, row });
        id
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains(mix64(id.0))
    }

    /// Despawn an entity, silently doing nothing if it's unknown.
    pub fn despawn(&mut self, id: EntityId) {
        let key = mix64(id.0);
        let Some(location) = self.entities.get(key).copied() else {
            return;
        };

        self.transfer(location.archetype_id, ROOT_ARCHETYPE_ID, location.row);
        // The entity just moved in to root is the last row there; popping it
        // removes it without leaving a row behind (no survivor to fix up,
        // since nothing was ever swapped into the last position).
        let root = &mut self.archetypes[0];
        let last_row = root.len() - 1;
        root.swap_remove_entity(last_row);

        self.entities.remove(key);
        self.ids.free_id(id);

        #[cfg(feature = "profiling")]
        tracing::trace!(entity = ?id, "world.despawn");
    }

    // -----------------------------------------------------------------
    // Components: typed convenience layer
    // -----------------------------------------------------------------

    pub fn set<T: Component>(&mut self, id: EntityId, value: T) {
        let (component_id, stride) = descriptor::<T>();
        let bytes = unsafe {
            std::slice::from_raw_parts((&value as *const T) as *const u8, stride)
        };
        self.set_raw(id, component_id, stride, bytes);
        std::mem::forget(value); // ownership moved into the column via set_raw's byte copy
    }

    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        let (component_id, _stride) = descriptor::<T>();
        let bytes = self.get_raw(id, component_id)?;
        Some(unsafe { &*(bytes.as_ptr() as *const T) })
    }

    pub fn rem<T: Component>(&mut self, id: EntityId) {
        let (component_id, _stride) = descriptor::<T>();
        self.rem_raw(id, component_id);
    }

    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        let (component_id, _) = descriptor::<T>();
        self.entities
            .get(mix64(id.0))
            .and_then(|loc| self.get_archetype(loc.archetype_id))
            .is_some_and(|a| a.has_column(component_id))
    }

    // -----------------------------------------------------------------
    // Components: untyped (by name-hash) layer, the direct Rust
    // equivalent of the spec's `_ecs_set`/`_ecs_get`/`_ecs_rem`.
    // -----------------------------------------------------------------

    pub fn set_by_name(&mut self, id: EntityId, name: &str, stride: usize, data: &[u8]) {
        self.set_raw(id, hash_name(name), stride, data);
    }

    pub fn get_by_name(&self, id: EntityId, name: &str) -> Option<&[u8]> {
        self.get_raw(id, hash_name(name))
    }

    pub fn rem_by_name(&mut self, id: EntityId, name: &str) {
        self.rem_raw(id, hash_name(name));
    }

    pub fn set_raw(&mut self, id: EntityId, component_id: u64, stride: usize, data: &[u8]) {
        let key = mix64(id.0);
        let Some(location) = self.entities.get(key).copied() else {
            return;
        };

        if self.get_archetype(location.archetype_id).unwrap().has_column(component_id) {
            let archetype = &mut self.archetypes[self.archetype_index(location.archetype_id).unwrap()];
            let col = archetype.get_column_mut(component_id).unwrap();
            col.set(location.row, data);
            return;
        }

        let next_id = self.obtain(location.archetype_id, component_id, stride, true);
        let next_row = self.transfer(location.archetype_id, next_id, location.row);

        // `transfer` did not touch the newly added column (it didn't exist
        // in the source archetype); grow it to cover `next_row` then write.
        let archetype = &mut self.archetypes[self.archetype_index(next_id).unwrap()];
        let col = archetype.get_column_mut(component_id).unwrap();
        col.grow_to(next_row);
        col.set(next_row, data);

        self.entities.set(key, EntityLocation { archetype_id: next_id, row: next_row });

        #[cfg(feature = "profiling")]
        tracing::trace!(entity = ?id, component_id, "world.set migrated archetype");
    }

    pub fn get_raw(&self, id: EntityId, component_id: u64) -> Option<&[u8]> {
        let location = self.entities.get(mix64(id.0)).copied()?;
        let archetype = self.get_archetype(location.archetype_id)?;
        let col = archetype.get_column(component_id)?;
        Some(col.get(location.row))
    }

    pub fn rem_raw(&mut self, id: EntityId, component_id: u64) {
        let key = mix64(id.0);
        let Some(location) = self.entities.get(key).copied() else {
            return;
        };
        if !self.get_archetype(location.archetype_id).unwrap().has_column(component_id) {
            return;
        }

        let next_id = self.obtain(location.archetype_id, component_id, 0, false);
        let next_row = self.transfer(location.archetype_id, next_id, location.row);
        self.entities.set(key, EntityLocation { archetype_id: next_id, row: next_row });

        #[cfg(feature = "profiling")]
        tracing::trace!(entity = ?id, component_id, "world.rem migrated archetype");
    }

    // -----------------------------------------------------------------
    // Archetype graph: obtain / transfer
    // -----------------------------------------------------------------

    /// Get or create the archetype reached from `curr_id` by adding
    /// (`set == true`) or removing (`set == false`) `component_id`.
    fn obtain(&mut self, curr_id: u64, component_id: u64, stride: usize, set: bool) -> u64 {
        let next_id = curr_id ^ component_id;
        if self.archetype_lookup.contains(next_id) {
            return next_id;
        }

        let mut next = Archetype::new(next_id);
        let curr_idx = self.archetype_index(curr_id).expect("curr archetype must exist");
        Archetype::qualify(&mut self.archetypes[curr_idx], &mut next, component_id, stride, set);

        let idx = self.archetypes.len() as u32;
        self.archetypes.push(next);
        self.archetype_lookup.set(next_id, idx);

        #[cfg(feature = "profiling")]
        tracing::debug!(archetype_id = next_id, "world.obtain created archetype");

        next_id
    }

    /// Move the entity at `curr_row` of `curr_id` into a fresh row of
    /// `next_id`, preserving every component the two archetypes share.
    /// Returns the destination row. Fixes up the entity record of whichever
    /// entity gets swapped into `curr_row` in the source archetype.
    fn transfer(&mut self, curr_id: u64, next_id: u64, curr_row: usize) -> usize {
        if curr_id == next_id {
            return curr_row;
        }

        let curr_idx = self.archetype_index(curr_id).expect("curr archetype must exist");
        let next_idx = self.archetype_index(next_id).expect("next archetype must exist");

        let moving_entity = self.archetypes[curr_idx].entities()[curr_row];
        let (curr_arch, next_arch) = borrow_two_mut(&mut self.archetypes, curr_idx, next_idx);

        let next_row = next_arch.push_entity(moving_entity);

        let shared_component_ids: Vec<u64> = curr_arch.columns_iter().collect();
        for component_id in shared_component_ids {
            let bytes = curr_arch.get_column(component_id).unwrap().get(curr_row).to_vec();
            if let Some(next_col) = next_arch.get_column_mut(component_id) {
                next_col.push(&bytes);
            }
            curr_arch.get_column_mut(component_id).unwrap().swap_remove(curr_row);
        }

        if let Some(survivor) = curr_arch.swap_remove_entity(curr_row) {
            if let Some(loc) = self.entities.get_mut(mix64(survivor.0)) {
                loc.row = curr_row;
            }
        }

        next_row
    }

    // -----------------------------------------------------------------
    // Systems
    // -----------------------------------------------------------------

    /// Register `func` against a comma/space-separated component name list,
    /// returning the system id the caller later passes to `run`.
    pub fn register(&mut self, names: &str, func: SystemFn) -> SystemId {
        let id = SystemId(parse_system_id(names));
        if let Some(&idx) = self.system_lookup.get(id.0) {
            self.systems[idx as usize].func = func;
        } else {
            let idx = self.systems.len() as u32;
            self.systems.push(SystemEntry { id, func });
            self.system_lookup.set(id.0, idx);
        }
        id
    }

    /// Run the system registered for `system_id` over its anchor archetype
    /// and every archetype reached from it by a chain of edges whose column
    /// count never drops below the archetype the chain just came from;
    /// i.e. every superset of the anchor reachable by adding components,
    /// without ever stepping back down to a subset along the way.
    pub fn run(&mut self, system_id: SystemId) {
        let Some(&idx) = self.system_lookup.get(system_id.0) else {
            return;
        };

        // Taken out of `self.systems` for the duration of the traversal so
        // the callback (`&mut SystemFn`) and the archetype lookups it drives
        // (`&self`) don't alias the same field.
        let mut func = std::mem::replace(&mut self.systems[idx as usize].func, Box::new(|_, _, _| {}));
        self.run_recursive(system_id.0, 0, &mut *func);
        self.systems[idx as usize].func = func;
    }

    /// Run `func` once over the anchor archetype of `B`'s component set and
    /// every archetype reached from it, without registering a `SystemId`.
    /// The ad hoc equivalent of `register` + `run` for a one-off query.
    pub fn for_each<B: Bundle>(&self, mut func: impl FnMut(&Columns, &[EntityId], usize)) {
        let anchor = B::descriptors()
            .iter()
            .fold(0u64, |acc, &(component_id, _)| acc ^ component_id);
        self.run_recursive(anchor, 0, &mut func);
    }

    fn run_recursive(&self, archetype_id: u64, required_columns: usize, func: &mut dyn FnMut(&Columns, &[EntityId], usize)) {
        let Some(archetype) = self.get_archetype(archetype_id) else {
            return;
        };
        if archetype.column_count() < required_columns {
            return;
        }

        if !archetype.is_empty() {
            let columns = Columns::new(archetype);
            (func)(&columns, archetype.entities(), archetype.len());
        }

        let edges: Vec<(u64, u64)> = archetype.edges().collect();
        for (_component_id, neighbor_id) in edges {
            self.run_recursive(neighbor_id, archetype.column_count(), func);
        }
    }
}

/// Mutably borrow two distinct elements of a slice at once.
fn borrow_two_mut<T>(slice: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b);
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pos {
        x: f32,
        y: f32,
    }
    struct Vel(f32);

    #[test]
    fn spawn_set_get() {
        let mut w = World::new();
        let e = w.spawn();
        w.set(e, Pos { x: 1.0, y: 2.0 });
        let p = w.get::<Pos>(e).unwrap();
        assert_eq!(p.x, 1.0);
        assert_eq!(p.y, 2.0);
    }

    #[test]
    fn component_migration_keeps_both_columns() {
        let mut w = World::new();
        let e = w.spawn();
        w.set(e, Pos { x: 0.0, y: 0.0 });
        w.set(e, Vel(9.0));

        assert!(w.has::<Pos>(e));
        assert!(w.has::<Vel>(e));
        assert_eq!(w.get::<Vel>(e).unwrap().0, 9.0);
    }

    #[test]
    fn despawn_and_id_reuse() {
        let mut w = World::new();
        let e1 = w.spawn();
        let _e2 = w.spawn();
        w.despawn(e1);
        let e3 = w.spawn();

        assert_eq!(e3.index(), e1.index());
        assert_eq!(e3.version(), e1.version() + 1);
        assert_ne!(e3, e1);
        assert!(!w.is_alive(e1));
    }

    #[test]
    fn remove_round_trip_restores_archetype_id() {
        let mut w = World::new();
        let e = w.spawn();
        let initial_archetype = w.entities.get(mix64(e.0)).unwrap().archetype_id;

        w.set(e, Pos { x: 1.0, y: 1.0 });
        w.rem::<Pos>(e);

        assert_eq!(w.get::<Pos>(e), None);
        let final_archetype = w.entities.get(mix64(e.0)).unwrap().archetype_id;
        assert_eq!(final_archetype, initial_archetype);
    }

    #[test]
    fn order_independence_of_component_addition() {
        let mut w1 = World::new();
        let e1 = w1.spawn();
        w1.set(e1, Pos { x: 0.0, y: 0.0 });
        w1.set(e1, Vel(1.0));

        let mut w2 = World::new();
        let e2 = w2.spawn();
        w2.set(e2, Vel(1.0));
        w2.set(e2, Pos { x: 0.0, y: 0.0 });

        let a1 = w1.entities.get(mix64(e1.0)).unwrap().archetype_id;
        let a2 = w2.entities.get(mix64(e2.0)).unwrap().archetype_id;
        assert_eq!(a1, a2);
    }

    #[test]
    fn query_dispatch_runs_on_every_superset_archetype() {
        let mut w = World::new();
        let e1 = w.spawn();
        w.set(e1, Pos { x: 1.0, y: 1.0 });

        let e2 = w.spawn();
        w.set(e2, Pos { x: 2.0, y: 2.0 });
        w.set(e2, Vel(5.0));

        let hits = std::cell::RefCell::new(0);
        let sys = w.register("Pos", Box::new(|cols: &Columns, _entities, rows| {
            assert!(rows > 0);
            assert!(cols.field::<Pos>().is_some());
            *hits.borrow_mut() += 1;
        }));
        w.run(sys);

        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn system_does_not_run_on_non_superset_archetypes() {
        let mut w = World::new();
        let e1 = w.spawn();
        w.set(e1, Vel(1.0)); // {Vel} only, not {Pos}

        let hits = std::cell::RefCell::new(0);
        let sys = w.register("Pos", Box::new(|_cols: &Columns, _e, _r| {
            *hits.borrow_mut() += 1;
        }));
        w.run(sys);

        assert_eq!(*hits.borrow(), 0);
    }
}
