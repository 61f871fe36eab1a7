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

//! One node of the archetype graph: a set of columns (one per component), a
//! dense row vector of entity ids, and an edge map to neighboring archetypes.

use crate::entity::EntityId;
use crate::raw_column::RawColumn;
use crate::robin_hood::RobinHoodMap;

/// The set of components attached to every entity in this archetype, stored
/// column-major, plus the edges of the archetype graph that touch it.
pub struct Archetype {
    id: u64,
    entities: Vec<EntityId>,
    column_store: Vec<RawColumn>,
    /// component_id -> index into `column_store`.
    columns: RobinHoodMap<u32>,
    /// component_id -> neighbor archetype id reachable by adding/removing
    /// that component.
    edges: RobinHoodMap<u64>,
}

impl Archetype {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            entities: Vec::new(),
            column_store: Vec::new(),
            columns: RobinHoodMap::new(),
            edges: RobinHoodMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, component_id: u64) -> bool {
        self.columns.contains(component_id)
    }

    pub fn get_column(&self, component_id: u64) -> Option<&RawColumn> {
        let idx = *self.columns.get(component_id)?;
        self.column_store.get(idx as usize)
    }

    pub fn get_column_mut(&mut self, component_id: u64) -> Option<&mut RawColumn> {
        let idx = *self.columns.get(component_id)?;
        self.column_store.get_mut(idx as usize)
    }

    /// Create an empty column of `stride` for `component_id` if one doesn't
    /// already exist.
    pub fn ensure_column(&mut self, component_id: u64, stride: usize) {
        if self.columns.contains(component_id) {
            return;
        }
        let idx = self.column_store.len() as u32;
        self.column_store.push(RawColumn::new(stride));
        self.columns.set(component_id, idx);
    }

    pub fn edge(&self, component_id: u64) -> Option<u64> {
        self.edges.get(component_id).copied()
    }

    pub fn set_edge(&mut self, component_id: u64, neighbor_id: u64) {
        self.edges.set(component_id, neighbor_id);
    }

    pub fn edges(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.edges.iter().map(|(k, v)| (k, *v))
    }

    pub fn columns_iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.columns.iter().map(|(k, _)| k)
    }

    /// Append `entity` to the row vector. Returns its new row.
    pub fn push_entity(&mut self, entity: EntityId) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Swap-remove the entity at `row`. Returns the entity that was swapped
    /// into `row` to take its place, if any (the caller must update that
    /// entity's record).
    pub fn swap_remove_entity(&mut self, row: usize) -> Option<EntityId> {
        self.entities.swap_remove(row);
        self.entities.get(row).copied()
    }

    /// Initialize `next` to represent `curr`'s component set plus-or-minus
    /// `component_id`, per the spec's `qualify` procedure. `next.id` must
    /// already equal `curr.id ^ component_id`.
    ///
    /// Lazily pre-labels every edge `next` would share with `curr`'s existing
    /// neighbors using the XOR identity, before those neighbor archetypes
    /// necessarily exist, and installs the `component_id` edge between `curr`
    /// and `next` in both directions when `set` is true.
    pub fn qualify(curr: &mut Archetype, next: &mut Archetype, component_id: u64, stride: usize, set: bool) {
        for (key, _neighbor) in curr.edges() {
            next.set_edge(key, next.id ^ key);

            let Some(curr_col) = curr.get_column(key) else {
                continue;
            };
            if !set && key == component_id {
                continue; // the column being dropped
            }
            next.ensure_column(key, curr_col.stride());
        }

        if set {
            curr.set_edge(component_id, next.id);
            next.set_edge(component_id, curr.id);
            next.ensure_column(component_id, stride);
        }
    }
}
