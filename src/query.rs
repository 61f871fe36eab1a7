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

//! Typed query sugar over `World::register`/`run`/`for_each`.
//!
//! A `Query<(A, B, ...)>` names a component set the same way a `Bundle`
//! does, and derives the system id that set's anchor archetype would have
//! without the caller computing the XOR by hand.

use std::marker::PhantomData;

use crate::component::Bundle;
use crate::system::SystemId;

/// A component set used purely to derive a `SystemId`, not to store data.
/// `B` is any tuple of up to eight `Component`s, the same bound `Bundle`
/// tuple impls already satisfy.
pub struct Query<B> {
    _marker: PhantomData<fn() -> B>,
}

impl<B: Bundle> Query<B> {
    /// The id of the anchor archetype holding exactly `B`'s components;
    /// the same value `World::register` would compute from the equivalent
    /// component name list.
    pub fn system_id() -> SystemId {
        let id = B::descriptors()
            .iter()
            .fold(0u64, |acc, &(component_id, _)| acc ^ component_id);
        SystemId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    struct Pos {
        x: f32,
        y: f32,
    }
    struct Vel(f32);

    #[test]
    fn system_id_is_order_independent() {
        assert_eq!(
            Query::<(Pos, Vel)>::system_id().0,
            Query::<(Vel, Pos)>::system_id().0
        );
    }

    #[test]
    fn system_id_matches_registration_by_bare_name() {
        // The typed and untyped layers hash the same short name, so a
        // system anchored by `Query::<(Pos,)>` lines up with one registered
        // against the literal name `"Pos"`.
        assert_eq!(Query::<(Pos,)>::system_id().0, crate::hash::hash_name("Pos"));
    }

    #[test]
    fn for_each_finds_matching_archetypes() {
        let mut w = World::new();
        let e1 = w.spawn();
        w.set(e1, Pos { x: 1.0, y: 1.0 });

        let e2 = w.spawn();
        w.set(e2, Pos { x: 2.0, y: 2.0 });
        w.set(e2, Vel(3.0));

        let mut hits = 0;
        w.for_each::<(Pos,)>(|cols, _entities, rows| {
            assert!(cols.field::<Pos>().is_some());
            hits += rows;
        });

        assert_eq!(hits, 2);
    }

    #[test]
    fn for_each_excludes_non_matching_archetypes() {
        let mut w = World::new();
        let e1 = w.spawn();
        w.set(e1, Vel(1.0));

        let mut hits = 0;
        w.for_each::<(Pos,)>(|_cols, _entities, rows| {
            hits += rows;
        });

        assert_eq!(hits, 0);
    }
}
