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

//! Component identity and the typed `Bundle` convenience built on top of the
//! name-hash/stride model.
//!
//! Internally a component is only ever a `(component_id: u64, stride: usize)`
//! pair; everything in this module exists to compute that pair at the Rust
//! call site instead of through a C preprocessor stringification macro.

use smallvec::{smallvec, SmallVec};

use crate::archetype::Archetype;
use crate::hash::{hash_name, short_type_name};

/// Maximum number of components a `Bundle` tuple impl supports.
pub const MAX_BUNDLE_COMPONENTS: usize = 8;

/// Marker trait for component types: any `'static + Send + Sync` type
/// qualifies, mirroring the spec's "named, fixed-stride datum" with no
/// further constraints.
pub trait Component: 'static + Send + Sync {}
impl<T: 'static + Send + Sync> Component for T {}

/// The component id and stride for `T`, computed at the call site.
///
/// The id is the name-hash of `T`'s short type name (module path stripped),
/// so a system registered against the bare name `"Position"` via the
/// untyped API matches entities whose `Position` was attached through the
/// typed `set`/`spawn_with` API, since both hash the same string. Cross-process
/// stability is explicitly not required by the spec, only within-process
/// agreement across registrations, which `hash_name` provides.
pub fn descriptor<T: Component>() -> (u64, usize) {
    let name = short_type_name(std::any::type_name::<T>());
    (hash_name(name), std::mem::size_of::<T>())
}

/// A group of components spawned onto one entity in a single structural
/// transition instead of one `set` per component.
pub trait Bundle: Send + Sync + 'static {
    /// `(component_id, stride)` for every component in the bundle.
    fn descriptors() -> SmallVec<[(u64, usize); MAX_BUNDLE_COMPONENTS]>
    where
        Self: Sized;

    /// Ensure every component's column exists on `archetype`.
    fn register_columns(archetype: &mut Archetype)
    where
        Self: Sized;

    /// Write each component's bytes to the corresponding pointer in `ptrs`,
    /// in the same order as `descriptors()`.
    ///
    /// # Safety
    /// Each pointer must be valid for a write of that component's stride and
    /// properly aligned for its type.
    unsafe fn write_into(self, ptrs: &[*mut u8]);
}

macro_rules! impl_bundle {
    ($($T:ident),*) => {
        impl<$($T: Component),*> Bundle for ($($T,)*) {
            fn descriptors() -> SmallVec<[(u64, usize); MAX_BUNDLE_COMPONENTS]> {
                smallvec![$(descriptor::<$T>()),*]
            }

            fn register_columns(archetype: &mut Archetype) {
                $(archetype.ensure_column(descriptor::<$T>().0, descriptor::<$T>().1);)*
            }

            #[allow(non_snake_case)]
            unsafe fn write_into(self, ptrs: &[*mut u8]) {
                let ($($T,)*) = self;
                let mut i = 0;
                $(
                    std::ptr::write(ptrs[i] as *mut $T, $T);
                    i += 1;
                )*
                let _ = i;
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_component_descriptor() {
        #[derive(Clone, Copy)]
        struct Position {
            x: f32,
            y: f32,
        }
        let descs = <(Position,)>::descriptors();
        assert_eq!(descs.len(), 1);
        assert_eq!(descs[0].1, std::mem::size_of::<Position>());
    }

    #[test]
    fn multi_component_descriptor_order_matches_tuple_order() {
        #[derive(Clone, Copy)]
        struct A(u8);
        #[derive(Clone, Copy)]
        struct B(u32);
        let descs = <(A, B)>::descriptors();
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[0], descriptor::<A>());
        assert_eq!(descs[1], descriptor::<B>());
    }

    #[test]
    fn descriptor_is_consistent_across_calls() {
        struct Tag;
        assert_eq!(descriptor::<Tag>(), descriptor::<Tag>());
    }
}
