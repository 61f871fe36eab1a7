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

//! Archetype ECS - archetype-layout Entity Component System core.
//!
//! Entities are grouped into dense, column-major archetypes by their exact
//! component set. Adding or removing a component moves an entity to a
//! neighboring archetype along an implicit graph keyed by XOR'd component
//! name-hashes. Queries dispatch by walking that graph from a system's
//! anchor archetype instead of scanning every archetype in the world.

pub mod archetype;
pub mod component;
pub mod entity;
pub mod error;
pub mod hash;
pub mod query;
pub mod raw_column;
pub mod robin_hood;
pub mod system;
pub mod world;

pub use archetype::Archetype;
pub use component::{Bundle, Component};
pub use entity::EntityId;
pub use error::{EcsError, Result};
pub use hash::hash_name;
pub use query::Query;
pub use system::{Columns, SystemFn, SystemId};
pub use world::{World, ROOT_ARCHETYPE_ID};
