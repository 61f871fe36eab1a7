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

//! Error type for the one class of failure the spec treats as recoverable:
//! allocator exhaustion on container growth. Lookup misses (unknown entity,
//! unknown component, unknown system) are silent no-ops or `None` by design,
//! not errors; see the spec's error handling design for the rationale.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A capacity hint or entity count would overflow the 32-bit index
    /// space the identifier allocator packs into an `EntityId`.
    EntityCapacityExhausted { attempted: usize },
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::EntityCapacityExhausted { attempted } => {
                write!(f, "entity capacity exhausted: attempted {attempted} entities, index space is 32-bit")
            }
        }
    }
}

impl std::error::Error for EcsError {}

pub type Result<T> = std::result::Result<T, EcsError>;
