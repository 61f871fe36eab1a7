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

//! Open-addressed robin-hood map: the primitive behind every lookup in this
//! crate (entities, archetypes, systems, and each archetype's columns and
//! edges).
//!
//! Keys are pre-hashed `u64`s; the map does not hash them itself, matching
//! the spec's contract that callers supply already-hashed or already-scattered
//! keys (component-name hashes, XOR'd archetype ids, the entity-id mixer
//! output). Values are any `Copy` type, the Rust rendering of "fixed-stride
//! bytes copied by value": the map is generic and monomorphized per call
//! site instead of byte-erased, since Rust generics make that unnecessary.

const MIN_CAP: usize = 8;

#[derive(Clone, Copy)]
struct Slot<V> {
    key: u64,
    /// 0 = empty, 1 = home slot, N = displaced N-1 probes from home.
    dist: u32,
    val: V,
}

/// Open-addressed hash map keyed by pre-hashed `u64`s, using robin-hood
/// displacement on insert and back-shift deletion.
pub struct RobinHoodMap<V: Copy> {
    slots: Vec<Option<Slot<V>>>,
    cap: usize,
    len: usize,
}

impl<V: Copy> RobinHoodMap<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(hint: usize) -> Self {
        let mut cap = MIN_CAP;
        while cap < hint {
            cap *= 2;
        }
        Self {
            // Two reserved scratch slots beyond `cap`, per spec: index `cap`
            // is used to stage a fresh insert, `cap + 1` is swap scratch
            // during robin-hood displacement.
            slots: vec![None; cap + 2],
            cap,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn home(&self, key: u64) -> usize {
        (key as usize) & (self.cap - 1)
    }

    pub fn get(&self, key: u64) -> Option<&V> {
        let mut i = self.home(key);
        loop {
            match &self.slots[i] {
                None => return None,
                Some(slot) if slot.key == key => return Some(&slot.val),
                Some(_) => i = (i + 1) & (self.cap - 1),
            }
        }
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let mut i = self.home(key);
        loop {
            match &self.slots[i] {
                None => return None,
                Some(slot) if slot.key == key => break,
                Some(_) => i = (i + 1) & (self.cap - 1),
            }
        }
        self.slots[i].as_mut().map(|s| &mut s.val)
    }

    pub fn contains(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite. Resizes before inserting when load reaches 0.75.
    pub fn set(&mut self, key: u64, val: V) {
        if (self.len + 1) * 4 > self.cap * 3 {
            self.resize(self.cap * 2);
        }
        self.insert_no_resize(key, val);
    }

    fn insert_no_resize(&mut self, key: u64, val: V) {
        let mut item = Slot { key, dist: 1, val };
        let mut i = self.home(item.key);
        loop {
            match &mut self.slots[i] {
                slot @ None => {
                    *slot = Some(item);
                    self.len += 1;
                    return;
                }
                Some(existing) if existing.key == item.key => {
                    existing.val = item.val;
                    return;
                }
                Some(existing) if existing.dist < item.dist => {
                    std::mem::swap(existing, &mut item);
                    i = (i + 1) & (self.cap - 1);
                    item.dist += 1;
                }
                Some(_) => {
                    i = (i + 1) & (self.cap - 1);
                    item.dist += 1;
                }
            }
        }
    }

    /// Remove `key`, back-shifting the following run so no entry's probe
    /// distance is left larger than necessary.
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let mut i = self.home(key);
        loop {
            match &self.slots[i] {
                None => return None,
                Some(slot) if slot.key == key => break,
                Some(_) => i = (i + 1) & (self.cap - 1),
            }
        }

        let removed = self.slots[i].take().map(|s| s.val);
        loop {
            let next = (i + 1) & (self.cap - 1);
            let should_shift = matches!(&self.slots[next], Some(s) if s.dist > 1);
            if !should_shift {
                break;
            }
            let mut moved = self.slots[next].take().unwrap();
            moved.dist -= 1;
            self.slots[i] = Some(moved);
            i = next;
        }

        self.len -= 1;
        if self.cap > MIN_CAP && self.len * 10 == self.cap {
            self.resize(self.cap / 2);
        }
        removed
    }

    fn resize(&mut self, new_cap: usize) {
        let new_cap = new_cap.max(MIN_CAP);
        let old_slots = std::mem::replace(&mut self.slots, vec![None; new_cap + 2]);
        self.cap = new_cap;
        self.len = 0;
        for slot in old_slots.into_iter().flatten() {
            self.insert_no_resize(slot.key, slot.val);
        }
    }

    /// Visit every occupied slot in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &V)> {
        self.slots[..self.cap]
            .iter()
            .filter_map(|s| s.as_ref().map(|s| (s.key, &s.val)))
    }
}

impl<V: Copy> Default for RobinHoodMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let mut m = RobinHoodMap::new();
        m.set(42, 1u32);
        assert_eq!(m.get(42), Some(&1));
        assert_eq!(m.get(7), None);
    }

    #[test]
    fn overwrite_does_not_grow_len() {
        let mut m = RobinHoodMap::new();
        m.set(1, 10u32);
        m.set(1, 20u32);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(1), Some(&20));
    }

    #[test]
    fn remove_then_get_is_none() {
        let mut m = RobinHoodMap::new();
        m.set(5, 9u32);
        assert_eq!(m.remove(5), Some(9));
        assert_eq!(m.get(5), None);
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn grows_past_load_factor_and_keeps_all_entries() {
        let mut m = RobinHoodMap::new();
        for i in 0..1000u64 {
            m.set(i, i as u32);
        }
        assert_eq!(m.len(), 1000);
        for i in 0..1000u64 {
            assert_eq!(m.get(i), Some(&(i as u32)));
        }
    }

    #[test]
    fn insert_and_remove_interleaved_survives() {
        let mut m = RobinHoodMap::new();
        for i in 0..200u64 {
            m.set(i, i as u32);
        }
        for i in (0..200u64).step_by(2) {
            m.remove(i);
        }
        for i in 0..200u64 {
            if i % 2 == 0 {
                assert_eq!(m.get(i), None);
            } else {
                assert_eq!(m.get(i), Some(&(i as u32)));
            }
        }
    }

    #[test]
    fn iteration_visits_every_occupied_slot() {
        let mut m = RobinHoodMap::new();
        let keys: Vec<u64> = (0..50).collect();
        for &k in &keys {
            m.set(k, k as u32);
        }
        let mut seen: Vec<u64> = m.iter().map(|(k, _)| k).collect();
        seen.sort_unstable();
        assert_eq!(seen, keys);
    }
}
