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

//! Untyped dynamic array: a contiguous buffer of `len` elements of fixed
//! `stride`, indexed by row. This is the storage behind one archetype column.

/// A type-erased, growable, contiguous buffer of fixed-stride elements.
///
/// Stores `len` elements of `stride` bytes each in `data`. Growth is
/// grow-only and deterministic (`cap + cap / 2`, minimum `+1`) so capacity
/// progressions are reproducible in tests.
pub struct RawColumn {
    data: Vec<u8>,
    stride: usize,
    len: usize,
}

impl RawColumn {
    pub fn new(stride: usize) -> Self {
        Self {
            data: Vec::new(),
            stride,
            len: 0,
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ensure room for at least `new_cap` elements without reallocating again.
    pub fn reserve(&mut self, new_cap: usize) {
        let cur_cap = self.capacity();
        if new_cap <= cur_cap {
            return;
        }
        let mut cap = cur_cap.max(1);
        while cap < new_cap {
            cap += (cap / 2).max(1);
        }
        self.data.reserve(cap * self.stride - self.data.len());
    }

    pub fn capacity(&self) -> usize {
        if self.stride == 0 {
            usize::MAX
        } else {
            self.data.capacity() / self.stride
        }
    }

    /// Append one element, copying `stride` bytes from `bytes`. Returns the
    /// index at which it was inserted.
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        debug_assert_eq!(bytes.len(), self.stride);
        self.reserve(self.len + 1);
        self.data.extend_from_slice(bytes);
        let idx = self.len;
        self.len += 1;
        idx
    }

    /// Remove the last element, returning its bytes. Returns `None` on an
    /// empty column (the safe-Rust analogue of a null pointer).
    pub fn pop(&mut self) -> Option<Vec<u8>> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let start = self.len * self.stride;
        let bytes = self.data[start..start + self.stride].to_vec();
        self.data.truncate(start);
        Some(bytes)
    }

    /// Byte view of the element at `i`. No bounds check: callers must keep
    /// `i < len`.
    pub fn get(&self, i: usize) -> &[u8] {
        let start = i * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Overwrite the element at `i` with `bytes`, extending the backing
    /// buffer first if `i` falls beyond the current logical length (used by
    /// `Archetype::transfer` to materialize a row before its length catches
    /// up). A no-op if `bytes` is empty and `stride == 0`.
    pub fn set(&mut self, i: usize, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), self.stride);
        let start = i * self.stride;
        let end = start + self.stride;
        if end > self.data.len() {
            self.reserve(i + 1);
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(bytes);
    }

    /// Grow the logical length to cover row `i` without writing anything
    /// (used right before `set` when a column is being grown one row behind
    /// the archetype's row vector, per the `set` operation's transient
    /// inconsistency documented in the spec).
    pub fn grow_to(&mut self, i: usize) {
        let end = (i + 1) * self.stride;
        if end > self.data.len() {
            self.reserve(i + 1);
            self.data.resize(end, 0);
        }
        if i + 1 > self.len {
            self.len = i + 1;
        }
    }

    /// Swap-remove: overwrite `i` with the last element, then shrink by one.
    /// Returns the bytes that were at `i` before the swap.
    pub fn swap_remove(&mut self, i: usize) -> Vec<u8> {
        let removed = self.get(i).to_vec();
        if let Some(last) = self.pop() {
            if i < self.len {
                self.set(i, &last);
            }
        }
        removed
    }

    /// Raw byte slice covering every live element, for typed reinterpretation
    /// by callers (the `field` helper).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len * self.stride]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_round_trip() {
        let mut col = RawColumn::new(4);
        let idx = col.push(&1i32.to_ne_bytes());
        assert_eq!(idx, 0);
        assert_eq!(col.get(0), &1i32.to_ne_bytes());
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut col = RawColumn::new(4);
        assert!(col.pop().is_none());
    }

    #[test]
    fn swap_remove_preserves_remaining_order_invariant() {
        let mut col = RawColumn::new(4);
        col.push(&1i32.to_ne_bytes());
        col.push(&2i32.to_ne_bytes());
        col.push(&3i32.to_ne_bytes());

        let removed = col.swap_remove(0);
        assert_eq!(removed, 1i32.to_ne_bytes());
        assert_eq!(col.len(), 2);
        // last element (3) swapped into position 0
        assert_eq!(col.get(0), &3i32.to_ne_bytes());
        assert_eq!(col.get(1), &2i32.to_ne_bytes());
    }

    #[test]
    fn swap_remove_last_row_is_pure_truncation() {
        let mut col = RawColumn::new(4);
        col.push(&1i32.to_ne_bytes());
        col.push(&2i32.to_ne_bytes());

        let removed = col.swap_remove(1);
        assert_eq!(removed, 2i32.to_ne_bytes());
        assert_eq!(col.len(), 1);
        assert_eq!(col.get(0), &1i32.to_ne_bytes());
    }

    #[test]
    fn growth_is_integer_and_deterministic() {
        let mut col = RawColumn::new(4);
        col.reserve(1);
        assert_eq!(col.capacity(), 1);
        col.reserve(2);
        assert!(col.capacity() >= 2);
    }
}
