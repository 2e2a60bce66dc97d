//! Sparse set of NFA state ids with O(1) clear.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! Used as the visited set while computing epsilon closures, where the same
//! set is cleared and refilled once per closure.

use super::arena::StateId;

/// A set of [`StateId`]s below a fixed capacity.
///
/// An id is in the set iff `sparse[id] < len && dense[sparse[id]] == id`.
#[derive(Clone, Debug)]
pub struct StateSet {
    len: usize,
    dense: Vec<StateId>,
    sparse: Vec<usize>,
}

impl StateSet {
    /// Ids must be in range `[0, capacity)`.
    pub fn new(capacity: usize) -> Self {
        StateSet {
            len: 0,
            dense: Vec::with_capacity(capacity),
            sparse: vec![0; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if `id` was not already present.
    #[inline]
    pub fn insert(&mut self, id: StateId) -> bool {
        if self.contains(id) {
            return false;
        }
        if self.len < self.dense.len() {
            self.dense[self.len] = id;
        } else {
            self.dense.push(id);
        }
        self.sparse[id.index()] = self.len;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        let idx = self.sparse[id.index()];
        idx < self.len && self.dense[idx] == id
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Elements in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.dense[..self.len].iter().copied()
    }

    /// The members in ascending order.
    pub fn to_sorted(&self) -> Box<[StateId]> {
        let mut ids: Vec<StateId> = self.iter().collect();
        ids.sort_unstable();
        ids.into_boxed_slice()
    }
}
