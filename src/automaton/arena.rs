//! Arena allocation for NFA states.
//!
//! A [`Scope`] owns every state of one compilation unit. States refer to each
//! other through [`StateId`] indexes, so the loops created by `*` and `+` are
//! plain back-edges instead of shared ownership:
//!
//! ```text
//!   entry ──ε──> first ──[a-z]──> last ──ε──> exit
//!     │            ▲                │           ▲
//!     │            └──────ε─────────┘           │
//!     └─────────────────────ε───────────────────┘
//! ```
//!
//! Dropping the scope frees the whole graph at once.

use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

use crate::range::LookSet;
use crate::range_set::RangeSet;

/// A state identifier, an index into a [`Scope`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct StateId(u32);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An outgoing NFA edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Taken without consuming input.
    Epsilon(StateId),
    /// Consumes one character in the set's intervals. The set's boundaries
    /// act as epsilon edges that are taken only while one of them holds.
    Set(RangeSet, StateId),
}

impl Transition {
    #[inline]
    pub fn target(&self) -> StateId {
        match *self {
            Transition::Epsilon(to) | Transition::Set(_, to) => to,
        }
    }

    /// True if the edge can be followed without input when `holding` holds.
    #[inline]
    pub fn is_free(&self, holding: LookSet) -> bool {
        match self {
            Transition::Epsilon(_) => true,
            Transition::Set(set, _) => set.looks().intersects(holding),
        }
    }
}

/// A node of the NFA graph.
#[derive(Clone, Debug)]
pub struct NfaState<T> {
    pub transitions: SmallVec<[Transition; 2]>,
    /// Set on terminal states: the identity reported when this state accepts.
    pub token: Option<T>,
    pub priority: i32,
    /// Accepting here ends the scan.
    pub accept_immediately: bool,
    /// Trailing characters of an accepted run that belong to a fixed ender
    /// and are left out of the match.
    pub ender_len: usize,
}

impl<T> Default for NfaState<T> {
    fn default() -> Self {
        Self {
            transitions: SmallVec::new(),
            token: None,
            priority: 0,
            accept_immediately: false,
            ender_len: 0,
        }
    }
}

impl<T> NfaState<T> {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.token.is_some()
    }

    pub fn add_epsilon(&mut self, to: StateId) {
        self.transitions.push(Transition::Epsilon(to));
    }

    pub fn add_set(&mut self, set: RangeSet, to: StateId) {
        self.transitions.push(Transition::Set(set, to));
    }

    /// Raise (or lower) the disambiguation priority.
    pub fn change_priority(&mut self, delta: i32) {
        self.priority += delta;
    }
}

/// Arena holding the states of one compilation unit.
#[derive(Clone)]
pub struct Scope<T> {
    states: Vec<NfaState<T>>,
}

impl<T> std::fmt::Debug for Scope<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("states_count", &self.states.len())
            .finish()
    }
}

impl<T> Default for Scope<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scope<T> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a fresh state with no transitions.
    pub fn alloc(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(NfaState::default());
        id
    }

    #[inline]
    pub fn get(&self, id: StateId) -> &NfaState<T> {
        &self.states[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: StateId) -> &mut NfaState<T> {
        &mut self.states[id.index()]
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.get_mut(from).add_epsilon(to);
    }

    pub fn add_set(&mut self, from: StateId, set: RangeSet, to: StateId) {
        self.get_mut(from).add_set(set, to);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len() as u32).map(StateId)
    }
}

impl<T> Index<StateId> for Scope<T> {
    type Output = NfaState<T>;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        self.get(id)
    }
}

impl<T> IndexMut<StateId> for Scope<T> {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut Self::Output {
        self.get_mut(id)
    }
}
