//! NFA fragments and the combinators that wire them together.
//!
//! A fragment is an entry/exit pair of states inside a [`Scope`]. Every
//! constructor here keeps two properties:
//!
//! - the entry state has no incoming edges,
//! - the exit state has no outgoing edges.
//!
//! so that bypass and loop edges added by one combinator never leak into
//! another fragment's interior.

use super::arena::{Scope, StateId};
use super::sparse_set::StateSet;
use crate::range::LookSet;
use crate::range_set::RangeSet;

/// A sub-automaton: `first` is its entry, `last` its exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nfa {
    first: StateId,
    last: StateId,
}

impl Nfa {
    /// A fragment accepting only the empty string.
    pub fn empty<T>(scope: &mut Scope<T>) -> Nfa {
        let first = scope.alloc();
        let last = scope.alloc();
        scope.add_epsilon(first, last);
        Nfa { first, last }
    }

    /// A fragment crossing one edge labelled by `set`.
    pub fn from_set<T>(scope: &mut Scope<T>, set: RangeSet) -> Nfa {
        let first = scope.alloc();
        let last = scope.alloc();
        scope.add_set(first, set, last);
        Nfa { first, last }
    }

    /// A fragment matching `text` exactly.
    pub fn from_str<T>(scope: &mut Scope<T>, text: &str) -> Nfa {
        let mut chars = text.chars();
        let Some(c) = chars.next() else {
            return Nfa::empty(scope);
        };
        let mut nfa = Nfa::from_set(scope, RangeSet::from_char(c));
        for c in chars {
            let next = Nfa::from_set(scope, RangeSet::from_char(c));
            nfa = nfa.concat(scope, next);
        }
        nfa
    }

    #[inline]
    pub fn first(&self) -> StateId {
        self.first
    }

    #[inline]
    pub fn last(&self) -> StateId {
        self.last
    }

    /// Chain `other` after this fragment.
    pub fn concat<T>(self, scope: &mut Scope<T>, other: Nfa) -> Nfa {
        scope.add_epsilon(self.last, other.first);
        Nfa {
            first: self.first,
            last: other.last,
        }
    }

    /// Zero or more repetitions.
    ///
    /// The old exit loops back to the old entry; fresh entry and exit states
    /// carry the bypass.
    pub fn star<T>(self, scope: &mut Scope<T>) -> Nfa {
        let first = scope.alloc();
        let last = scope.alloc();
        scope.add_epsilon(self.last, self.first);
        scope.add_epsilon(first, self.first);
        scope.add_epsilon(self.last, last);
        scope.add_epsilon(first, last);
        Nfa { first, last }
    }

    /// Zero or one occurrence.
    pub fn opt<T>(self, scope: &mut Scope<T>) -> Nfa {
        scope.add_epsilon(self.first, self.last);
        self
    }

    /// Parallel branches from a shared entry state into a shared exit state.
    ///
    /// Each branch keeps its own exit, so tokens set on those exits survive
    /// as separate terminals.
    pub fn union<T>(scope: &mut Scope<T>, branches: impl IntoIterator<Item = Nfa>) -> Nfa {
        let first = scope.alloc();
        let last = scope.alloc();
        for branch in branches {
            scope.add_epsilon(first, branch.first);
            scope.add_epsilon(branch.last, last);
        }
        Nfa { first, last }
    }

    /// Stop the match in front of the first occurrence of the trailing
    /// `ender_len` characters.
    ///
    /// The scan halts as soon as the fragment first completes, so a greedy
    /// `.*` body never runs past an ender, and the ender itself is handed
    /// back: `<!--.*-->` on `<!-- a --> -->` matches `<!-- a `.
    pub fn modify_fixed_ender<T>(self, scope: &mut Scope<T>, ender_len: usize) -> Nfa {
        let last = &mut scope[self.last];
        last.accept_immediately = true;
        last.ender_len = ender_len;
        self
    }

    /// Number of states reachable from the entry.
    pub fn state_count<T>(&self, scope: &Scope<T>) -> usize {
        let mut seen = StateSet::new(scope.len());
        let mut stack = vec![self.first];
        seen.insert(self.first);
        while let Some(id) = stack.pop() {
            for t in &scope[id].transitions {
                if seen.insert(t.target()) {
                    stack.push(t.target());
                }
            }
        }
        seen.len()
    }
}

/// Epsilon closure of `seeds`, following boundary edges only while one of
/// their boundaries is in `holding`. Returns the members in ascending order.
pub(crate) fn closure<T>(
    scope: &Scope<T>,
    seen: &mut StateSet,
    stack: &mut Vec<StateId>,
    seeds: impl IntoIterator<Item = StateId>,
    holding: LookSet,
) -> Box<[StateId]> {
    seen.clear();
    stack.clear();
    for s in seeds {
        if seen.insert(s) {
            stack.push(s);
        }
    }
    while let Some(id) = stack.pop() {
        for t in &scope[id].transitions {
            if t.is_free(holding) && seen.insert(t.target()) {
                stack.push(t.target());
            }
        }
    }
    seen.to_sorted()
}
