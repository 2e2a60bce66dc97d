//! Automaton layer: NFA arena, fragment combinators and subset construction.
//!
//! # Module Organization
//!
//! - `arena`: the [`Scope`] owning NFA states, addressed by [`StateId`]
//! - `nfa`: [`Nfa`] fragments and the epsilon closure
//! - `sparse_set`: the visited set used by closures
//! - `dfa`: [`Dfa`] construction, boundary resolution and scanning

mod arena;
mod dfa;
mod nfa;
mod sparse_set;

pub use arena::{NfaState, Scope, StateId, Transition};
pub use dfa::{Accept, Dfa, DfaStateId};
pub use nfa::Nfa;
pub use sparse_set::StateSet;

pub(crate) use dfa::str_context;
