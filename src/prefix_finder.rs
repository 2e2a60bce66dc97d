//! Lookup of a token by an unambiguous prefix of its name.
//!
//! Names are compiled as literal patterns into one DFA. A prefix walks the
//! DFA from the start; the token is found when the prefix spells a whole
//! name, or when every name it can still grow into maps to the same token.

use std::fmt::Debug;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::automaton::{Dfa, DfaStateId};
use crate::error::Result;
use crate::lexer::LexerBuilder;
use crate::options::Options;
use crate::regex::escape;

/// Maps abbreviations of a fixed set of names to their tokens.
#[derive(Clone, Debug)]
pub struct PrefixFinder<T> {
    dfa: Dfa<T>,
}

/// Collects `(name, token)` pairs for a [`PrefixFinder`].
#[derive(Debug)]
pub struct PrefixFinderBuilder<T> {
    lexer: LexerBuilder<T>,
    options: Options,
}

impl<T: Clone + Eq + Debug> PrefixFinder<T> {
    pub fn builder(case_insensitive: bool) -> PrefixFinderBuilder<T> {
        let mut options = Options::empty();
        options.set(Options::CASE_INSENSITIVE, case_insensitive);
        PrefixFinderBuilder {
            lexer: LexerBuilder::new(),
            options,
        }
    }

    /// A finder over every `(name, token)` pair of `names`.
    pub fn from_names<N: AsRef<str>>(
        names: impl IntoIterator<Item = (N, T)>,
        case_insensitive: bool,
    ) -> Result<Self> {
        let mut builder = Self::builder(case_insensitive);
        for (name, token) in names {
            builder.add(name.as_ref(), token)?;
        }
        builder.build()
    }
}

impl<T: Clone + Eq + Debug> PrefixFinderBuilder<T> {
    /// Add `name`, taken literally.
    pub fn add(&mut self, name: &str, token: T) -> Result<&mut Self> {
        self.lexer.add_with(&escape(name), token, self.options, 0)?;
        Ok(self)
    }

    /// Fails with [`Error::Ambiguity`](crate::Error::Ambiguity) when one name
    /// is given two tokens.
    pub fn build(self) -> Result<PrefixFinder<T>> {
        debug!(names = self.lexer.len(), "building prefix finder");
        Ok(PrefixFinder {
            dfa: self.lexer.build_dfa()?,
        })
    }
}

impl<T: Eq> PrefixFinder<T> {
    /// The token whose name starts with `prefix`.
    ///
    /// A prefix equal to a whole name finds that name even when longer names
    /// share it. Otherwise `None` unless exactly one token is reachable.
    pub fn find(&self, prefix: &str) -> Option<&T> {
        let mut state = self.dfa.start();
        for c in prefix.chars() {
            state = self.dfa.next(state, c)?;
        }
        match self.dfa.accepted(state) {
            Some(token) => Some(token),
            None => self.unique_below(state),
        }
    }

    fn unique_below(&self, from: DfaStateId) -> Option<&T> {
        let mut found: Option<&T> = None;
        let mut seen = FxHashSet::default();
        let mut stack = vec![from];
        seen.insert(from);
        while let Some(id) = stack.pop() {
            if let Some(token) = self.dfa.accepted(id) {
                match found {
                    Some(f) if f != token => return None,
                    _ => found = Some(token),
                }
            }
            for next in self.dfa.successors(id) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        found
    }
}
