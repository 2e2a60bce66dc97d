//! Incremental, character-at-a-time matching.
//!
//! A [`Matcher`] is fed one character at a time and reports after each one
//! whether the input so far is a complete match, could still become one, or
//! can no longer match.

use std::fmt::Debug;

use crate::automaton::{Dfa, DfaStateId};
use crate::error::Result;
use crate::lexer::LexerBuilder;
use crate::options::Options;
use crate::range::LookContext;

/// Outcome of feeding one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Not a match yet, but one is still possible.
    Ok,
    /// The input so far is accepted.
    Match,
    /// No continuation can match. Stays failed until `clear`.
    Fail,
}

impl Status {
    pub fn is_match(self) -> bool {
        self == Status::Match
    }

    pub fn is_fail(self) -> bool {
        self == Status::Fail
    }
}

/// Incremental matching protocol.
pub trait Matcher<T> {
    fn match_char(&mut self, c: char) -> Status;

    /// Token of the last [`Status::Match`], if the latest character produced one.
    fn matched(&self) -> Option<&T>;

    /// Start over from the beginning of input.
    fn clear(&mut self);

    /// Feed every character of `text` and return the last status.
    fn match_str(&mut self, text: &str) -> Status {
        let mut status = Status::Ok;
        for c in text.chars() {
            status = self.match_char(c);
            if status.is_fail() {
                break;
            }
        }
        status
    }
}

/// Incremental matcher over a union of regular expressions.
///
/// Boundaries are decided with one character of lookahead: before stepping
/// on `c` the current position sees `c` ahead, and acceptance is tested as
/// if the input ended after `c`.
#[derive(Clone, Debug)]
pub struct RegexMatcher<T> {
    dfa: Dfa<T>,
    state: Option<DfaStateId>,
    prev: Option<char>,
    matched: Option<DfaStateId>,
}

/// Collects `(expression, token, options)` triples for a [`RegexMatcher`].
#[derive(Debug)]
pub struct RegexMatcherBuilder<T> {
    lexer: LexerBuilder<T>,
}

impl<T: Clone + Eq + Debug> RegexMatcherBuilder<T> {
    pub fn new() -> Self {
        Self {
            lexer: LexerBuilder::new(),
        }
    }

    pub fn add(&mut self, expression: &str, token: T, options: Options) -> Result<&mut Self> {
        self.lexer.add_with(expression, token, options, 0)?;
        Ok(self)
    }

    pub fn build(self) -> Result<RegexMatcher<T>> {
        Ok(RegexMatcher::from_dfa(self.lexer.build_dfa()?))
    }
}

impl<T: Clone + Eq + Debug> Default for RegexMatcherBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Debug> RegexMatcher<T> {
    pub fn builder() -> RegexMatcherBuilder<T> {
        RegexMatcherBuilder::new()
    }
}

impl<T> RegexMatcher<T> {
    pub fn from_dfa(dfa: Dfa<T>) -> Self {
        let start = dfa.start();
        Self {
            dfa,
            state: Some(start),
            prev: None,
            matched: None,
        }
    }
}

impl<T> Matcher<T> for RegexMatcher<T> {
    fn match_char(&mut self, c: char) -> Status {
        let Some(state) = self.state else {
            return Status::Fail;
        };
        let at_start = self.prev.is_none();
        let here = LookContext {
            prev: self.prev,
            ahead: [Some(c), None, None],
            at_input_start: at_start,
            at_search_start: at_start,
        };
        let state = self.dfa.resolve(state, here.looks());
        self.prev = Some(c);
        self.matched = None;
        let Some(next) = self.dfa.next(state, c) else {
            self.state = None;
            return Status::Fail;
        };
        self.state = Some(next);
        let end = LookContext {
            prev: Some(c),
            ..LookContext::default()
        };
        let resolved = self.dfa.resolve(next, end.looks());
        if self.dfa.is_accepting(resolved) {
            self.matched = Some(resolved);
            Status::Match
        } else {
            Status::Ok
        }
    }

    fn matched(&self) -> Option<&T> {
        self.matched.and_then(|s| self.dfa.accepted(s))
    }

    fn clear(&mut self) {
        self.state = Some(self.dfa.start());
        self.prev = None;
        self.matched = None;
    }
}
