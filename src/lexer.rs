//! Multi-pattern lexers.
//!
//! Every expression is compiled into one shared [`Scope`] and the fragments
//! are joined with a single union before subset construction, so the lexer
//! runs one DFA no matter how many patterns it holds. When several patterns
//! accept the same input, the higher priority wins; literal expressions get
//! a bonus of one on top of any explicit priority.

use std::fmt::Debug;
use std::io::Read;

use tracing::debug;

use crate::automaton::{Dfa, Nfa, Scope};
use crate::error::{Error, Result};
use crate::input_reader::InputReader;
use crate::options::Options;
use crate::regexp::create_nfa;

/// Collects `(expression, token)` pairs for a [`Lexer`].
#[derive(Debug)]
pub struct LexerBuilder<T> {
    scope: Scope<T>,
    fragments: Vec<Nfa>,
}

impl<T> Default for LexerBuilder<T> {
    fn default() -> Self {
        Self {
            scope: Scope::new(),
            fragments: Vec::new(),
        }
    }
}

impl<T: Clone + Eq + Debug> LexerBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, expression: &str, token: T) -> Result<&mut Self> {
        self.add_with(expression, token, Options::empty(), 0)
    }

    /// Add an expression with options and an explicit priority.
    ///
    /// Syntax errors are reported here, not at build time.
    pub fn add_with(
        &mut self,
        expression: &str,
        token: T,
        options: Options,
        priority: i32,
    ) -> Result<&mut Self> {
        let nfa = create_nfa(&mut self.scope, expression, token, options)?;
        self.scope[nfa.last()].change_priority(priority);
        self.fragments.push(nfa);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Union every added expression and run subset construction.
    pub fn build_dfa(mut self) -> Result<Dfa<T>> {
        let start = match self.fragments.as_slice() {
            [] => return Err(Error::syntax("no expressions added", 0)),
            [only] => *only,
            _ => Nfa::union(&mut self.scope, self.fragments.iter().copied()),
        };
        debug!(expressions = self.fragments.len(), "building lexer DFA");
        Dfa::construct(&self.scope, start.first())
    }

    pub fn build(self) -> Result<Lexer<T>> {
        Ok(Lexer {
            dfa: self.build_dfa()?,
        })
    }
}

/// A compiled set of token patterns.
#[derive(Clone, Debug)]
pub struct Lexer<T> {
    dfa: Dfa<T>,
}

impl<T> Lexer<T> {
    pub fn builder() -> LexerBuilder<T> {
        LexerBuilder::default()
    }

    pub fn dfa(&self) -> &Dfa<T> {
        &self.dfa
    }

    /// Token and byte length of the longest non-empty prefix of `text` any
    /// pattern accepts.
    pub fn longest_match(&self, text: &str) -> Option<(&T, usize)> {
        let (end, state) = self.dfa.longest_at(text, 0, 0)?;
        if end == 0 {
            return None;
        }
        self.dfa.accepted(state).map(|token| (token, end))
    }

    /// Split all of `text` into tokens.
    ///
    /// Fails with a syntax error at the first position no pattern accepts.
    pub fn tokenize<'t>(&self, text: &'t str) -> Result<Vec<(T, &'t str)>>
    where
        T: Clone,
    {
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let (end, state) = self
                .dfa
                .longest_at(text, pos, pos)
                .filter(|&(end, _)| end > pos)
                .ok_or_else(|| Error::syntax("no token matches", pos))?;
            if let Some(token) = self.dfa.accepted(state) {
                tokens.push((token.clone(), &text[pos..end]));
            }
            pos = end;
        }
        Ok(tokens)
    }

    /// Read one token from `reader` and drop the consumed input.
    ///
    /// The token is the longest non-empty run at the reader's cursor; its
    /// text is returned with it. Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// A syntax error at the reader position when no pattern matches there;
    /// nothing is consumed in that case. Read failures come back as
    /// [`Error::Io`].
    pub fn next_token<R: Read>(&self, reader: &mut InputReader<R>) -> Result<Option<(T, String)>>
    where
        T: Clone,
    {
        if reader.peek(0)?.is_none() {
            return Ok(None);
        }
        let position = reader.position();
        let found = self
            .dfa
            .longest_in(reader, position)?
            .filter(|&(len, _)| len > 0)
            .and_then(|(len, state)| self.dfa.accepted(state).map(|t| (len, t.clone())));
        let Some((len, token)) = found else {
            return Err(Error::syntax("no token matches", position));
        };
        let text = reader.take(len)?;
        reader.clear();
        Ok(Some((token, text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Tok {
        If,
        Ident,
        Number,
        Space,
    }

    fn lexer() -> Lexer<Tok> {
        let mut builder = Lexer::builder();
        builder
            .add("if", Tok::If)
            .unwrap()
            .add("[a-z][a-z0-9]*", Tok::Ident)
            .unwrap()
            .add("[0-9]+", Tok::Number)
            .unwrap()
            .add("[ \t]+", Tok::Space)
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_longest_match() {
        let lexer = lexer();
        assert_eq!(lexer.longest_match("if x"), Some((&Tok::If, 2)));
        assert_eq!(lexer.longest_match("iffy"), Some((&Tok::Ident, 4)));
        assert_eq!(lexer.longest_match("42a"), Some((&Tok::Number, 2)));
        assert_eq!(lexer.longest_match("?"), None);
    }

    #[test]
    fn test_tokenize() {
        let tokens = lexer().tokenize("if x1 42").unwrap();
        assert_eq!(
            tokens,
            vec![
                (Tok::If, "if"),
                (Tok::Space, " "),
                (Tok::Ident, "x1"),
                (Tok::Space, " "),
                (Tok::Number, "42"),
            ]
        );
        let err = lexer().tokenize("if ?").unwrap_err();
        assert_eq!(err.offset(), Some(3));
    }

    #[test]
    fn test_next_token_from_reader() {
        let lexer = lexer();
        let mut reader = InputReader::new("x 7".as_bytes());
        let mut seen = Vec::new();
        while let Some((token, text)) = lexer.next_token(&mut reader).unwrap() {
            seen.push((token, text));
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], (Tok::Number, "7".to_string()));
    }

    #[test]
    fn test_explicit_priority_breaks_tie() {
        let mut builder = LexerBuilder::new();
        builder.add("[a-z]+", "word").unwrap();
        builder
            .add_with("[a-c]+", "abc", Options::empty(), 1)
            .unwrap();
        let lexer = builder.build().unwrap();
        assert_eq!(lexer.longest_match("cab"), Some((&"abc", 3)));
        assert_eq!(lexer.longest_match("cat"), Some((&"word", 3)));
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let mut builder = LexerBuilder::new();
        builder.add("[a-z]+", 1).unwrap();
        builder.add("[a-c]+", 2).unwrap();
        assert!(builder.build().unwrap_err().is_ambiguity());
    }

    #[test]
    fn test_exclusive_boundaries_are_not_ambiguous() {
        let mut builder = LexerBuilder::new();
        builder.add(r"a\b", 1).unwrap();
        builder.add(r"a\B", 2).unwrap();
        let lexer = builder.build().unwrap();
        assert_eq!(lexer.longest_match("a "), Some((&1, 1)));
        assert_eq!(lexer.longest_match("ab"), Some((&2, 1)));
    }

    #[test]
    fn test_empty_builder() {
        let builder: LexerBuilder<u8> = LexerBuilder::new();
        assert!(builder.is_empty());
        assert!(builder.build().unwrap_err().is_syntax());
    }

    #[test]
    fn test_syntax_error_reported_on_add() {
        let mut builder = LexerBuilder::new();
        assert!(builder.add("a(", 1).is_err());
        assert_eq!(builder.len(), 0);
    }
}
