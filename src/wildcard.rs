//! Wildcard pattern matching
//!
//! `?` matches exactly one character, `*` any run of characters, and `\`
//! makes the next character literal. Patterns are rewritten into regular
//! expressions and run on a [`RegexMatcher`].

use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::matcher::{Matcher, RegexMatcher, RegexMatcherBuilder, Status};
use crate::options::Options;
use crate::regex::escape;

#[derive(Debug, PartialEq)]
enum WildcardSegment {
    Literal(String),
    Any,
    Star,
}

/// Parse wildcard pattern handling `\` escapes
fn parse_wildcard_pattern(pattern: &str) -> Vec<WildcardSegment> {
    let mut segments = Vec::new();
    let mut current_literal = String::new();
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        let wildcard = match c {
            '\\' => {
                // Escape: next char is literal; a trailing backslash is itself
                current_literal.push(chars.next().unwrap_or('\\'));
                continue;
            }
            '?' => WildcardSegment::Any,
            '*' => WildcardSegment::Star,
            _ => {
                current_literal.push(c);
                continue;
            }
        };
        if !current_literal.is_empty() {
            segments.push(WildcardSegment::Literal(std::mem::take(
                &mut current_literal,
            )));
        }
        segments.push(wildcard);
    }

    if !current_literal.is_empty() {
        segments.push(WildcardSegment::Literal(current_literal));
    }

    segments
}

/// Rewrite a wildcard pattern as a regular expression.
pub fn wildcard_to_regex(pattern: &str) -> Result<String> {
    let segments = parse_wildcard_pattern(pattern);
    if segments.is_empty() {
        return Err(Error::syntax("empty wildcard pattern", 0));
    }
    let mut expression = String::with_capacity(pattern.len() * 2);
    for segment in &segments {
        match segment {
            WildcardSegment::Literal(text) => expression.push_str(&escape(text)),
            WildcardSegment::Any => expression.push('.'),
            WildcardSegment::Star => expression.push_str(".*"),
        }
    }
    Ok(expression)
}

/// Incremental matcher over a set of wildcard patterns.
#[derive(Clone, Debug)]
pub struct WildcardMatcher<T> {
    inner: RegexMatcher<T>,
}

/// Collects `(pattern, token)` pairs for a [`WildcardMatcher`].
#[derive(Debug)]
pub struct WildcardMatcherBuilder<T> {
    inner: RegexMatcherBuilder<T>,
}

impl<T: Clone + Eq + Debug> WildcardMatcher<T> {
    pub fn builder() -> WildcardMatcherBuilder<T> {
        WildcardMatcherBuilder {
            inner: RegexMatcherBuilder::new(),
        }
    }
}

impl<T: Clone + Eq + Debug> WildcardMatcherBuilder<T> {
    pub fn add(&mut self, pattern: &str, token: T) -> Result<&mut Self> {
        self.add_with(pattern, token, Options::empty())
    }

    pub fn add_with(&mut self, pattern: &str, token: T, options: Options) -> Result<&mut Self> {
        let expression = wildcard_to_regex(pattern)?;
        self.inner.add(&expression, token, options)?;
        Ok(self)
    }

    pub fn build(self) -> Result<WildcardMatcher<T>> {
        Ok(WildcardMatcher {
            inner: self.inner.build()?,
        })
    }
}

impl<T> Matcher<T> for WildcardMatcher<T> {
    fn match_char(&mut self, c: char) -> Status {
        self.inner.match_char(c)
    }

    fn matched(&self) -> Option<&T> {
        self.inner.matched()
    }

    fn clear(&mut self) {
        self.inner.clear()
    }
}
