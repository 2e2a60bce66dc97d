//! Compiled single-pattern regular expressions.
//!
//! A [`Regex`] wraps the DFA of one expression and drives it over `&str` or an
//! [`InputReader`]. All operations use leftmost-longest semantics: scanning
//! starts at each position in turn and takes the longest accepted run there.
//! Empty matches are ignored by every searching operation.

use std::fmt;
use std::io::{self, Read, Write};
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use crate::automaton::{Dfa, Scope};
use crate::error::{Error, Result};
use crate::input_reader::{InputReader, DEFAULT_BUFFER_SIZE};
use crate::options::Options;
use crate::regexp::create_nfa;

/// Characters [`escape`] prefixes with a backslash.
const METACHARACTERS: &str = "[]()\\-^*+?|.{}&$,";

/// A compiled expression. Cheap to clone; clones share the automaton.
#[derive(Clone)]
pub struct Regex {
    inner: Arc<RegexInner>,
}

struct RegexInner {
    expression: String,
    options: Options,
    dfa: Dfa<()>,
}

/// A non-empty match in a haystack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn as_str(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Fluent construction with compile options.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegexBuilder {
    options: Options,
}

impl RegexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.options.set(Options::CASE_INSENSITIVE, yes);
        self
    }

    pub fn fixed_ender(mut self, yes: bool) -> Self {
        self.options.set(Options::FIXED_ENDER, yes);
        self
    }

    pub fn accept_immediately(mut self, yes: bool) -> Self {
        self.options.set(Options::ACCEPT_IMMEDIATELY, yes);
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn build(&self, expression: &str) -> Result<Regex> {
        Regex::compile_with(expression, self.options)
    }
}

impl Regex {
    pub fn compile(expression: &str) -> Result<Regex> {
        Self::compile_with(expression, Options::empty())
    }

    pub fn compile_with(expression: &str, options: Options) -> Result<Regex> {
        let mut scope = Scope::new();
        let nfa = create_nfa(&mut scope, expression, (), options)?;
        let dfa = Dfa::construct(&scope, nfa.first())?;
        Ok(Regex {
            inner: Arc::new(RegexInner {
                expression: expression.to_owned(),
                options,
                dfa,
            }),
        })
    }

    pub fn builder() -> RegexBuilder {
        RegexBuilder::new()
    }

    pub fn expression(&self) -> &str {
        &self.inner.expression
    }

    pub fn options(&self) -> Options {
        self.inner.options
    }

    /// Length of the shortest accepted input, in characters.
    pub fn min_length(&self) -> usize {
        self.inner.dfa.min_length()
    }

    /// Length of the longest accepted input, or [`INFINITE`](crate::INFINITE).
    pub fn max_length(&self) -> usize {
        self.inner.dfa.max_length()
    }

    /// True if the whole of `text` is accepted.
    pub fn is_match(&self, text: &str) -> bool {
        self.inner
            .dfa
            .longest_at(text, 0, 0)
            .is_some_and(|(end, _)| end == text.len())
    }

    /// The longest accepted prefix of `text`.
    #[doc(alias = "match")]
    pub fn looking_at<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.inner
            .dfa
            .longest_at(text, 0, 0)
            .map(|(end, _)| &text[..end])
    }

    /// Leftmost non-empty match starting at or after byte offset `from`.
    ///
    /// `\G` holds at `from`. An offset inside a character is moved forward to
    /// the next character; one past the end of `text` finds nothing.
    pub fn search_at<'t>(&self, text: &'t str, from: usize) -> Option<Match<'t>> {
        if from > text.len() {
            return None;
        }
        let from = (from..=text.len()).find(|&i| text.is_char_boundary(i))?;
        let dfa = &self.inner.dfa;
        let start_state = dfa.start();
        let needs_looks = !dfa.looks(start_state).is_empty();
        let mut start = from;
        loop {
            let c = text[start..].chars().next();
            let viable = needs_looks || c.is_some_and(|c| dfa.next(start_state, c).is_some());
            if viable {
                if let Some((end, _)) = dfa.longest_at(text, start, from) {
                    if end > start {
                        return Some(Match { text, start, end });
                    }
                }
            }
            start += c?.len_utf8();
        }
    }

    pub fn search<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.search_at(text, 0)
    }

    /// The leftmost match, or a syntax error when there is none.
    pub fn find<'t>(&self, text: &'t str) -> Result<&'t str> {
        self.search(text)
            .map(|m| m.as_str())
            .ok_or_else(|| self.no_match(text.len()))
    }

    /// Successive non-overlapping matches.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches {
            regex: self,
            text,
            pos: 0,
        }
    }

    /// Replace every match with `replacement`, taken literally.
    pub fn replace(&self, text: &str, replacement: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            out.push_str(replacement);
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }

    /// Split around matches.
    ///
    /// `limit > 0` yields at most `limit` fields, the last holding the rest of
    /// the input. `limit == 0` drops trailing empty fields. `limit < 0` keeps
    /// everything. Input without any match yields the input itself.
    pub fn split<'t>(&self, text: &'t str, limit: i32) -> Vec<&'t str> {
        let mut fields = Vec::new();
        let mut last = 0;
        let mut matched = false;
        for m in self.find_iter(text) {
            if limit > 0 && fields.len() + 1 >= limit as usize {
                break;
            }
            matched = true;
            fields.push(&text[last..m.start()]);
            last = m.end();
        }
        if !matched {
            return vec![text];
        }
        fields.push(&text[last..]);
        if limit == 0 {
            while fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }
        }
        fields
    }

    /// Leftmost match on a stream; consumes input through the match.
    ///
    /// Fails with a syntax error when the stream holds no match.
    pub fn find_in<R: Read>(&self, reader: &mut InputReader<R>) -> Result<String> {
        let position = reader.position();
        self.search_in(reader)?
            .ok_or_else(|| self.no_match(position))
    }

    /// Leftmost match on a stream, or `None` at end of input.
    ///
    /// Characters before the match are consumed and dropped, and so is the
    /// match itself, so repeated calls walk the stream match by match. `\G`
    /// holds at the reader's position on entry. Empty matches are skipped.
    ///
    /// # Errors
    ///
    /// Read failures and invalid UTF-8 from the source, as [`Error::Io`].
    pub fn search_in<R: Read>(&self, reader: &mut InputReader<R>) -> Result<Option<String>> {
        self.scan_in(reader, |_| Ok(()))
    }

    /// Copy `reader` to `writer`, replacing every match with `replacement`.
    pub fn replace_in<R: Read, W: Write>(
        &self,
        reader: &mut InputReader<R>,
        writer: &mut W,
        replacement: &str,
    ) -> Result<()> {
        let mut utf8 = [0u8; 4];
        loop {
            let found = self.scan_in(reader, |c| {
                writer.write_all(c.encode_utf8(&mut utf8).as_bytes())
            })?;
            match found {
                Some(_) => writer.write_all(replacement.as_bytes())?,
                None => return Ok(()),
            }
        }
    }

    /// [`replace_in`](Self::replace_in) over a raw byte source.
    ///
    /// `source` is wrapped in an [`InputReader`] refilling `buffer_size`
    /// bytes at a time. Lookahead is not bounded by that size. The source is
    /// read to its end.
    pub fn replace_reader<R: Read, W: Write>(
        &self,
        source: R,
        buffer_size: usize,
        writer: &mut W,
        replacement: &str,
    ) -> Result<()> {
        let mut reader = InputReader::with_capacity(source, buffer_size);
        self.replace_in(&mut reader, writer, replacement)
    }

    /// [`split`](Self::split) over a stream.
    ///
    /// `limit` works as for `split`. The reader is drained: when `limit` cuts
    /// the splitting short, the remaining input becomes the last field.
    pub fn split_in<R: Read>(&self, reader: &mut InputReader<R>, limit: i32) -> Result<Vec<String>> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut matched = false;
        while limit <= 0 || fields.len() + 1 < limit as usize {
            let found = self.scan_in(reader, |c| {
                field.push(c);
                Ok(())
            })?;
            if found.is_none() {
                break;
            }
            matched = true;
            fields.push(std::mem::take(&mut field));
        }
        while let Some(c) = reader.read()? {
            field.push(c);
        }
        reader.clear();
        if !matched {
            return Ok(vec![field]);
        }
        fields.push(field);
        if limit == 0 {
            while fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }
        }
        Ok(fields)
    }

    /// Advance to the leftmost non-empty match, handing skipped characters to
    /// `skip`, and consume it. Returns `None` once input is exhausted.
    ///
    /// The match is tried at each reader position in turn, and `\G` holds
    /// only at the position the scan started from. Consumed input is dropped
    /// from the reader's buffer as the scan moves on.
    fn scan_in<R: Read, F>(&self, reader: &mut InputReader<R>, mut skip: F) -> Result<Option<String>>
    where
        F: FnMut(char) -> io::Result<()>,
    {
        let dfa = &self.inner.dfa;
        let search_start = reader.position();
        let mut skipped = 0;
        loop {
            if let Some((len, _)) = dfa.longest_in(reader, search_start)? {
                if len > 0 {
                    reader.clear();
                    let text = reader.take(len)?;
                    reader.clear();
                    return Ok(Some(text));
                }
            }
            match reader.read()? {
                Some(c) => skip(c)?,
                None => {
                    reader.clear();
                    return Ok(None);
                }
            }
            skipped += 1;
            if skipped % DEFAULT_BUFFER_SIZE == 0 {
                reader.clear();
            }
        }
    }

    fn no_match(&self, offset: usize) -> Error {
        Error::syntax(format!("no match for '{}'", self.expression()), offset)
    }
}

/// Iterator over successive non-overlapping matches, see [`Regex::find_iter`].
#[derive(Debug)]
pub struct Matches<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for Matches<'_, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        let m = self.regex.search_at(self.text, self.pos)?;
        self.pos = m.end();
        Some(m)
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Regex")
            .field("expression", &self.inner.expression)
            .field("options", &self.inner.options)
            .field("states", &self.inner.dfa.state_count())
            .finish()
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.expression)
    }
}

impl FromStr for Regex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Regex> {
        Regex::compile(s)
    }
}

/// Backslash-escape every metacharacter in `text`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if METACHARACTERS.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
