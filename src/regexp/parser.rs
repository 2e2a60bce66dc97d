//! Regular expression parsing.
//!
//! This module parses expression text into a tree of quantified atoms for NFA
//! construction. Supports:
//! - `.` any code point, literals, and backslash escapes
//! - `[...]` classes with ranges, nested classes and `&&` intersection
//! - `[^...]` complemented classes
//! - `|` alternation and `(...)` grouping
//! - `?`, `+`, `*` and `{n}`, `{n,}`, `{n,m}` quantifiers
//! - `^`, `$` and the `\b \B \A \G \Z \z` boundaries
//! - `\p{..}` / `\P{..}` named classes
//!
//! Atom sets are resolved while parsing, so case folding and named-class
//! lookup happen once per atom, not once per quantifier copy.

use tracing::trace;

use crate::error::{Error, Result};
use crate::options::Options;
use crate::range::Boundary;
use crate::range_set::RangeSet;
use crate::unicode_categories::{escape_class, named_class};

/// Sentinel for an unbounded quantifier maximum.
pub const INFINITE: usize = usize::MAX;

/// Deepest allowed nesting of groups and classes.
pub const MAX_NESTING: usize = 256;

/// Repetition bounds; `max` may be [`INFINITE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub min: usize,
    pub max: usize,
}

impl Quantifier {
    pub const ONE: Quantifier = Quantifier { min: 1, max: 1 };

    /// Returns true if this quantifier matches exactly once (no quantifier).
    #[inline]
    pub fn is_one(&self) -> bool {
        *self == Self::ONE
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.max == INFINITE
    }
}

/// What a piece repeats: one edge set, or a parenthesized subexpression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Set(RangeSet),
    Group(RegexpRoot),
}

/// A quantified atom in the regexp tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantifiedAtom {
    pub atom: Atom,
    pub quantifier: Quantifier,
}

/// A branch in the regexp (sequence of atoms).
pub type RegexpBranch = Vec<QuantifiedAtom>;

/// The root of a parsed regexp (alternatives separated by |).
pub type RegexpRoot = Vec<RegexpBranch>;

/// Parse result.
#[derive(Debug, Clone)]
pub struct ParsedRegexp {
    pub root: RegexpRoot,
    /// No alternation, group or quantifier was seen.
    pub literal: bool,
}

/// Result of a backslash escape.
enum Escaped {
    Char(char),
    Set(RangeSet),
    Boundary(Boundary),
}

/// Parser state for regexp parsing.
struct RegexpParse<'a> {
    text: &'a str,
    index: usize,
    last_index: usize,
    depth: usize,
    literal: bool,
    case_insensitive: bool,
}

impl<'a> RegexpParse<'a> {
    fn new(text: &'a str, options: Options) -> Self {
        Self {
            text,
            index: 0,
            last_index: 0,
            depth: 0,
            literal: true,
            case_insensitive: options.case_insensitive(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.index..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.text[self.index..]
    }

    fn next_char(&mut self) -> Result<char> {
        let c = self
            .peek()
            .ok_or_else(|| Error::syntax("unexpected end of expression", self.index))?;
        self.last_index = self.index;
        self.index += c.len_utf8();
        Ok(c)
    }

    fn require(&mut self, wanted: char) -> Result<()> {
        let got = self.next_char()?;
        if got != wanted {
            return Err(self.error(format!("expected '{wanted}', got '{got}'")));
        }
        Ok(())
    }

    fn bypass_optional(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.last_index = self.index;
            self.index += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn bypass_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.last_index = self.index;
            self.index += s.len();
            true
        } else {
            false
        }
    }

    fn nest(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    fn unnest(&mut self) {
        self.depth -= 1;
    }

    /// Error at the start of the last consumed character.
    fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.last_index)
    }

    fn literal_set(&self, c: char) -> RangeSet {
        let mut set = RangeSet::new();
        if self.case_insensitive {
            set.add_char_case_insensitive(c);
        } else {
            set.add_char(c);
        }
        set
    }
}

/// Parse a regexp string into a tree structure.
pub fn parse_regexp(text: &str, options: Options) -> Result<ParsedRegexp> {
    if text.is_empty() {
        return Err(Error::syntax("empty expression", 0));
    }
    let mut parse = RegexpParse::new(text, options);
    let root = read_branches(&mut parse)?;
    if parse.peek().is_some() {
        // read_branches only stops early on a ')' it did not open
        return Err(Error::syntax("unbalanced ')'", parse.index));
    }
    trace!(expression = text, literal = parse.literal, "parsed expression");
    Ok(ParsedRegexp {
        root,
        literal: parse.literal,
    })
}

/// Read branches separated by |
fn read_branches(parse: &mut RegexpParse) -> Result<RegexpRoot> {
    let mut root = vec![read_branch(parse)?];
    while parse.bypass_optional('|') {
        parse.literal = false;
        root.push(read_branch(parse)?);
    }
    Ok(root)
}

fn read_branch(parse: &mut RegexpParse) -> Result<RegexpBranch> {
    let mut branch = Vec::new();
    while let Some(c) = parse.peek() {
        if c == '|' || c == ')' {
            break;
        }
        branch.push(read_piece(parse)?);
    }
    if branch.is_empty() {
        return Err(Error::syntax("empty branch", parse.index));
    }
    Ok(branch)
}

fn read_piece(parse: &mut RegexpParse) -> Result<QuantifiedAtom> {
    let atom = read_atom(parse)?;
    let quantifier = read_quantifier(parse)?;
    if !quantifier.is_one() || matches!(atom, Atom::Group(_)) {
        parse.literal = false;
    }
    Ok(QuantifiedAtom { atom, quantifier })
}

fn read_atom(parse: &mut RegexpParse) -> Result<Atom> {
    let c = parse.next_char()?;
    let set = match c {
        '(' => {
            let open = parse.last_index;
            parse.nest()?;
            match parse.peek() {
                Some(')') => return Err(Error::syntax("empty group", open)),
                None => return Err(Error::syntax("unclosed '('", open)),
                _ => {}
            }
            let root = read_branches(parse)?;
            if !parse.bypass_optional(')') {
                return Err(Error::syntax("unclosed '('", open));
            }
            parse.unnest();
            return Ok(Atom::Group(root));
        }
        '[' => read_class(parse)?,
        ']' | '}' => return Err(parse.error(format!("unbalanced '{c}'"))),
        '*' | '+' | '?' | '{' => {
            return Err(parse.error(format!("dangling quantifier '{c}'")));
        }
        '.' => RangeSet::any(),
        '^' => RangeSet::from_boundary(Boundary::BeginOfLine),
        '$' => RangeSet::from_boundary(Boundary::EndOfLine),
        '\\' => match read_escape(parse)? {
            Escaped::Char(c) => parse.literal_set(c),
            Escaped::Set(set) => set,
            Escaped::Boundary(b) => RangeSet::from_boundary(b),
        },
        c => parse.literal_set(c),
    };
    Ok(Atom::Set(set))
}

fn read_quantifier(parse: &mut RegexpParse) -> Result<Quantifier> {
    let (min, max) = match parse.peek() {
        Some('*') => (0, INFINITE),
        Some('+') => (1, INFINITE),
        Some('?') => (0, 1),
        Some('{') => {
            parse.next_char()?;
            let open = parse.last_index;
            let min = read_number(parse)?;
            let max = if parse.bypass_optional(',') {
                if parse.peek() == Some('}') {
                    INFINITE
                } else {
                    read_number(parse)?
                }
            } else {
                min
            };
            parse.require('}')?;
            if max < min {
                return Err(Error::syntax(
                    format!("quantifier maximum {max} is less than minimum {min}"),
                    open,
                ));
            }
            return Ok(Quantifier { min, max });
        }
        _ => return Ok(Quantifier::ONE),
    };
    parse.next_char()?;
    Ok(Quantifier { min, max })
}

fn read_number(parse: &mut RegexpParse) -> Result<usize> {
    let start = parse.index;
    let digits = parse
        .rest()
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(parse.rest().len());
    if digits == 0 {
        return Err(Error::syntax("expected a number", start));
    }
    parse.index += digits;
    parse.text[start..parse.index]
        .parse()
        .map_err(|_| Error::syntax("quantifier too large", start))
}

/// Read an escape; the backslash has been consumed.
fn read_escape(parse: &mut RegexpParse) -> Result<Escaped> {
    let start = parse.last_index;
    let c = parse
        .next_char()
        .map_err(|_| Error::syntax("'\\' at end of expression", start))?;
    let escaped = match c {
        't' => Escaped::Char('\t'),
        'n' => Escaped::Char('\n'),
        'r' => Escaped::Char('\r'),
        'f' => Escaped::Char('\x0C'),
        'a' => Escaped::Char('\x07'),
        'e' => Escaped::Char('\x1B'),
        '0' => Escaped::Char(read_octal(parse, start)?),
        'x' => {
            let cp = if parse.bypass_optional('{') {
                let digits = parse
                    .rest()
                    .find(|c: char| !c.is_ascii_hexdigit())
                    .unwrap_or(parse.rest().len());
                if digits == 0 {
                    return Err(Error::syntax("expected hex digits", parse.index));
                }
                let cp = read_hex(parse, digits, start)?;
                parse.require('}')?;
                cp
            } else {
                read_hex(parse, 2, start)?
            };
            Escaped::Char(to_char(cp, start)?)
        }
        'u' => Escaped::Char(to_char(read_hex(parse, 4, start)?, start)?),
        'c' => {
            let x = parse.next_char()?;
            if !('A'..='_').contains(&x) {
                return Err(parse.error(format!("invalid control character '\\c{x}'")));
            }
            Escaped::Char(to_char(x as u32 - 'A' as u32 + 1, start)?)
        }
        'd' | 'D' | 's' | 'S' | 'w' | 'W' => match escape_class(c) {
            Some(set) => Escaped::Set(set),
            None => return Err(Error::syntax(format!("invalid escape '\\{c}'"), start)),
        },
        'p' | 'P' => {
            let name_start = parse.index;
            let name = if parse.bypass_optional('{') {
                let len = parse
                    .rest()
                    .find('}')
                    .ok_or_else(|| Error::syntax("unclosed '{' in class name", name_start))?;
                let name = &parse.rest()[..len];
                parse.index += len + 1;
                name
            } else {
                let n = parse.next_char()?;
                &parse.text[parse.last_index..parse.last_index + n.len_utf8()]
            };
            let set = named_class(name, parse.case_insensitive).ok_or_else(|| {
                Error::syntax(format!("unknown character class '{name}'"), name_start)
            })?;
            if c == 'P' {
                Escaped::Set(set.complement())
            } else {
                Escaped::Set(RangeSet::clone(&set))
            }
        }
        'b' => Escaped::Boundary(Boundary::WordBoundary),
        'B' => Escaped::Boundary(Boundary::NonWordBoundary),
        'A' => Escaped::Boundary(Boundary::BeginOfInput),
        'G' => Escaped::Boundary(Boundary::PreviousMatchEnd),
        'Z' => Escaped::Boundary(Boundary::EndOfInputOrLine),
        'z' => Escaped::Boundary(Boundary::EndOfInput),
        c if c.is_ascii_punctuation() => Escaped::Char(c),
        c => return Err(Error::syntax(format!("invalid escape '\\{c}'"), start)),
    };
    Ok(escaped)
}

/// `\0n`, `\0nn` or `\0mnn` with `m <= 3`.
fn read_octal(parse: &mut RegexpParse, start: usize) -> Result<char> {
    let mut value = 0u32;
    let mut count = 0;
    while count < 3 {
        match parse.peek() {
            Some(d @ '0'..='7') => {
                if count == 2 && value > 0o37 {
                    break;
                }
                value = value * 8 + (d as u32 - '0' as u32);
                parse.index += 1;
                count += 1;
            }
            _ => break,
        }
    }
    if count == 0 {
        return Err(Error::syntax("invalid octal escape", start));
    }
    to_char(value, start)
}

fn read_hex(parse: &mut RegexpParse, digits: usize, start: usize) -> Result<u32> {
    let rest = parse.rest();
    let hex = rest
        .get(..digits)
        .filter(|h| h.len() == digits && h.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| Error::syntax("invalid hex escape", start))?;
    let value = u32::from_str_radix(hex, 16)
        .map_err(|_| Error::syntax("hex escape out of range", start))?;
    parse.index += digits;
    Ok(value)
}

fn to_char(cp: u32, offset: usize) -> Result<char> {
    char::from_u32(cp)
        .ok_or_else(|| Error::syntax(format!("invalid code point {cp:#x}"), offset))
}

/// Read a class; the `[` has been consumed.
fn read_class(parse: &mut RegexpParse) -> Result<RangeSet> {
    let open = parse.last_index;
    parse.nest()?;
    let negate = parse.bypass_optional('^');
    let mut set = read_class_union(parse, open)?;
    while parse.bypass_str("&&") {
        let rhs = read_class_union(parse, open)?;
        set = RangeSet::intersect(&set, &rhs);
    }
    if !parse.bypass_optional(']') {
        return Err(Error::syntax("unclosed character class", open));
    }
    parse.unnest();
    Ok(if negate { set.complement() } else { set })
}

/// One or more class entries up to `]` or `&&`.
fn read_class_union(parse: &mut RegexpParse, open: usize) -> Result<RangeSet> {
    let mut set = RangeSet::new();
    let mut entries = 0;
    loop {
        let Some(c) = parse.peek() else {
            return Err(Error::syntax("unclosed character class", open));
        };
        if c == ']' || parse.rest().starts_with("&&") {
            if entries == 0 {
                return Err(Error::syntax("empty character class", parse.index));
            }
            return Ok(set);
        }
        parse.next_char()?;
        match c {
            '[' => set.add_set(&read_class(parse)?),
            '.' => set.add_set(&RangeSet::any()),
            '\\' => match read_escape(parse)? {
                Escaped::Char(lo) => add_class_char(parse, &mut set, lo)?,
                Escaped::Set(s) => set.add_set(&s),
                Escaped::Boundary(b) => {
                    return Err(parse.error(format!(
                        "boundary '{}' not allowed in a class",
                        b.symbol()
                    )));
                }
            },
            c => add_class_char(parse, &mut set, c)?,
        }
        entries += 1;
    }
}

/// Add `lo`, or the range `lo-hi` if a dash follows that does not end the entry list.
fn add_class_char(parse: &mut RegexpParse, set: &mut RangeSet, lo: char) -> Result<()> {
    let after_dash = parse.rest().strip_prefix('-');
    let is_range = after_dash
        .is_some_and(|r| !(r.is_empty() || r.starts_with(']') || r.starts_with("&&")));
    if !is_range {
        add_class_range(set, lo, lo, parse.case_insensitive);
        return Ok(());
    }
    parse.next_char()?;
    let dash = parse.last_index;
    let hi = match parse.next_char()? {
        '\\' => match read_escape(parse)? {
            Escaped::Char(hi) => hi,
            _ => return Err(Error::syntax("invalid range end", dash)),
        },
        '[' => return Err(Error::syntax("invalid range end", dash)),
        hi => hi,
    };
    if lo > hi {
        return Err(Error::syntax(format!("invalid range {lo}-{hi}"), dash));
    }
    add_class_range(set, lo, hi, parse.case_insensitive);
    Ok(())
}

fn add_class_range(set: &mut RangeSet, lo: char, hi: char, case_insensitive: bool) {
    match (lo == hi, case_insensitive) {
        (true, true) => set.add_char_case_insensitive(lo),
        (true, false) => set.add_char(lo),
        (false, true) => set.add_range_case_insensitive(lo as u32, hi as u32 + 1),
        (false, false) => set.add_range(lo as u32, hi as u32 + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ParsedRegexp> {
        parse_regexp(text, Options::empty())
    }

    fn single_set(text: &str, options: Options) -> RangeSet {
        let parsed = parse_regexp(text, options).unwrap();
        assert_eq!(parsed.root.len(), 1);
        assert_eq!(parsed.root[0].len(), 1);
        match &parsed.root[0][0].atom {
            Atom::Set(set) => set.clone(),
            Atom::Group(_) => panic!("expected a set"),
        }
    }

    #[test]
    fn test_literal_flag() {
        assert!(parse("abc").unwrap().literal);
        assert!(parse("[abc]").unwrap().literal);
        assert!(!parse("a|b").unwrap().literal);
        assert!(!parse("ab*").unwrap().literal);
        assert!(!parse("(ab)").unwrap().literal);
        assert!(parse("a{1}").unwrap().literal);
    }

    #[test]
    fn test_quantifiers() {
        let q = |text: &str| parse(text).unwrap().root[0][0].quantifier;
        assert_eq!(q("a*"), Quantifier { min: 0, max: INFINITE });
        assert_eq!(q("a+"), Quantifier { min: 1, max: INFINITE });
        assert_eq!(q("a?"), Quantifier { min: 0, max: 1 });
        assert_eq!(q("a{3}"), Quantifier { min: 3, max: 3 });
        assert_eq!(q("a{3,}"), Quantifier { min: 3, max: INFINITE });
        assert_eq!(q("a{2,4}"), Quantifier { min: 2, max: 4 });
        assert!(q("a").is_one());
    }

    #[test]
    fn test_syntax_errors() {
        for bad in [
            "", "a|", "|a", "()", "(a", "a)", "a{3,2}", "*a", "a]", "a}", "[]", "[a", "[z-a]",
            "\\", "\\q", "\\p{NoSuchClass}", "[\\b]", "\\u12", "\\uD800", "\\x{110000}", "\\0",
        ] {
            let err = parse(bad).unwrap_err();
            assert!(err.is_syntax(), "{bad:?} gave {err}");
        }
    }

    #[test]
    fn test_error_offsets() {
        assert_eq!(parse("ab)").unwrap_err().offset(), Some(2));
        assert_eq!(parse("a{5,2}").unwrap_err().offset(), Some(1));
        assert_eq!(parse("ab(").unwrap_err().offset(), Some(2));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}a{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        let err = parse(&deep).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"));
        let ok = format!("{}a{}", "(".repeat(10), ")".repeat(10));
        assert!(parse(&ok).is_ok());
    }

    #[test]
    fn test_escapes() {
        let set = single_set("\\x41", Options::empty());
        assert!(set.contains_char('A'));
        let set = single_set("\\x{1F600}", Options::empty());
        assert!(set.contains_char('\u{1F600}'));
        let set = single_set("\\u00e4", Options::empty());
        assert!(set.contains_char('ä'));
        assert!(single_set("\\0101", Options::empty()).contains_char('A'));
        assert!(single_set("\\cA", Options::empty()).contains_char('\u{1}'));
        assert!(single_set("\\c[", Options::empty()).contains_char('\u{1b}'));
        assert!(single_set("\\e", Options::empty()).contains_char('\u{1b}'));
        assert!(single_set("\\.", Options::empty()).contains_char('.'));
    }

    #[test]
    fn test_octal_three_digit_limit() {
        // \0477 is \047 followed by '7'
        let parsed = parse("\\0477").unwrap();
        assert_eq!(parsed.root[0].len(), 2);
        let parsed = parse("\\0377").unwrap();
        assert_eq!(parsed.root[0].len(), 1);
    }

    #[test]
    fn test_class_forms() {
        let set = single_set("[a-z&&[^bc]]", Options::empty());
        assert!(set.contains_char('a'));
        assert!(set.contains_char('d'));
        assert!(!set.contains_char('b'));
        assert!(!set.contains_char('c'));

        let set = single_set("[-a]", Options::empty());
        assert!(set.contains_char('-'));
        let set = single_set("[a-]", Options::empty());
        assert!(set.contains_char('-'));
        assert!(!set.contains_char('b'));

        let set = single_set("[^acf]", Options::empty());
        assert!(!set.contains_char('a'));
        assert!(set.contains_char('b'));

        let set = single_set("[.&&[^>]]", Options::empty());
        assert!(set.contains_char('x'));
        assert!(!set.contains_char('>'));
    }

    #[test]
    fn test_case_insensitive_literals_and_ranges() {
        let set = single_set("a", Options::CASE_INSENSITIVE);
        assert!(set.contains_char('A'));
        let set = single_set("[a-c]", Options::CASE_INSENSITIVE);
        assert!(set.contains_char('B'));
        assert!(!set.contains_char('D'));
    }

    #[test]
    fn test_boundaries() {
        let parsed = parse("^a$").unwrap();
        assert_eq!(parsed.root[0].len(), 3);
        match &parsed.root[0][0].atom {
            Atom::Set(set) => assert!(set.looks().contains(Boundary::BeginOfLine.look())),
            Atom::Group(_) => panic!("expected a set"),
        }
    }

    #[test]
    fn test_lenient_literals() {
        assert!(single_set("-", Options::empty()).contains_char('-'));
        assert!(single_set("&", Options::empty()).contains_char('&'));
        assert!(single_set(",", Options::empty()).contains_char(','));
    }
}
