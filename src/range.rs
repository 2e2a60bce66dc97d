//! Code-point ranges and zero-width boundary markers.
//!
//! A [`Range`] is either a half-open interval `[from, to)` over the code-point
//! domain `[0, MAX_CODE_POINT)`, or a [`Boundary`] that consumes no input and
//! is checked against the text surrounding the current position.

use bitflags::bitflags;

/// Exclusive upper bound of the code-point domain.
pub const MAX_CODE_POINT: u32 = 0x11_0000;

/// Zero-width assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Boundary {
    /// `^`
    BeginOfLine,
    /// `$`
    EndOfLine,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// `\A`
    BeginOfInput,
    /// `\G`
    PreviousMatchEnd,
    /// `\Z`
    EndOfInputOrLine,
    /// `\z`
    EndOfInput,
}

impl Boundary {
    pub const ALL: [Boundary; 8] = [
        Boundary::BeginOfLine,
        Boundary::EndOfLine,
        Boundary::WordBoundary,
        Boundary::NonWordBoundary,
        Boundary::BeginOfInput,
        Boundary::PreviousMatchEnd,
        Boundary::EndOfInputOrLine,
        Boundary::EndOfInput,
    ];

    /// The single-member look set for this boundary.
    pub fn look(self) -> LookSet {
        match self {
            Boundary::BeginOfLine => LookSet::BEGIN_OF_LINE,
            Boundary::EndOfLine => LookSet::END_OF_LINE,
            Boundary::WordBoundary => LookSet::WORD_BOUNDARY,
            Boundary::NonWordBoundary => LookSet::NON_WORD_BOUNDARY,
            Boundary::BeginOfInput => LookSet::BEGIN_OF_INPUT,
            Boundary::PreviousMatchEnd => LookSet::PREVIOUS_MATCH_END,
            Boundary::EndOfInputOrLine => LookSet::END_OF_INPUT_OR_LINE,
            Boundary::EndOfInput => LookSet::END_OF_INPUT,
        }
    }

    /// Expression syntax for this boundary.
    pub fn symbol(self) -> &'static str {
        match self {
            Boundary::BeginOfLine => "^",
            Boundary::EndOfLine => "$",
            Boundary::WordBoundary => "\\b",
            Boundary::NonWordBoundary => "\\B",
            Boundary::BeginOfInput => "\\A",
            Boundary::PreviousMatchEnd => "\\G",
            Boundary::EndOfInputOrLine => "\\Z",
            Boundary::EndOfInput => "\\z",
        }
    }
}

bitflags! {
    /// A set of boundaries, used both for the boundaries a transition needs
    /// and for the boundaries that hold at a text position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct LookSet: u8 {
        const BEGIN_OF_LINE = 1 << 0;
        const END_OF_LINE = 1 << 1;
        const WORD_BOUNDARY = 1 << 2;
        const NON_WORD_BOUNDARY = 1 << 3;
        const BEGIN_OF_INPUT = 1 << 4;
        const PREVIOUS_MATCH_END = 1 << 5;
        const END_OF_INPUT_OR_LINE = 1 << 6;
        const END_OF_INPUT = 1 << 7;
    }
}

impl Default for LookSet {
    fn default() -> Self {
        LookSet::empty()
    }
}

impl LookSet {
    /// Iterate over the boundaries in this set.
    pub fn boundaries(self) -> impl Iterator<Item = Boundary> {
        Boundary::ALL
            .into_iter()
            .filter(move |b| self.contains(b.look()))
    }

    /// Every non-empty subset of this set.
    pub(crate) fn subsets(self) -> Vec<LookSet> {
        let mask = self.bits();
        let mut out = Vec::new();
        let mut sub = mask;
        while sub != 0 {
            out.push(LookSet::from_bits_truncate(sub));
            sub = (sub - 1) & mask;
        }
        out
    }

    /// True if some text position has exactly `self` as the part of its
    /// holding boundaries that lies in `within`.
    pub(crate) fn is_realizable_within(self, within: LookSet) -> bool {
        let word = LookSet::WORD_BOUNDARY | LookSet::NON_WORD_BOUNDARY;
        if within.contains(word) && (self & word).bits().count_ones() != 1 {
            return false;
        }
        const IMPLIED: [(LookSet, LookSet); 4] = [
            (LookSet::END_OF_INPUT, LookSet::END_OF_INPUT_OR_LINE),
            (LookSet::END_OF_INPUT, LookSet::END_OF_LINE),
            (LookSet::END_OF_INPUT_OR_LINE, LookSet::END_OF_LINE),
            (LookSet::BEGIN_OF_INPUT, LookSet::BEGIN_OF_LINE),
        ];
        IMPLIED
            .iter()
            .all(|&(a, b)| !self.contains(a) || !within.contains(b) || self.contains(b))
    }
}

/// The text surrounding a position, as much as boundary checks need.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookContext {
    /// The character before the position.
    pub prev: Option<char>,
    /// Up to three characters starting at the position; `None` past the end.
    pub ahead: [Option<char>; 3],
    /// The position is the start of the input.
    pub at_input_start: bool,
    /// The position is where the current search started.
    pub at_search_start: bool,
}

#[inline]
fn is_line_terminator(c: char) -> bool {
    c == '\n' || c == '\r'
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl LookContext {
    /// The boundaries that hold here.
    pub fn looks(&self) -> LookSet {
        let mut looks = LookSet::empty();
        let at_end = self.ahead[0].is_none();

        if self.at_input_start || self.prev.is_some_and(is_line_terminator) {
            looks |= LookSet::BEGIN_OF_LINE;
        }
        if at_end || self.ahead[0].is_some_and(is_line_terminator) {
            looks |= LookSet::END_OF_LINE;
        }
        let word_before = self.prev.is_some_and(is_word_char);
        let word_after = self.ahead[0].is_some_and(is_word_char);
        if word_before != word_after {
            looks |= LookSet::WORD_BOUNDARY;
        } else {
            looks |= LookSet::NON_WORD_BOUNDARY;
        }
        if self.at_input_start {
            looks |= LookSet::BEGIN_OF_INPUT;
        }
        if self.at_search_start {
            looks |= LookSet::PREVIOUS_MATCH_END;
        }
        let final_terminator = match self.ahead {
            [None, _, _] => true,
            [Some('\n'), None, _] | [Some('\r'), None, _] => true,
            [Some('\r'), Some('\n'), None] => true,
            _ => false,
        };
        if final_terminator {
            looks |= LookSet::END_OF_INPUT_OR_LINE;
        }
        if at_end {
            looks |= LookSet::END_OF_INPUT;
        }
        looks
    }
}

/// A code-point interval or a boundary marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Range {
    /// Half-open `[from, to)`.
    Interval { from: u32, to: u32 },
    Boundary(Boundary),
}

impl Range {
    /// Interval `[from, to)`. Requires `from <= to`.
    pub fn new(from: u32, to: u32) -> Range {
        debug_assert!(from <= to, "range {from:#x}..{to:#x} is reversed");
        Range::Interval {
            from,
            to: to.min(MAX_CODE_POINT),
        }
    }

    /// The single character `c`.
    pub fn char(c: char) -> Range {
        let cp = c as u32;
        Range::Interval {
            from: cp,
            to: cp + 1,
        }
    }

    pub fn boundary(b: Boundary) -> Range {
        Range::Boundary(b)
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Range::Boundary(_))
    }

    /// Returns true if this interval contains code point `cp`.
    /// Boundaries contain nothing.
    #[inline]
    pub fn contains(&self, cp: u32) -> bool {
        match *self {
            Range::Interval { from, to } => from <= cp && cp < to,
            Range::Boundary(_) => false,
        }
    }

    /// Number of code points covered.
    pub fn len(&self) -> u32 {
        match *self {
            Range::Interval { from, to } => to - from,
            Range::Boundary(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
