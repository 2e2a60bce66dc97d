//! Normalized sets of code-point intervals and boundaries.

use std::fmt;

use crate::range::{Boundary, LookSet, Range, MAX_CODE_POINT};

/// A union of code-point intervals plus a set of boundary markers.
///
/// Intervals are kept sorted by `from`, and no two of them overlap or touch.
/// Every mutation restores that invariant.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RangeSet {
    intervals: Vec<(u32, u32)>,
    looks: LookSet,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding the single character `c`.
    pub fn from_char(c: char) -> Self {
        let mut set = Self::new();
        set.add_char(c);
        set
    }

    /// A set holding `[from, to)`.
    pub fn from_range(from: u32, to: u32) -> Self {
        let mut set = Self::new();
        set.add_range(from, to);
        set
    }

    /// The whole code-point domain.
    pub fn any() -> Self {
        Self::from_range(0, MAX_CODE_POINT)
    }

    pub fn from_boundary(b: Boundary) -> Self {
        let mut set = Self::new();
        set.add(Range::Boundary(b));
        set
    }

    pub fn add(&mut self, range: Range) {
        match range {
            Range::Interval { from, to } => self.insert_interval(from, to),
            Range::Boundary(b) => self.looks |= b.look(),
        }
    }

    pub fn add_char(&mut self, c: char) {
        let cp = c as u32;
        self.insert_interval(cp, cp + 1);
    }

    /// Add `[from, to)`.
    pub fn add_range(&mut self, from: u32, to: u32) {
        debug_assert!(from <= to, "range {from:#x}..{to:#x} is reversed");
        self.insert_interval(from, to.min(MAX_CODE_POINT));
    }

    pub fn add_set(&mut self, other: &RangeSet) {
        for &(from, to) in &other.intervals {
            self.insert_interval(from, to);
        }
        self.looks |= other.looks;
    }

    /// Add `c` together with its simple case counterpart.
    pub fn add_char_case_insensitive(&mut self, c: char) {
        self.add_char(c);
        if let Some(other) = case_counterpart(c) {
            self.add_char(other);
        }
    }

    /// Add every code point of `[from, to)` together with its case counterpart.
    pub fn add_range_case_insensitive(&mut self, from: u32, to: u32) {
        self.add_range(from, to);
        for cp in from..to.min(MAX_CODE_POINT) {
            if let Some(other) = char::from_u32(cp).and_then(case_counterpart) {
                self.add_char(other);
            }
        }
    }

    fn insert_interval(&mut self, from: u32, to: u32) {
        if from >= to {
            return;
        }
        // Intervals in start..end overlap or touch [from, to).
        let start = self.intervals.partition_point(|&(_, t)| t < from);
        let end = self.intervals.partition_point(|&(f, _)| f <= to);
        if start == end {
            self.intervals.insert(start, (from, to));
            return;
        }
        let lo = from.min(self.intervals[start].0);
        let hi = to.max(self.intervals[end - 1].1);
        self.intervals.splice(start..end, std::iter::once((lo, hi)));
    }

    /// Everything in the domain not in this set. Boundaries are kept as they are.
    pub fn complement(&self) -> RangeSet {
        let mut intervals = Vec::with_capacity(self.intervals.len() + 1);
        let mut point = 0;
        for &(from, to) in &self.intervals {
            if from > point {
                intervals.push((point, from));
            }
            point = to;
        }
        if point < MAX_CODE_POINT {
            intervals.push((point, MAX_CODE_POINT));
        }
        RangeSet {
            intervals,
            looks: self.looks,
        }
    }

    /// Code points present in both sets.
    pub fn intersect(a: &RangeSet, b: &RangeSet) -> RangeSet {
        let mut intervals = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.intervals.len() && j < b.intervals.len() {
            let (af, at) = a.intervals[i];
            let (bf, bt) = b.intervals[j];
            let from = af.max(bf);
            let to = at.min(bt);
            if from < to {
                intervals.push((from, to));
            }
            if at < bt {
                i += 1;
            } else {
                j += 1;
            }
        }
        RangeSet {
            intervals,
            looks: a.looks & b.looks,
        }
    }

    pub fn contains(&self, cp: u32) -> bool {
        let idx = self.intervals.partition_point(|&(_, t)| t <= cp);
        self.intervals
            .get(idx)
            .is_some_and(|&(from, _)| from <= cp)
    }

    #[inline]
    pub fn contains_char(&self, c: char) -> bool {
        self.contains(c as u32)
    }

    /// True if the set holds neither intervals nor boundaries.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty() && self.looks.is_empty()
    }

    pub fn has_intervals(&self) -> bool {
        !self.intervals.is_empty()
    }

    /// The boundaries in this set.
    #[inline]
    pub fn looks(&self) -> LookSet {
        self.looks
    }

    /// The normalized intervals as `(from, to)` pairs.
    pub fn intervals(&self) -> &[(u32, u32)] {
        &self.intervals
    }

    /// Number of code points covered.
    pub fn code_point_count(&self) -> u64 {
        self.intervals
            .iter()
            .map(|&(from, to)| (to - from) as u64)
            .sum()
    }

    /// Every member as a [`Range`]: intervals first, then boundaries.
    pub fn iter(&self) -> impl Iterator<Item = Range> + '_ {
        self.intervals
            .iter()
            .map(|&(from, to)| Range::Interval { from, to })
            .chain(self.looks.boundaries().map(Range::Boundary))
    }

    /// The set as class syntax, e.g. `[a-cx\b]`.
    pub fn to_class_string(&self) -> String {
        use std::fmt::Write;
        let mut out = String::from("[");
        for &(from, to) in &self.intervals {
            push_code_point(&mut out, from);
            if to - from > 1 {
                out.push('-');
                push_code_point(&mut out, to - 1);
            }
        }
        for b in self.looks.boundaries() {
            let _ = write!(out, "{}", b.symbol());
        }
        out.push(']');
        out
    }
}

fn push_code_point(out: &mut String, cp: u32) {
    match char::from_u32(cp) {
        Some(c) if c.is_ascii_graphic() && !"[]\\-^&".contains(c) => out.push(c),
        _ => out.push_str(&format!("\\x{{{cp:x}}}")),
    }
}

impl fmt::Debug for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_class_string())
    }
}

impl FromIterator<Range> for RangeSet {
    fn from_iter<I: IntoIterator<Item = Range>>(iter: I) -> Self {
        let mut set = RangeSet::new();
        for range in iter {
            set.add(range);
        }
        set
    }
}

impl Extend<Range> for RangeSet {
    fn extend<I: IntoIterator<Item = Range>>(&mut self, iter: I) {
        for range in iter {
            self.add(range);
        }
    }
}

/// The single-character case mapping of `c`, when it has one.
pub(crate) fn case_counterpart(c: char) -> Option<char> {
    let mapped = if c.is_lowercase() {
        single(c.to_uppercase())
    } else if c.is_uppercase() {
        single(c.to_lowercase())
    } else {
        None
    };
    mapped.filter(|&m| m != c)
}

fn single(mut iter: impl Iterator<Item = char>) -> Option<char> {
    let first = iter.next()?;
    match iter.next() {
        None => Some(first),
        Some(_) => None,
    }
}
