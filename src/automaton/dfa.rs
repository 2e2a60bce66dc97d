//! Subset construction and the resulting deterministic automaton.
//!
//! Each DFA state stands for the epsilon closure of a set of NFA states.
//! Character transitions are computed by splitting the outgoing intervals of
//! the set into disjoint classes, so one transition covers a whole range of
//! code points.
//!
//! Boundary edges cannot be decided while building: whether `^` or `\b`
//! holds depends on the text. A state whose closure waits on boundaries keeps
//! a small table mapping each subset of those boundaries to the state reached
//! when exactly that subset holds. At match time the engine computes the
//! boundaries holding at the current position and resolves the state once
//! before testing acceptance and stepping.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::io::{self, Read};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use super::arena::{Scope, StateId, Transition};
use super::nfa::closure;
use super::sparse_set::StateSet;
use crate::error::{Error, Result};
use crate::input_reader::InputReader;
use crate::range::{LookContext, LookSet};
use crate::regexp::INFINITE;

/// Index of a state in a [`Dfa`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct DfaStateId(u32);

impl DfaStateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The token a state accepts and the priority it won with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accept<T> {
    pub token: T,
    pub priority: i32,
    /// Characters at the end of the accepted run left out of the match.
    pub ender_len: usize,
}

#[derive(Clone, Debug)]
struct DfaState<T> {
    /// Sorted, disjoint `(from, to, target)` with `[from, to)` half-open.
    transitions: Vec<(u32, u32, DfaStateId)>,
    /// Boundaries some reachable edge waits on.
    looks: LookSet,
    /// Where to go when a given subset of `looks` holds. Subsets not listed
    /// leave the state unchanged. Targets are settled: they resolve no further.
    resolved: SmallVec<[(LookSet, DfaStateId); 2]>,
    accept: Option<Accept<T>>,
}

impl<T> Default for DfaState<T> {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            looks: LookSet::empty(),
            resolved: SmallVec::new(),
            accept: None,
        }
    }
}

/// A deterministic automaton with per-state accepted tokens.
#[derive(Clone, Debug)]
pub struct Dfa<T> {
    states: Vec<DfaState<T>>,
    start: DfaStateId,
    min_length: usize,
    max_length: usize,
}

impl<T: Clone + Eq + Debug> Dfa<T> {
    /// Run subset construction from `start`.
    ///
    /// Fails with [`Error::Ambiguity`] when a state holds terminals of two
    /// distinct tokens at the same top priority.
    pub fn construct(scope: &Scope<T>, start: StateId) -> Result<Dfa<T>> {
        let mut builder = Builder::new(scope);
        let start = builder.run(start)?;
        let mut dfa = Dfa {
            states: builder.states,
            start,
            min_length: 0,
            max_length: 0,
        };
        dfa.prune();
        let (min, max) = dfa.lengths();
        dfa.min_length = min;
        dfa.max_length = max;
        debug!(
            nfa_states = scope.len(),
            dfa_states = dfa.states.len(),
            min_length = min,
            max_length = if max == INFINITE { -1 } else { max as i64 },
            "constructed DFA"
        );
        Ok(dfa)
    }
}

impl<T> Dfa<T> {
    #[inline]
    pub fn start(&self) -> DfaStateId {
        self.start
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Successor on `c`, or `None` when no match can continue.
    #[inline]
    pub fn next(&self, id: DfaStateId, c: char) -> Option<DfaStateId> {
        let cp = c as u32;
        let transitions = &self.states[id.index()].transitions;
        let idx = transitions.partition_point(|&(_, to, _)| to <= cp);
        match transitions.get(idx) {
            Some(&(from, _, target)) if from <= cp => Some(target),
            _ => None,
        }
    }

    /// Boundaries this state waits on. Empty means no resolution is needed.
    #[inline]
    pub fn looks(&self, id: DfaStateId) -> LookSet {
        self.states[id.index()].looks
    }

    /// The state reached from `id` when `holding` holds at the current position.
    #[inline]
    pub fn resolve(&self, id: DfaStateId, holding: LookSet) -> DfaStateId {
        let state = &self.states[id.index()];
        let key = holding & state.looks;
        if key.is_empty() {
            return id;
        }
        state
            .resolved
            .iter()
            .find(|(k, _)| *k == key)
            .map_or(id, |&(_, to)| to)
    }

    #[inline]
    pub fn accept(&self, id: DfaStateId) -> Option<&Accept<T>> {
        self.states[id.index()].accept.as_ref()
    }

    #[inline]
    pub fn accepted(&self, id: DfaStateId) -> Option<&T> {
        self.accept(id).map(|a| &a.token)
    }

    #[inline]
    pub fn is_accepting(&self, id: DfaStateId) -> bool {
        self.states[id.index()].accept.is_some()
    }

    /// States reachable in one step, by a character or by resolution.
    pub fn successors(&self, id: DfaStateId) -> impl Iterator<Item = DfaStateId> + '_ {
        self.edges(id).map(|(to, _)| to)
    }

    /// True if nothing more can be matched from this state.
    pub fn is_dead_end(&self, id: DfaStateId) -> bool {
        let state = &self.states[id.index()];
        state.transitions.is_empty() && state.resolved.is_empty()
    }

    /// Length in characters of the shortest accepted input.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Length of the longest accepted input, or [`INFINITE`].
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn edges(&self, id: DfaStateId) -> impl Iterator<Item = (DfaStateId, usize)> + '_ {
        let state = &self.states[id.index()];
        state
            .resolved
            .iter()
            .map(|&(_, to)| (to, 0))
            .chain(state.transitions.iter().map(|&(_, _, to)| (to, 1)))
    }

    /// Drop edges into states from which no accepting state is reachable.
    fn prune(&mut self) {
        let n = self.states.len();
        let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            for (to, _) in self.edges(DfaStateId(i as u32)) {
                reverse[to.index()].push(i);
            }
        }
        let mut live = vec![false; n];
        let mut stack: Vec<usize> = (0..n).filter(|&i| self.states[i].accept.is_some()).collect();
        for &i in &stack {
            live[i] = true;
        }
        while let Some(i) = stack.pop() {
            for &from in &reverse[i] {
                if !live[from] {
                    live[from] = true;
                    stack.push(from);
                }
            }
        }
        for state in &mut self.states {
            state.transitions.retain(|&(_, _, to)| live[to.index()]);
            state.resolved.retain(|&mut (_, to)| live[to.index()]);
            if state.resolved.is_empty() {
                state.looks = LookSet::empty();
            }
        }
    }

    /// Shortest and longest accepted lengths over the pruned graph.
    fn lengths(&self) -> (usize, usize) {
        let n = self.states.len();

        // 0-1 BFS: boundary resolution costs nothing, a character costs one.
        let mut dist = vec![usize::MAX; n];
        let mut queue = VecDeque::new();
        dist[self.start.index()] = 0;
        queue.push_back(self.start);
        while let Some(id) = queue.pop_front() {
            let d = dist[id.index()];
            for (to, w) in self.edges(id) {
                if d + w < dist[to.index()] {
                    dist[to.index()] = d + w;
                    if w == 0 {
                        queue.push_front(to);
                    } else {
                        queue.push_back(to);
                    }
                }
            }
        }
        let min = (0..n)
            .filter(|&i| dist[i] != usize::MAX)
            .filter_map(|i| {
                let accept = self.states[i].accept.as_ref()?;
                Some(dist[i].saturating_sub(accept.ender_len))
            })
            .min();
        let Some(min) = min else {
            return (0, 0);
        };

        // Iterative DFS: a back edge means a cycle on an accepting path.
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Open,
            Done,
        }
        let mut mark = vec![Mark::New; n];
        let mut order = Vec::with_capacity(n);
        let mut stack: Vec<(DfaStateId, usize)> = vec![(self.start, 0)];
        mark[self.start.index()] = Mark::Open;
        while let Some(top) = stack.last_mut() {
            let id = top.0;
            let next = self.edges(id).nth(top.1);
            top.1 += 1;
            match next {
                Some((to, _)) => match mark[to.index()] {
                    Mark::New => {
                        mark[to.index()] = Mark::Open;
                        stack.push((to, 0));
                    }
                    Mark::Open => return (min, INFINITE),
                    Mark::Done => {}
                },
                None => {
                    mark[id.index()] = Mark::Done;
                    order.push(id);
                    stack.pop();
                }
            }
        }

        // Post-order visits successors first. Values count the characters
        // still to be matched, so an ender handed back is negative here.
        let mut longest: Vec<Option<i64>> = vec![None; n];
        for &id in &order {
            let mut best = self.states[id.index()]
                .accept
                .as_ref()
                .map(|a| -(a.ender_len as i64));
            for (to, w) in self.edges(id) {
                if let Some(l) = longest[to.index()] {
                    let l = l + w as i64;
                    best = Some(best.map_or(l, |b| b.max(l)));
                }
            }
            longest[id.index()] = best;
        }
        let max = longest[self.start.index()].unwrap_or(0).max(0) as usize;
        (min, max)
    }

    /// Longest accepted run of `text` starting at byte `start`.
    ///
    /// `search_start` is the byte offset where `\G` holds. Returns the end
    /// byte offset and the accepting state.
    pub fn longest_at(
        &self,
        text: &str,
        start: usize,
        search_start: usize,
    ) -> Option<(usize, DfaStateId)> {
        let mut state = self.start;
        let mut pos = start;
        let mut last = None;
        loop {
            if !self.looks(state).is_empty() {
                state = self.resolve(state, str_context(text, pos, search_start).looks());
            }
            if let Some(accept) = self.accept(state) {
                last = Some((back_up(text, start, pos, accept.ender_len), state));
            }
            let Some(c) = text[pos..].chars().next() else {
                break;
            };
            match self.next(state, c) {
                Some(next) => {
                    state = next;
                    pos += c.len_utf8();
                }
                None => break,
            }
        }
        last
    }

    /// Longest accepted run at the reader's cursor, without consuming it.
    ///
    /// `search_start` is the reader position where `\G` holds. Returns the
    /// length in characters and the accepting state.
    pub fn longest_in<R: Read>(
        &self,
        reader: &mut InputReader<R>,
        search_start: usize,
    ) -> io::Result<Option<(usize, DfaStateId)>> {
        let base = reader.position();
        let mut state = self.start;
        let mut i = 0;
        let mut last = None;
        loop {
            if !self.looks(state).is_empty() {
                let ctx = LookContext {
                    prev: if i == 0 {
                        reader.previous()
                    } else {
                        reader.peek(i - 1)?
                    },
                    ahead: [reader.peek(i)?, reader.peek(i + 1)?, reader.peek(i + 2)?],
                    at_input_start: base + i == 0,
                    at_search_start: base + i == search_start,
                };
                state = self.resolve(state, ctx.looks());
            }
            if let Some(accept) = self.accept(state) {
                last = Some((i.saturating_sub(accept.ender_len), state));
            }
            let Some(c) = reader.peek(i)? else {
                break;
            };
            match self.next(state, c) {
                Some(next) => {
                    state = next;
                    i += 1;
                }
                None => break,
            }
        }
        Ok(last)
    }
}

/// Byte offset `n` characters before `pos`, but not before `start`.
fn back_up(text: &str, start: usize, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[start..pos]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(start, |(i, _)| start + i)
}

pub(crate) fn str_context(text: &str, pos: usize, search_start: usize) -> LookContext {
    let mut ahead = [None; 3];
    for (slot, c) in ahead.iter_mut().zip(text[pos..].chars()) {
        *slot = Some(c);
    }
    LookContext {
        prev: text[..pos].chars().next_back(),
        ahead,
        at_input_start: pos == 0,
        at_search_start: pos == search_start,
    }
}

/// Subset construction state.
struct Builder<'s, T> {
    scope: &'s Scope<T>,
    /// Closure set of each DFA state, and whether it is settled.
    sets: Vec<(Box<[StateId]>, bool)>,
    index: FxHashMap<(Box<[StateId]>, bool), DfaStateId>,
    states: Vec<DfaState<T>>,
    seen: StateSet,
    stack: Vec<StateId>,
}

impl<'s, T: Clone + Eq + Debug> Builder<'s, T> {
    fn new(scope: &'s Scope<T>) -> Self {
        Self {
            scope,
            sets: Vec::new(),
            index: FxHashMap::default(),
            states: Vec::new(),
            seen: StateSet::new(scope.len()),
            stack: Vec::new(),
        }
    }

    fn closure(
        &mut self,
        seeds: impl IntoIterator<Item = StateId>,
        holding: LookSet,
    ) -> Box<[StateId]> {
        closure(self.scope, &mut self.seen, &mut self.stack, seeds, holding)
    }

    fn intern(&mut self, set: Box<[StateId]>, settled: bool) -> DfaStateId {
        let key = (set, settled);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = DfaStateId(self.sets.len() as u32);
        self.index.insert(key.clone(), id);
        self.sets.push(key);
        self.states.push(DfaState::default());
        id
    }

    fn run(&mut self, start: StateId) -> Result<DfaStateId> {
        let set = self.closure([start], LookSet::empty());
        let start = self.intern(set, false);
        let mut next = 0;
        while next < self.sets.len() {
            self.expand(DfaStateId(next as u32))?;
            next += 1;
        }
        Ok(start)
    }

    fn expand(&mut self, id: DfaStateId) -> Result<()> {
        let (members, settled) = self.sets[id.index()].clone();
        let (accept, halts) = match self.accept(&members)? {
            Some((accept, halts)) => (Some(accept), halts),
            None => (None, false),
        };
        let mut state = DfaState {
            accept,
            ..DfaState::default()
        };
        if !halts && !settled {
            let reachable = self.closure(members.iter().copied(), LookSet::all());
            let mut looks = LookSet::empty();
            for &s in reachable.iter() {
                for t in &self.scope[s].transitions {
                    if let Transition::Set(set, _) = t {
                        looks |= set.looks();
                    }
                }
            }
            for subset in looks.subsets() {
                if !subset.is_realizable_within(looks) {
                    continue;
                }
                let resolved = self.closure(members.iter().copied(), subset);
                if resolved != members {
                    let to = self.intern(resolved, true);
                    state.resolved.push((subset, to));
                }
            }
            if !state.resolved.is_empty() {
                state.looks = looks;
            }
        }
        if !halts {
            state.transitions = self.partition(&members);
        }
        self.states[id.index()] = state;
        Ok(())
    }

    /// Pick the accepted token among the terminals in `members`.
    ///
    /// Returns the winner and whether it stops the scan.
    fn accept(&self, members: &[StateId]) -> Result<Option<(Accept<T>, bool)>> {
        let mut best: Option<(&T, i32)> = None;
        let mut halts = false;
        let mut ender_len = 0;
        let mut rivals: Vec<&T> = Vec::new();
        for &s in members {
            let nfa_state = &self.scope[s];
            let Some(token) = nfa_state.token.as_ref() else {
                continue;
            };
            let priority = nfa_state.priority;
            match best {
                Some((_, p)) if priority < p => {}
                Some((b, p)) if priority == p => {
                    if token == b {
                        halts |= nfa_state.accept_immediately;
                        ender_len = ender_len.max(nfa_state.ender_len);
                    } else if !rivals.contains(&token) {
                        rivals.push(token);
                    }
                }
                _ => {
                    best = Some((token, priority));
                    halts = nfa_state.accept_immediately;
                    ender_len = nfa_state.ender_len;
                    rivals.clear();
                }
            }
        }
        let Some((token, priority)) = best else {
            return Ok(None);
        };
        if !rivals.is_empty() {
            let tokens = std::iter::once(token)
                .chain(rivals)
                .map(|t| format!("{t:?}"))
                .collect();
            return Err(Error::Ambiguity { tokens });
        }
        Ok(Some((
            Accept {
                token: token.clone(),
                priority,
                ender_len,
            },
            halts,
        )))
    }

    /// Split the outgoing intervals of `members` into disjoint classes.
    fn partition(&mut self, members: &[StateId]) -> Vec<(u32, u32, DfaStateId)> {
        let mut edges: Vec<(u32, u32, StateId)> = Vec::new();
        for &s in members {
            for t in &self.scope[s].transitions {
                if let Transition::Set(set, to) = t {
                    edges.extend(set.intervals().iter().map(|&(from, end)| (from, end, *to)));
                }
            }
        }
        if edges.is_empty() {
            return Vec::new();
        }

        let mut points: Vec<u32> = edges.iter().flat_map(|&(f, t, _)| [f, t]).collect();
        points.sort_unstable();
        points.dedup();

        let mut segments: Vec<SmallVec<[StateId; 4]>> = vec![SmallVec::new(); points.len() - 1];
        for &(from, end, to) in &edges {
            let lo = points.partition_point(|&p| p < from);
            let hi = points.partition_point(|&p| p < end);
            for seg in &mut segments[lo..hi] {
                if !seg.contains(&to) {
                    seg.push(to);
                }
            }
        }

        let mut memo: FxHashMap<SmallVec<[StateId; 4]>, DfaStateId> = FxHashMap::default();
        let mut out: Vec<(u32, u32, DfaStateId)> = Vec::new();
        for (i, mut seg) in segments.into_iter().enumerate() {
            if seg.is_empty() {
                continue;
            }
            seg.sort_unstable();
            let target = match memo.get(&seg) {
                Some(&id) => id,
                None => {
                    let set = self.closure(seg.iter().copied(), LookSet::empty());
                    let id = self.intern(set, false);
                    memo.insert(seg, id);
                    id
                }
            };
            let (from, end) = (points[i], points[i + 1]);
            match out.last_mut() {
                Some(last) if last.1 == from && last.2 == target => last.1 = end,
                _ => out.push((from, end, target)),
            }
        }
        out
    }
}
