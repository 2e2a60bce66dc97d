//! NFA building for regexp matching.
//!
//! Walks a parsed tree and emits fragments into a [`Scope`]. Every quantifier
//! copy is built afresh from the tree, so copies never share states.

use crate::automaton::{Nfa, Scope};
use crate::error::{Error, Result};
use crate::options::Options;

use super::parser::{parse_regexp, Atom, QuantifiedAtom, RegexpBranch, RegexpRoot};

/// Compile `expression` into a fragment of `scope` whose exit accepts `token`.
///
/// Literal expressions get their terminal's priority raised by one, so that
/// in a lexer a keyword wins over an identifier pattern matching the same text.
pub fn create_nfa<T>(
    scope: &mut Scope<T>,
    expression: &str,
    token: T,
    options: Options,
) -> Result<Nfa> {
    let parsed = parse_regexp(expression, options)?;
    let mut nfa = build_root(scope, &parsed.root);
    if options.contains(Options::FIXED_ENDER) {
        let ender_len = ender_len(&parsed.root);
        if ender_len == 0 {
            return Err(Error::syntax(
                "fixed ender needs trailing single characters",
                expression.len(),
            ));
        }
        nfa = nfa.modify_fixed_ender(scope, ender_len);
    }
    let terminal = &mut scope[nfa.last()];
    terminal.token = Some(token);
    if parsed.literal {
        terminal.change_priority(1);
    }
    if options.contains(Options::ACCEPT_IMMEDIATELY) {
        terminal.accept_immediately = true;
    }
    Ok(nfa)
}

/// Number of unquantified single-character atoms closing the only branch of
/// `root`; zero when there are several branches.
fn ender_len(root: &RegexpRoot) -> usize {
    let [branch] = root.as_slice() else {
        return 0;
    };
    branch
        .iter()
        .rev()
        .take_while(|piece| match &piece.atom {
            Atom::Set(set) => {
                piece.quantifier.is_one() && set.has_intervals() && set.looks().is_empty()
            }
            Atom::Group(_) => false,
        })
        .count()
}

fn build_root<T>(scope: &mut Scope<T>, root: &RegexpRoot) -> Nfa {
    if let [branch] = root.as_slice() {
        return build_branch(scope, branch);
    }
    let branches: Vec<Nfa> = root.iter().map(|b| build_branch(scope, b)).collect();
    Nfa::union(scope, branches)
}

fn build_branch<T>(scope: &mut Scope<T>, branch: &RegexpBranch) -> Nfa {
    let mut result = None;
    for piece in branch {
        let next = build_piece(scope, piece);
        chain(scope, &mut result, next);
    }
    result.unwrap_or_else(|| Nfa::empty(scope))
}

fn build_atom<T>(scope: &mut Scope<T>, atom: &Atom) -> Nfa {
    match atom {
        Atom::Set(set) => Nfa::from_set(scope, set.clone()),
        Atom::Group(root) => build_root(scope, root),
    }
}

/// `min` mandatory copies, then either a starred copy or `max - min`
/// optional ones.
///
/// Optional atom copies each get an epsilon from their entry to the exit of
/// the whole piece; optional group copies are wrapped in `opt`.
fn build_piece<T>(scope: &mut Scope<T>, piece: &QuantifiedAtom) -> Nfa {
    let q = piece.quantifier;
    if q.max == 0 {
        return Nfa::empty(scope);
    }
    let mut result = None;
    for _ in 0..q.min {
        let copy = build_atom(scope, &piece.atom);
        chain(scope, &mut result, copy);
    }
    if q.is_unbounded() {
        let copy = build_atom(scope, &piece.atom).star(scope);
        chain(scope, &mut result, copy);
    } else {
        let mut skippers = Vec::new();
        for _ in q.min..q.max {
            let copy = build_atom(scope, &piece.atom);
            let copy = match piece.atom {
                Atom::Group(_) => copy.opt(scope),
                Atom::Set(_) => {
                    skippers.push(copy.first());
                    copy
                }
            };
            chain(scope, &mut result, copy);
        }
        if let Some(nfa) = result {
            for from in skippers {
                scope.add_epsilon(from, nfa.last());
            }
        }
    }
    result.unwrap_or_else(|| Nfa::empty(scope))
}

fn chain<T>(scope: &mut Scope<T>, result: &mut Option<Nfa>, next: Nfa) {
    *result = Some(match result.take() {
        Some(nfa) => nfa.concat(scope, next),
        None => next,
    });
}
