//! Regexp parsing and NFA building.
//!
//! The parser turns expression text into a tree of quantified atoms whose
//! edge sets are already resolved (escapes, named classes, case folding).
//! The builder then emits a fresh fragment per quantifier copy into a
//! [`Scope`](crate::automaton::Scope).

mod nfa;
mod parser;

// Re-export public API
pub use nfa::create_nfa;
pub use parser::{
    parse_regexp, Atom, ParsedRegexp, QuantifiedAtom, Quantifier, RegexpBranch, RegexpRoot,
    INFINITE, MAX_NESTING,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Dfa, Scope};
    use crate::options::Options;

    fn lengths(expr: &str) -> (usize, usize) {
        let mut scope = Scope::new();
        let nfa = create_nfa(&mut scope, expr, (), Options::empty()).unwrap();
        let dfa = Dfa::construct(&scope, nfa.first()).unwrap();
        (dfa.min_length(), dfa.max_length())
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_regexp("abc", Options::empty()).unwrap();
        assert_eq!(parsed.root.len(), 1);
        assert_eq!(parsed.root[0].len(), 3);
    }

    #[test]
    fn test_parse_alternation() {
        let parsed = parse_regexp("a|b|c", Options::empty()).unwrap();
        assert_eq!(parsed.root.len(), 3);
    }

    #[test]
    fn test_parse_group() {
        let parsed = parse_regexp("(ab)+c", Options::empty()).unwrap();
        assert_eq!(parsed.root[0].len(), 2);
        match &parsed.root[0][0].atom {
            Atom::Group(root) => assert_eq!(root[0].len(), 2),
            Atom::Set(_) => panic!("expected a group"),
        }
        assert_eq!(parsed.root[0][0].quantifier, Quantifier { min: 1, max: INFINITE });
    }

    #[test]
    fn test_lengths() {
        assert_eq!(lengths("a*"), (0, INFINITE));
        assert_eq!(lengths("a.*"), (1, INFINITE));
        assert_eq!(lengths("[acf]{2,4}"), (2, 4));
        assert_eq!(lengths("( (a)*)?"), (0, INFINITE));
        assert_eq!(lengths("(a)|(b)"), (1, 1));
        assert_eq!(lengths("abc"), (3, 3));
        assert_eq!(lengths("[01]{6,966}"), (6, 966));
        assert_eq!(lengths("^abc\\Z\n"), (4, 4));
        assert_eq!(lengths("\\t\\n\\r\\f\\a\\e\\x41"), (7, 7));
    }

    #[test]
    fn test_optional_group_does_not_leak() {
        let mut scope = Scope::new();
        let nfa = create_nfa(&mut scope, "(a*b)?", (), Options::empty()).unwrap();
        let dfa = Dfa::construct(&scope, nfa.first()).unwrap();
        let after_a = dfa.next(dfa.start(), 'a').unwrap();
        assert!(!dfa.is_accepting(after_a));
        let after_ab = dfa.next(after_a, 'b').unwrap();
        assert!(dfa.is_accepting(after_ab));
    }
}
