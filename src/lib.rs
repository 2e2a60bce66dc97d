//! lexdfa: regular expressions compiled to deterministic automata, the
//! lexical engine of a parser generator.
//!
//! Expressions are parsed into NFA fragments allocated in a [`Scope`], joined
//! with [`Nfa::union`] when several token patterns share one lexer, and turned
//! into a [`Dfa`] by subset construction. Matching is leftmost-longest and
//! linear in the input per start position.
//!
//! ```
//! use lexdfa::Regex;
//!
//! let re = Regex::compile("[a-z]+[0-9]*").unwrap();
//! assert_eq!(re.find("  abc123 ").unwrap(), "abc123");
//! assert_eq!(re.replace("a1 b2", "X"), "X X");
//! assert_eq!(re.min_length(), 1);
//! ```
//!
//! Several patterns can be compiled into one automaton, with literal
//! patterns winning over the general ones on equal input:
//! ```
//! use lexdfa::Lexer;
//!
//! let mut builder = Lexer::builder();
//! builder.add("while", "keyword").unwrap();
//! builder.add("[a-z]+", "ident").unwrap();
//! let lexer = builder.build().unwrap();
//!
//! assert_eq!(lexer.longest_match("while"), Some((&"keyword", 5)));
//! assert_eq!(lexer.longest_match("whilst"), Some((&"ident", 6)));
//! ```

pub mod automaton;
mod error;
mod input_reader;
mod lexer;
mod matcher;
mod options;
mod prefix_finder;
mod range;
mod range_set;
mod regex;
pub mod regexp;
mod unicode_categories;
mod wildcard;

pub use automaton::{Dfa, DfaStateId, Nfa, Scope};
pub use error::{Error, Result};
pub use input_reader::{InputReader, DEFAULT_BUFFER_SIZE};
pub use lexer::{Lexer, LexerBuilder};
pub use matcher::{Matcher, RegexMatcher, RegexMatcherBuilder, Status};
pub use options::Options;
pub use prefix_finder::{PrefixFinder, PrefixFinderBuilder};
pub use range::{Boundary, LookContext, LookSet, Range, MAX_CODE_POINT};
pub use range_set::RangeSet;
pub use regex::{escape, Match, Matches, Regex, RegexBuilder};
pub use regexp::{create_nfa, INFINITE, MAX_NESTING};
pub use unicode_categories::{escape_class, named_class};
pub use wildcard::{wildcard_to_regex, WildcardMatcher, WildcardMatcherBuilder};
