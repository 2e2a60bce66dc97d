//! Error type shared by compilation, construction and matching.

use thiserror::Error;

/// Errors surfaced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed expression text, or a `find` that found nothing.
    #[error("{message} at offset {offset}")]
    Syntax { message: String, offset: usize },

    /// Two distinct tokens accepted in the same DFA state at equal priority.
    #[error("ambiguous tokens {tokens:?} accepted at equal priority")]
    Ambiguity { tokens: Vec<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            offset,
        }
    }

    /// Returns true for [`Error::Syntax`].
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    /// Returns true for [`Error::Ambiguity`].
    pub fn is_ambiguity(&self) -> bool {
        matches!(self, Error::Ambiguity { .. })
    }

    /// Byte offset of a syntax error in the expression.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
