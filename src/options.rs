//! Compile-time options.

use bitflags::bitflags;

bitflags! {
    /// Flags accepted when compiling an expression.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Options: u32 {
        /// Literals and dash ranges match both cases.
        const CASE_INSENSITIVE = 1 << 0;
        /// The trailing ender matches at its first occurrence instead of its last.
        const FIXED_ENDER = 1 << 1;
        /// An accepting state stops the scan instead of looking for a longer match.
        const ACCEPT_IMMEDIATELY = 1 << 2;
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::empty()
    }
}

impl Options {
    #[inline]
    pub fn case_insensitive(self) -> bool {
        self.contains(Options::CASE_INSENSITIVE)
    }
}
