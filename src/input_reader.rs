//! Buffered character input with lookahead, pushback and incremental UTF-8
//! decoding.
//!
//! The buffer holds every character from the last [`InputReader::clear`] up
//! to as far as anyone has peeked. Matching peeks ahead freely and consumes
//! only what a match covered, so nothing read past a match is lost.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default number of bytes requested from the source per refill.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// A character reader over any [`Read`] source, or over in-memory text.
pub struct InputReader<R = io::Empty> {
    source: R,
    chunk: Box<[u8]>,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    buffer: Vec<char>,
    cursor: usize,
    /// Characters dropped from the front of `buffer` by `clear`.
    discarded: usize,
    /// The character just before `buffer[0]`.
    before_buffer: Option<char>,
    eof: bool,
}

impl<R> std::fmt::Debug for InputReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputReader")
            .field("position", &(self.discarded + self.cursor))
            .field("buffered", &(self.buffer.len() - self.cursor))
            .field("eof", &self.eof)
            .finish()
    }
}

impl InputReader<io::Empty> {
    /// A reader over `text`, fully buffered up front.
    pub fn from_text(text: &str) -> Self {
        Self {
            source: io::empty(),
            chunk: Box::default(),
            pending: Vec::new(),
            buffer: text.chars().collect(),
            cursor: 0,
            discarded: 0,
            before_buffer: None,
            eof: true,
        }
    }
}

impl InputReader<File> {
    /// Open `path`, refilling `size` bytes at a time.
    pub fn from_file(path: impl AsRef<Path>, size: usize) -> io::Result<Self> {
        Ok(Self::with_capacity(File::open(path)?, size))
    }
}

impl<R: Read> InputReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_capacity(source, DEFAULT_BUFFER_SIZE)
    }

    /// A reader refilling `size` bytes at a time (at least one).
    pub fn with_capacity(source: R, size: usize) -> Self {
        Self {
            source,
            chunk: vec![0; size.max(1)].into_boxed_slice(),
            pending: Vec::new(),
            buffer: Vec::new(),
            cursor: 0,
            discarded: 0,
            before_buffer: None,
            eof: false,
        }
    }

    /// Consume and return the next character; `None` at end of input.
    pub fn read(&mut self) -> io::Result<Option<char>> {
        let c = self.peek(0)?;
        if c.is_some() {
            self.cursor += 1;
        }
        Ok(c)
    }

    /// The character `n` positions past the cursor, without consuming it.
    pub fn peek(&mut self, n: usize) -> io::Result<Option<char>> {
        while self.cursor + n >= self.buffer.len() {
            if !self.fill()? {
                return Ok(None);
            }
        }
        Ok(Some(self.buffer[self.cursor + n]))
    }

    /// Consume `n` characters and return them; stops early at end of input.
    pub fn take(&mut self, n: usize) -> io::Result<String> {
        let mut out = String::with_capacity(n);
        for _ in 0..n {
            match self.read()? {
                Some(c) => out.push(c),
                None => break,
            }
        }
        Ok(out)
    }

    /// Read one chunk from the source. Returns false once the source is exhausted.
    fn fill(&mut self) -> io::Result<bool> {
        loop {
            if self.eof {
                return Ok(false);
            }
            let n = match self.source.read(&mut self.chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if n == 0 {
                self.eof = true;
                if !self.pending.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "stream ends inside a UTF-8 sequence",
                    ));
                }
                return Ok(false);
            }
            self.pending.extend_from_slice(&self.chunk[..n]);
            let valid = match std::str::from_utf8(&self.pending) {
                Ok(s) => s.len(),
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            };
            if valid == 0 {
                continue;
            }
            let text = std::str::from_utf8(&self.pending[..valid])
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.buffer.extend(text.chars());
            self.pending.drain(..valid);
            return Ok(true);
        }
    }
}

impl<R> InputReader<R> {
    /// Drop everything before the cursor.
    pub fn clear(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.before_buffer = Some(self.buffer[self.cursor - 1]);
        self.discarded += self.cursor;
        self.buffer.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Push `chars` in front of the unread input; the next reads return them first.
    pub fn insert(&mut self, chars: &[char]) {
        self.buffer
            .splice(self.cursor..self.cursor, chars.iter().copied());
    }

    pub fn insert_str(&mut self, text: &str) {
        self.buffer.splice(self.cursor..self.cursor, text.chars());
    }

    /// The characters buffered but not yet read.
    pub fn buffered(&self) -> String {
        self.buffer[self.cursor..].iter().collect()
    }

    /// Number of characters consumed since the start.
    pub fn position(&self) -> usize {
        self.discarded + self.cursor
    }

    /// The last character consumed.
    pub fn previous(&self) -> Option<char> {
        match self.cursor {
            0 => self.before_buffer,
            n => Some(self.buffer[n - 1]),
        }
    }

    /// Characters read since the last [`clear`](Self::clear).
    pub fn consumed(&self) -> String {
        self.buffer[..self.cursor].iter().collect()
    }
}
