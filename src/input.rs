//! Input source & position tracker (§4.1, C1).
//!
//! Cypher source is read from either an in-memory string or a byte stream
//! that is drained up front into an owned buffer — backtracking needs
//! random access, so there is no point pretending the stream case avoids
//! buffering it.

use std::io;

use crate::position::InputPosition;

/// A byte-oriented source that can be read into an owned buffer.
///
/// Mirrors `parse`/`parse_stream` in §6: one constructor takes an in-memory
/// slice directly, the other drains a [`std::io::Read`] implementor.
pub enum Source<'a> {
    Buffer(&'a str),
    Owned(String),
}

impl<'a> Source<'a> {
    pub fn from_str(text: &'a str) -> Self {
        Source::Buffer(text)
    }

    pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Self, crate::HostError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(crate::HostError::Io)?;
        let text = String::from_utf8(bytes).map_err(|e| crate::HostError::InvalidUtf8(e.utf8_error()))?;
        Ok(Source::Owned(text))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Source::Buffer(s) => s,
            Source::Owned(s) => s.as_str(),
        }
    }
}

/// A restartable cursor over a [`Source`], tracking `(line, column, offset)`
/// as it consumes characters.
///
/// The `initial_position` config (§4.1) shifts every reported position: the
/// cursor's internal bookkeeping always starts counting from that position
/// rather than from `(1, 1, 0)`, so offsets, lines and columns are already
/// correct for embedding into a larger document.
pub struct Cursor<'a> {
    text: &'a str,
    /// Byte offset into `text`, unshifted.
    pos: usize,
    line: u32,
    column: u32,
    initial_offset: usize,
}

/// An opaque snapshot of cursor state for backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str, initial: InputPosition) -> Self {
        Self {
            text,
            pos: 0,
            line: initial.line,
            column: initial.column,
            initial_offset: initial.offset,
        }
    }

    pub fn position(&self) -> InputPosition {
        InputPosition::new(self.line, self.column, self.initial_offset + self.pos)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Remaining, not-yet-consumed input.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Consume one character, updating line/column bookkeeping.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `n` characters unconditionally (caller has already peeked).
    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
        self.line = cp.line;
        self.column = cp.column;
    }

    /// The whole source text, for slicing ranges out by absolute (unshifted)
    /// byte offset.
    pub fn full_text(&self) -> &'a str {
        self.text
    }

    pub fn initial_offset(&self) -> usize {
        self.initial_offset
    }
}
