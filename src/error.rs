//! Error tracker & parse diagnostics (§4.5, §7, C5).
//!
//! Two disjoint error surfaces, matching the teacher's own split between a
//! plain-data `Error` type for parse problems and ordinary `std::error::Error`
//! types for everything else:
//!
//! - [`ParseError`] is plain data describing a spot in the *input* that
//!   didn't parse. Like the teacher's `Error`, it does not implement
//!   `Display`/`std::error::Error` — callers render it themselves (a
//!   terminal reporter, an LSP diagnostic, whatever fits).
//! - [`HostError`] covers everything that isn't about the input text: I/O
//!   failures reading a stream, invalid UTF-8, limits misconfigured before
//!   parsing starts. It derives `thiserror::Error` like the structural error
//!   enums in the sibling compiler/encoder crates.

use std::fmt;
use std::io;
use std::str::Utf8Error;

use crate::position::InputPosition;

/// A single parse diagnostic, in the field shape of `cypher_parse_error`:
/// a position, a message, and an optional context window around it.
#[derive(Clone, PartialEq, Eq)]
pub struct ParseError {
    pub(crate) position: InputPosition,
    pub(crate) message: String,
    pub(crate) context: Option<String>,
    pub(crate) context_offset: usize,
}

impl ParseError {
    pub fn new(position: InputPosition, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            context: None,
            context_offset: 0,
        }
    }

    pub fn with_context(
        position: InputPosition,
        message: impl Into<String>,
        context: String,
        context_offset: usize,
    ) -> Self {
        Self {
            position,
            message: message.into(),
            context: Some(context),
            context_offset,
        }
    }

    pub fn position(&self) -> InputPosition {
        self.position
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// A line of input surrounding the error, if the tracker was configured
    /// to capture one, along with [`ParseError::context_offset`] marking
    /// where in that line the error falls.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn context_offset(&self) -> usize {
        self.context_offset
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR@{} {:?}", self.position, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " {context:?}@{}", self.context_offset)?;
        }
        Ok(())
    }
}

/// Failures that have nothing to do with the shape of the input: reading a
/// stream, decoding it, or a precondition the caller violated before parsing
/// even started.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("failed to read input")]
    Io(#[source] io::Error),
    #[error("input is not valid UTF-8")]
    InvalidUtf8(#[source] Utf8Error),
    #[error("recursion limit must be greater than zero")]
    ZeroRecursionLimit,
    #[error("a {parent} node cannot take a {child} child")]
    InvalidChildKind {
        parent: &'static str,
        child: &'static str,
    },
}

/// One potential failure recorded while a grammar rule tried and backed out
/// of an alternative. Not yet a diagnostic — just raw material for one.
#[derive(Debug, Clone)]
struct Potential {
    position: InputPosition,
    /// The character (if any) that sat at `position` when this alternative
    /// failed — carried at record time, not recomputed at reification, since
    /// later potentials at the same furthest position may come from a
    /// different backtrack with the cursor elsewhere.
    next_char: Option<char>,
    /// What the grammar was hoping to find here (a token spelling, a rule
    /// name used as a label, …).
    expected: String,
}

/// Accumulates [`Potential`] failures as the grammar engine backtracks, then
/// reifies them into a single `ParseError` at the point furthest into the
/// input any alternative got.
///
/// This mirrors the classic PEG "furthest failure" error strategy: rather
/// than reporting the first thing that went wrong (often misleadingly
/// shallow, since a short alternative fails fast), it reports the
/// explanation for the attempt that consumed the most input before giving
/// up.
#[derive(Debug, Default)]
pub struct ErrorTracker {
    furthest: Option<InputPosition>,
    potentials: Vec<Potential>,
    /// Diagnostics already reified and emitted (e.g. by limit checks),
    /// which bypass the furthest-failure mechanism entirely.
    emitted: Vec<ParseError>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a rule expected `expected` at `position`, with `next_char`
    /// the character the cursor was sitting on (`None` at end-of-input), and
    /// failed.
    pub fn record(
        &mut self,
        position: InputPosition,
        next_char: Option<char>,
        expected: impl Into<String>,
    ) {
        match self.furthest {
            Some(furthest) if position < furthest => return,
            Some(furthest) if position > furthest => {
                self.potentials.clear();
                self.furthest = Some(position);
            }
            None => self.furthest = Some(position),
            _ => {}
        }
        self.potentials.push(Potential {
            position,
            next_char,
            expected: expected.into(),
        });
    }

    /// File a diagnostic directly, skipping the furthest-failure mechanism.
    /// Used for limit violations (§D) and other conditions that should
    /// always surface regardless of what backtracking was doing.
    pub fn emit(&mut self, error: ParseError) {
        self.emitted.push(error);
    }

    pub fn has_errors(&self) -> bool {
        self.furthest.is_some() || !self.emitted.is_empty()
    }

    /// Consume the tracker, producing the final diagnostic list: one reified
    /// `Invalid input '<char>': expected X, Y or Z` error for the
    /// furthest-failure set (if any potentials were recorded), followed by
    /// any directly emitted diagnostics, in the order they were filed.
    pub fn into_errors(mut self) -> Vec<ParseError> {
        let mut errors = Vec::with_capacity(self.emitted.len() + 1);
        if let Some(position) = self.furthest {
            let next_char = self.potentials.first().and_then(|p| p.next_char);
            let labels = dedup_preserve_order(self.potentials.drain(..).map(|p| p.expected));
            let message = format_expected(next_char, &labels);
            errors.push(ParseError::new(position, message));
        }
        errors.append(&mut self.emitted);
        errors
    }
}

/// Deduplicate labels, keeping the first occurrence of each (backtracking
/// revisits the same expectation from different alternatives constantly;
/// the diagnostic should name it once).
fn dedup_preserve_order(labels: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for label in labels {
        if seen.insert(label.clone()) {
            out.push(label);
        }
    }
    out
}

/// Format the `Invalid input '<char>': expected <labels>` message (§4.5),
/// bit-exact with the original implementation's wording.
fn format_expected(next_char: Option<char>, labels: &[String]) -> String {
    let found = match next_char {
        None => "<end of input>".to_string(),
        Some(c) => escape_char(c),
    };
    let expectation = match labels {
        [] => return format!("Invalid input '{found}'"),
        [only] => only.clone(),
        [all @ .., last] => format!("{} or {last}", all.join(", ")),
    };
    format!("Invalid input '{found}': expected {expectation}")
}

/// Escape a character the way a diagnostic's "found" token is shown:
/// C-style escapes for the common control characters, `\xNN` for any other
/// non-printable byte, literal otherwise.
pub fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\0' => "\\0".to_string(),
        c if (c as u32) < 0x20 || c as u32 == 0x7f => format!("\\x{:02x}", c as u32),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn furthest_failure_wins() {
        let mut tracker = ErrorTracker::new();
        tracker.record(InputPosition::new(1, 1, 0), Some('M'), "'MATCH'");
        tracker.record(InputPosition::new(1, 5, 4), Some('x'), "'RETURN'");
        tracker.record(InputPosition::new(1, 5, 4), Some('x'), "identifier");
        let errors = tracker.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].position().offset, 4);
        assert!(errors[0].message().contains("'RETURN'"));
        assert!(errors[0].message().contains("identifier"));
    }

    #[test]
    fn matches_original_wording() {
        let mut tracker = ErrorTracker::new();
        tracker.record(InputPosition::new(1, 1, 0), Some('x'), "label1");
        tracker.record(InputPosition::new(1, 1, 0), Some('x'), "label2");
        tracker.record(InputPosition::new(1, 1, 0), Some('x'), "label3");
        let errors = tracker.into_errors();
        assert_eq!(
            errors[0].message(),
            "Invalid input 'x': expected label1, label2 or label3"
        );
    }

    #[test]
    fn escapes_newline() {
        let mut tracker = ErrorTracker::new();
        tracker.record(InputPosition::new(1, 1, 0), Some('\n'), "label");
        let errors = tracker.into_errors();
        assert_eq!(errors[0].message(), "Invalid input '\\n': expected label");
    }

    #[test]
    fn labels_dedup_preserving_order() {
        let labels = dedup_preserve_order(
            ["a".to_string(), "b".to_string(), "a".to_string()].into_iter(),
        );
        assert_eq!(labels, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn emitted_errors_bypass_furthest_failure() {
        let mut tracker = ErrorTracker::new();
        tracker.emit(ParseError::new(InputPosition::ZERO, "recursion limit exceeded"));
        let errors = tracker.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "recursion limit exceeded");
    }
}
