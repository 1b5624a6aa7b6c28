//! Quick segmenter (§4.9, C9).
//!
//! Shares the lexer's string/comment-aware scanning with the grammar engine
//! but skips tree construction entirely — it only needs to know where one
//! directive ends and the next begins, which is a much cheaper question than
//! "what does this directive mean".

use crate::parser::ParseFlags;
use crate::position::InputPosition;

/// One statement or command boundary, as reported to a [`quick_parse`]
/// callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub is_statement: bool,
    pub range: crate::position::InputRange,
    /// Set on the final segment when no terminator (`;`/newline) preceded
    /// end-of-input.
    pub eof: bool,
}

/// Scan `text` for directive boundaries, invoking `callback` once per
/// segment in left-to-right order. A non-zero callback return aborts
/// segmentation and is propagated as-is (§4.9, §7).
pub fn quick_parse(text: &str, flags: ParseFlags, mut callback: impl FnMut(Segment) -> i32) -> i32 {
    let mut cursor = crate::input::Cursor::new(text, InputPosition::ZERO);

    loop {
        skip_trivia(&mut cursor);
        if cursor.is_eof() {
            return 0;
        }

        let start = cursor.position();
        let is_command = !flags.contains(ParseFlags::ONLY_STATEMENTS) && at_command_start(&cursor);

        let (end, eof) = if is_command {
            scan_command(&mut cursor)
        } else {
            scan_statement(&mut cursor)
        };

        let rc = callback(Segment {
            is_statement: !is_command,
            range: crate::position::InputRange::new(start, end),
            eof,
        });
        if rc != 0 {
            return rc;
        }
        if eof {
            return 0;
        }
    }
}

/// Whether `:` sits at the first non-blank of the current line.
fn at_command_start(cursor: &crate::input::Cursor<'_>) -> bool {
    cursor.peek() == Some(':')
}

fn skip_trivia(cursor: &mut crate::input::Cursor<'_>) {
    loop {
        match cursor.peek() {
            Some(c) if c.is_whitespace() => {
                cursor.bump();
            }
            Some('/') if cursor.peek_at(1) == Some('/') => {
                while cursor.peek().map(|c| c != '\n').unwrap_or(false) {
                    cursor.bump();
                }
            }
            Some('/') if cursor.peek_at(1) == Some('*') => {
                cursor.bump_n(2);
                while !cursor.is_eof() && !cursor.starts_with("*/") {
                    cursor.bump();
                }
                if cursor.starts_with("*/") {
                    cursor.bump_n(2);
                }
            }
            _ => return,
        }
    }
}

/// Consume up to an unescaped `;`, tracking string/comment contexts so a
/// `;` inside either doesn't terminate the statement. The reported end
/// position trims trailing whitespace before the terminator (or
/// end-of-input), so segment ranges plus the inter-segment trivia they
/// elide reconstruct the input exactly (§8's idempotence property).
fn scan_statement(cursor: &mut crate::input::Cursor<'_>) -> (InputPosition, bool) {
    let mut last_significant = cursor.position();
    loop {
        match cursor.peek() {
            None => return (last_significant, true),
            Some(';') => {
                cursor.bump();
                return (last_significant, false);
            }
            Some(c) if c.is_whitespace() => {
                cursor.bump();
            }
            Some('"') | Some('\'') => {
                let quote = cursor.peek().unwrap();
                cursor.bump();
                skip_quoted_body(cursor, quote);
                last_significant = cursor.position();
            }
            Some('`') => {
                cursor.bump();
                while let Some(c) = cursor.peek() {
                    cursor.bump();
                    if c == '`' {
                        break;
                    }
                }
                last_significant = cursor.position();
            }
            Some('/') if cursor.peek_at(1) == Some('/') => {
                while cursor.peek().map(|c| c != '\n').unwrap_or(false) {
                    cursor.bump();
                }
                last_significant = cursor.position();
            }
            Some('/') if cursor.peek_at(1) == Some('*') => {
                cursor.bump_n(2);
                while !cursor.is_eof() && !cursor.starts_with("*/") {
                    cursor.bump();
                }
                if cursor.starts_with("*/") {
                    cursor.bump_n(2);
                }
                last_significant = cursor.position();
            }
            Some(_) => {
                cursor.bump();
                last_significant = cursor.position();
            }
        }
    }
}

fn skip_quoted_body(cursor: &mut crate::input::Cursor<'_>, quote: char) {
    while let Some(c) = cursor.peek() {
        if c == '\\' {
            cursor.bump();
            cursor.bump();
        } else if c == quote {
            cursor.bump();
            break;
        } else {
            cursor.bump();
        }
    }
}

/// Consume up to end-of-line or `;`, honouring `\`-continuation (§4.6's
/// command syntax): a trailing backslash, possibly followed by trailing
/// whitespace or a line comment, swallows the newline and keeps scanning
/// rather than ending the command there.
fn scan_command(cursor: &mut crate::input::Cursor<'_>) -> (InputPosition, bool) {
    let mut last_significant = cursor.position();
    loop {
        match cursor.peek() {
            None => return (last_significant, true),
            Some(';') => {
                cursor.bump();
                return (last_significant, false);
            }
            Some('\n') => {
                cursor.bump();
                return (last_significant, false);
            }
            Some(c) if c.is_whitespace() => {
                cursor.bump();
            }
            Some(quote @ ('\'' | '"')) => {
                cursor.bump();
                skip_quoted_body(cursor, quote);
                last_significant = cursor.position();
            }
            Some('\\') => {
                if continues_line(cursor) {
                    continue;
                }
                // Not a continuation: the backslash just escapes the next
                // character.
                cursor.bump();
                cursor.bump();
                last_significant = cursor.position();
            }
            Some('/') if cursor.peek_at(1) == Some('/') => {
                while cursor.peek().map(|c| c != '\n').unwrap_or(false) {
                    cursor.bump();
                }
            }
            Some(_) => {
                cursor.bump();
                last_significant = cursor.position();
            }
        }
    }
}

/// Whether the `\` at the cursor continues the command onto the next line:
/// trailing whitespace and/or a line comment before the newline don't
/// disqualify it. Consumes through the newline and returns `true` if so;
/// otherwise leaves the cursor at the `\` and returns `false`.
fn continues_line(cursor: &mut crate::input::Cursor<'_>) -> bool {
    let start = cursor.checkpoint();
    cursor.bump();
    loop {
        match cursor.peek() {
            Some(c) if c.is_whitespace() && c != '\n' => {
                cursor.bump();
            }
            Some('/') if cursor.peek_at(1) == Some('/') => {
                while cursor.peek().map(|c| c != '\n').unwrap_or(false) {
                    cursor.bump();
                }
            }
            Some('\n') => {
                cursor.bump();
                return true;
            }
            _ => {
                cursor.restore(start);
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(text: &str, flags: ParseFlags) -> Vec<Segment> {
        let mut out = Vec::new();
        quick_parse(text, flags, |s| {
            out.push(s);
            0
        });
        out
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(segments("", ParseFlags::DEFAULT).is_empty());
        assert!(segments("   \n // hi\n", ParseFlags::DEFAULT).is_empty());
    }

    #[test]
    fn bare_semicolon_yields_one_empty_statement() {
        let segs = segments(";", ParseFlags::DEFAULT);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].range.start.offset, 0);
        assert_eq!(segs[0].range.end.offset, 1);
        assert!(!segs[0].eof);
    }

    #[test]
    fn three_statements_with_trailing_unterminated() {
        let text = "return 1; return 2;\n   return 3    ;";
        let segs = segments(text, ParseFlags::DEFAULT);
        let ranges: Vec<(usize, usize)> = segs
            .iter()
            .map(|s| (s.range.start.offset, s.range.end.offset))
            .collect();
        assert_eq!(ranges, vec![(0, 8), (10, 18), (23, 31)]);
        assert!(segs.iter().all(|s| s.is_statement));
    }

    #[test]
    fn colon_line_is_a_command_by_default() {
        let segs = segments(":hunter\n", ParseFlags::DEFAULT);
        assert_eq!(segs.len(), 1);
        assert!(!segs[0].is_statement);
    }

    #[test]
    fn only_statements_flag_folds_colon_into_statement() {
        let segs = segments(":hunter\n", ParseFlags::ONLY_STATEMENTS);
        assert_eq!(segs.len(), 1);
        assert!(segs[0].is_statement);
    }

    #[test]
    fn command_with_escapes_and_quoted_semicolon_is_one_segment() {
        // Ported from `parse_command_with_escape_chars` — a quoted segment
        // (single or double) keeps its `;` from terminating the command.
        let segs = segments(":hunter\\;s\\\"thom\\\\\"pson;\"\n", ParseFlags::DEFAULT);
        assert_eq!(segs.len(), 1);
        assert!(!segs[0].is_statement);
        assert_eq!(segs[0].range.start.offset, 0);
        assert_eq!(segs[0].range.end.offset, 25);
        assert!(!segs[0].eof);
    }

    #[test]
    fn backslash_continuation_spans_a_line_comment_and_a_newline() {
        // Ported from `parse_multiline_command` — a trailing backslash,
        // followed only by whitespace and/or a line comment, continues the
        // command onto the next line instead of ending it.
        let segs = segments(":hunter \\ //firstname\ns \\\nthompson //lastname\n", ParseFlags::DEFAULT);
        assert_eq!(segs.len(), 1);
        assert!(!segs[0].is_statement);
        assert_eq!(segs[0].range.start.offset, 0);
        assert_eq!(segs[0].range.end.offset, 34);
        assert!(!segs[0].eof);
    }

    #[test]
    fn callback_abort_propagates() {
        let mut calls = 0;
        let rc = quick_parse("a; b; c;", ParseFlags::DEFAULT, |_| {
            calls += 1;
            if calls == 2 {
                42
            } else {
                0
            }
        });
        assert_eq!(rc, 42);
        assert_eq!(calls, 2);
    }
}
