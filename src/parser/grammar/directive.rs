//! Entry rule `directive` (§4.6) and command syntax (§4.6, §6).
//!
//! Commands don't tokenize the way expressions do — backslash escapes,
//! quote-spanning arguments and line continuation aren't expressible as
//! ordinary tokens — so this rule bypasses the pre-lexed stream entirely via
//! [`Parser::raw_cursor`] and resynchronizes it afterward with
//! [`Parser::sync_to_offset`].

use crate::ast::Payload;
use crate::kind::NodeKind;
use crate::lexer::TokenKind;
use crate::parser::{ParseFlags, Parser};

/// `directive` (§4.6): a command if `:` sits at the first non-blank of the
/// line and `ONLY_STATEMENTS` isn't set, a statement otherwise. Returns
/// whether the directive was consumed cleanly (vs. needing recovery).
pub fn directive(p: &mut Parser) -> bool {
    if !p.flags.contains(ParseFlags::ONLY_STATEMENTS) && p.peek_kind() == TokenKind::Colon {
        command(p)
    } else {
        super::statement::statement(p)
    }
}

/// Parse `:name arg1 arg2 ...` (§4.6, §6): arguments are whitespace
/// separated; a quoted segment (single- or double-quoted) preserves spaces
/// and joins with adjoining unquoted text into one argument; a backslash
/// escapes one following character, or, if only whitespace and/or a line
/// comment follow it before the newline, continues the command onto the
/// next line instead; comments are recorded as children; the command
/// terminates at an unescaped newline or `;` outside any quoted segment.
pub fn command(p: &mut Parser) -> bool {
    p.start_node(NodeKind::Command);
    let mut cursor = p.raw_cursor();
    cursor.bump(); // the leading ':'

    let name = scan_word(&mut cursor).unwrap_or_default();
    let mut last_significant = cursor.position();

    loop {
        skip_command_spaces(&mut cursor);
        match cursor.peek() {
            None => break,
            Some(';') => {
                cursor.bump();
                break;
            }
            Some('\n') => {
                cursor.bump();
                break;
            }
            Some('/') if cursor.peek_at(1) == Some('/') => {
                scan_command_comment(p, &mut cursor, false);
                last_significant = cursor.position();
            }
            Some('/') if cursor.peek_at(1) == Some('*') => {
                scan_command_comment(p, &mut cursor, true);
                last_significant = cursor.position();
            }
            Some(_) => {
                let start = cursor.position();
                if let Some(arg) = scan_word(&mut cursor) {
                    let end = cursor.position();
                    let range = crate::position::InputRange::new(start, end);
                    let id = p.alloc_leaf(NodeKind::String, range, Payload::Text(arg));
                    p.push_child(id);
                    last_significant = end;
                } else {
                    break;
                }
            }
        }
    }

    p.sync_to_offset(cursor.position().offset);
    p.close_frame(last_significant, Payload::Text(name)).is_ok()
}

fn skip_command_spaces(cursor: &mut crate::input::Cursor<'_>) {
    while matches!(cursor.peek(), Some(' ') | Some('\t') | Some('\r')) {
        cursor.bump();
    }
}

/// Scan one whitespace-delimited word, honouring quote spanning (either `'`
/// or `"`) and backslash escapes — partial quoting (`key='value with
/// spaces'`) joins into a single argument (§6).
fn scan_word(cursor: &mut crate::input::Cursor<'_>) -> Option<String> {
    skip_command_spaces(cursor);
    match cursor.peek() {
        None | Some('\n') | Some(';') => return None,
        _ => {}
    }
    let mut text = String::new();
    loop {
        match cursor.peek() {
            None | Some('\n') | Some(';') | Some(' ') | Some('\t') => break,
            Some(quote @ ('\'' | '"')) => {
                cursor.bump();
                loop {
                    match cursor.peek() {
                        None | Some('\n') => break,
                        Some(c) if c == quote => {
                            cursor.bump();
                            break;
                        }
                        Some('\\') => {
                            cursor.bump();
                            if let Some(escaped) = cursor.peek() {
                                text.push(escaped);
                                cursor.bump();
                            }
                        }
                        Some(c) => {
                            text.push(c);
                            cursor.bump();
                        }
                    }
                }
            }
            Some('\\') => {
                if continues_line(cursor) {
                    continue;
                }
                cursor.bump();
                if let Some(escaped) = cursor.peek() {
                    if escaped != '\n' {
                        text.push(escaped);
                    }
                    cursor.bump();
                }
            }
            Some(c) => {
                text.push(c);
                cursor.bump();
            }
        }
    }
    Some(text)
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

fn scan_command_comment(p: &mut Parser, cursor: &mut crate::input::Cursor<'_>, block: bool) {
    let start = cursor.position();
    if block {
        cursor.bump_n(2);
        while !cursor.is_eof() && !cursor.starts_with("*/") {
            cursor.bump();
        }
        if cursor.starts_with("*/") {
            cursor.bump_n(2);
        }
    } else {
        cursor.bump_n(2);
        while cursor.peek().map(|c| c != '\n').unwrap_or(false) {
            cursor.bump();
        }
    }
    let end = cursor.position();
    let range = crate::position::InputRange::new(start, end);
    let raw = cursor.full_text();
    let base = cursor.initial_offset();
    let text = &raw[start.offset - base..end.offset - base];
    let kind = if block { NodeKind::BlockComment } else { NodeKind::LineComment };
    let body = if block {
        text.trim_start_matches("/*").trim_end_matches("*/").to_string()
    } else {
        text.trim_start_matches("//").to_string()
    };
    let id = p.alloc_leaf(kind, range, Payload::Text(body));
    p.push_child(id);
}

#[cfg(test)]
mod tests {
    use crate::kind::NodeKind;
    use crate::parser::Parser;

    #[test]
    fn command_with_no_args() {
        let result = Parser::new(":hunter\n").parse();
        let dir = result.directive(0).unwrap();
        let node = result.arena().get(dir);
        assert_eq!(node.kind(), NodeKind::Command);
        assert_eq!(node.range().start.offset, 0);
        assert_eq!(node.range().end.offset, 7);
        assert_eq!(node.text(), Some("hunter"));
        assert_eq!(node.nchildren(), 0);
    }

    #[test]
    fn command_with_two_args() {
        let result = Parser::new(":hunter s thompson\n").parse();
        let dir = result.directive(0).unwrap();
        let arena = result.arena();
        let node = arena.get(dir);
        assert_eq!(node.range().end.offset, 18);
        assert_eq!(node.nchildren(), 2);
        assert_eq!(arena.get(node.child(0).unwrap()).text(), Some("s"));
        assert_eq!(arena.get(node.child(1).unwrap()).text(), Some("thompson"));
    }

    #[test]
    fn command_with_quoted_arg() {
        let result = Parser::new(":thompson 'hunter s'\n").parse();
        let dir = result.directive(0).unwrap();
        let arena = result.arena();
        let node = arena.get(dir);
        assert_eq!(node.range().end.offset, 20);
        assert_eq!(node.text(), Some("thompson"));
        assert_eq!(arena.get(node.child(0).unwrap()).text(), Some("hunter s"));
    }

    #[test]
    fn command_with_partial_quoted_arg() {
        let result = Parser::new(":thompson lastname='hunter s'\n").parse();
        let dir = result.directive(0).unwrap();
        let arena = result.arena();
        let node = arena.get(dir);
        assert_eq!(node.range().end.offset, 29);
        let arg = arena.get(node.child(0).unwrap());
        assert_eq!(arg.range().start.offset, 10);
        assert_eq!(arg.range().end.offset, 29);
        assert_eq!(arg.text(), Some("lastname=hunter s"));
    }

    #[test]
    fn command_continues_across_backslash_newline() {
        // A bare trailing backslash before the newline joins the next line
        // into the same command instead of ending it there.
        let result = Parser::new(":hunter s \\\nthompson\n").parse();
        let dir = result.directive(0).unwrap();
        let arena = result.arena();
        let node = arena.get(dir);
        assert_eq!(node.text(), Some("hunter"));
        assert_eq!(node.nchildren(), 2);
        assert_eq!(arena.get(node.child(0).unwrap()).text(), Some("s"));
        assert_eq!(arena.get(node.child(1).unwrap()).text(), Some("thompson"));
    }
}
