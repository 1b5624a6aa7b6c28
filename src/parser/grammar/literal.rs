//! Leaf-string kinds and the two collection literals (§3's leaf-string
//! kinds, §9's "preserve the literal lexeme" note).
//!
//! None of these push their result onto the currently open frame — every
//! constructor here hands back a bare [`NodeId`], the same way
//! [`super::directive::scan_word`]'s caller decides when an argument becomes
//! a child. Expression-grammar atoms (a literal that might still be wrapped
//! in postfix operators before it becomes anyone's child) and frame-nested
//! atoms (a map key, a command argument) both go through the same
//! constructors here; only the call site differs in whether and when it
//! calls `push_child`.

use crate::ast::{NodeId, Payload};
use crate::error::ParseError;
use crate::kind::NodeKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::position::InputRange;

/// `STRING` (§3): decodes backslash escapes, preserving the lexeme only for
/// numeric kinds per §9 — strings store their *decoded* value, since (unlike
/// numbers) there is no requirement to re-serialize the original escapes
/// byte-for-byte.
pub fn string_literal(p: &mut Parser) -> NodeId {
    let token = p.bump();
    let (decoded, terminated) = decode_string_body(&token.text);
    if !terminated {
        p.tracker
            .emit(ParseError::new(token.range.start, "unterminated string literal"));
        return p.alloc_leaf(NodeKind::Error, token.range, Payload::Text(decoded));
    }
    p.alloc_leaf(NodeKind::String, token.range, Payload::Text(decoded))
}

/// `INTEGER` (§3, §9): the lexeme is kept verbatim; only out-of-range text
/// is rejected, as an `ERROR` leaf with a matching diagnostic (§7).
pub fn integer_literal(p: &mut Parser) -> NodeId {
    let token = p.bump();
    if overflows_integer(&token.text) {
        p.tracker.emit(ParseError::new(
            token.range.start,
            format!("integer literal '{}' out of range", token.text),
        ));
        return p.alloc_leaf(NodeKind::Error, token.range, Payload::Text(token.text));
    }
    p.alloc_leaf(NodeKind::Integer, token.range, Payload::Text(token.text))
}

/// `FLOAT` (§3, §9): same lexeme-preserving treatment as
/// [`integer_literal`]; a literal whose value parses to an infinite `f64`
/// (an absurd exponent) is out of range.
pub fn float_literal(p: &mut Parser) -> NodeId {
    let token = p.bump();
    if overflows_float(&token.text) {
        p.tracker.emit(ParseError::new(
            token.range.start,
            format!("float literal '{}' out of range", token.text),
        ));
        return p.alloc_leaf(NodeKind::Error, token.range, Payload::Text(token.text));
    }
    p.alloc_leaf(NodeKind::Float, token.range, Payload::Text(token.text))
}

pub fn true_literal(p: &mut Parser) -> NodeId {
    let token = p.bump();
    p.alloc_leaf(NodeKind::True, token.range, Payload::None)
}

pub fn false_literal(p: &mut Parser) -> NodeId {
    let token = p.bump();
    p.alloc_leaf(NodeKind::False, token.range, Payload::None)
}

pub fn null_literal(p: &mut Parser) -> NodeId {
    let token = p.bump();
    p.alloc_leaf(NodeKind::Null, token.range, Payload::None)
}

/// `PARAMETER` (§3): the lexer's `$name`/`$1` token keeps its `$`; the
/// payload drops it, matching [`crate::render`]'s detail rendering which
/// re-adds it (`${}`) on the way back out.
pub fn parameter(p: &mut Parser) -> NodeId {
    let token = p.bump();
    let name = token.text.strip_prefix('$').unwrap_or(&token.text).to_string();
    p.alloc_leaf(NodeKind::Parameter, token.range, Payload::Text(name))
}

/// `IDENTIFIER`, and the five other leaf-string kinds that share its
/// backtick-quoting rule (`LABEL`, `RELTYPE`, `PROP_NAME`, `FUNCTION_NAME`,
/// `INDEX_NAME`, `PROC_NAME`) — each is the same lexeme shape under a
/// different kind tag, so one decoder serves all of them.
pub fn identifier(p: &mut Parser) -> NodeId {
    name_leaf(p, NodeKind::Identifier)
}

pub fn label(p: &mut Parser) -> NodeId {
    name_leaf(p, NodeKind::Label)
}

pub fn reltype(p: &mut Parser) -> NodeId {
    name_leaf(p, NodeKind::RelType)
}

pub fn prop_name(p: &mut Parser) -> NodeId {
    name_leaf(p, NodeKind::PropName)
}

pub fn function_name(p: &mut Parser) -> NodeId {
    name_leaf(p, NodeKind::FunctionName)
}

pub fn index_name(p: &mut Parser) -> NodeId {
    name_leaf(p, NodeKind::IndexName)
}

pub fn proc_name(p: &mut Parser) -> NodeId {
    name_leaf(p, NodeKind::ProcName)
}

fn name_leaf(p: &mut Parser, kind: NodeKind) -> NodeId {
    let token = p.bump();
    let (text, terminated) = decode_backtick_name(&token.text);
    if !terminated {
        p.tracker
            .emit(ParseError::new(token.range.start, "unterminated escaped name"));
    }
    p.alloc_leaf(kind, token.range, Payload::Text(text))
}

/// `[` expr (`,` expr)* `]` — `COLLECTION` (§3). Built from a plain `Vec`
/// rather than an open frame, like every other constructor in this file: a
/// collection can be the top-level shape `expression` bottoms out at, and an
/// open frame here would auto-attach to whatever the caller already has open
/// before the caller's own `push_child` runs, double-attaching it.
pub fn collection(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.bump(); // '['
    let mut children = Vec::new();
    if p.peek_kind() != TokenKind::RBracket {
        loop {
            children.push(super::expression::expression(p));
            if !p.eat_token(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect_token(TokenKind::RBracket, "']'");
    let end = p.last_end_pos();
    p.build_node(NodeKind::Collection, InputRange::new(start, end), children, Payload::None)
}

/// `{` (propName `:` expr (`,` propName `:` expr)*)? `}` — `MAP` (§3): pairs
/// are kept flat in `children` (key, value, key, value, ...), the same
/// positional-slot convention used for every other kind here that has no
/// dedicated accessor (documented in DESIGN.md). Same frame-free
/// construction as [`collection`], for the same reason.
pub fn map_literal(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.bump(); // '{'
    let mut children = Vec::new();
    if p.peek_kind() != TokenKind::RBrace {
        loop {
            children.push(prop_name(p));
            p.expect_token(TokenKind::Colon, "':'");
            children.push(super::expression::expression(p));
            if !p.eat_token(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect_token(TokenKind::RBrace, "'}'");
    let end = p.last_end_pos();
    p.build_node(NodeKind::Map, InputRange::new(start, end), children, Payload::None)
}

/// Walks a string token's text (quotes included) the same way the lexer's
/// `lex_string` walked it, so "did this actually terminate" is answered by
/// the same rule that produced the token — a quote immediately preceded by
/// an escaping backslash was already consumed as part of that escape by the
/// lexer, so a naive `ends_with(quote)` check on the raw text would
/// misjudge an escaped closing quote as a real one.
fn decode_string_body(text: &str) -> (String, bool) {
    let mut chars = text.chars();
    let quote = chars.next();
    let mut out = String::new();
    let mut terminated = false;
    while let Some(c) = chars.next() {
        if Some(c) == quote {
            terminated = true;
            break;
        }
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some('u') => {
                    let hex: String = (&mut chars).take(4).collect();
                    if hex.len() == 4 {
                        if let Some(decoded) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            out.push(decoded);
                        }
                    }
                }
                Some(other) => out.push(other),
                None => break,
            }
        } else {
            out.push(c);
        }
    }
    (out, terminated)
}

/// A backtick-quoted name has no internal escape sequences in this lexer
/// (`lex_escaped_identifier` stops at the first backtick, so doubling a
/// backtick to embed one isn't representable) — decoding is just stripping
/// the surrounding pair.
fn decode_backtick_name(text: &str) -> (String, bool) {
    if !text.starts_with('`') {
        return (text.to_string(), true);
    }
    if text.len() >= 2 && text.ends_with('`') {
        (text[1..text.len() - 1].to_string(), true)
    } else {
        (text[1..].to_string(), false)
    }
}

fn overflows_integer(text: &str) -> bool {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).is_err()
    } else {
        text.parse::<i64>().is_err()
    }
}

fn overflows_float(text: &str) -> bool {
    match text.parse::<f64>() {
        Ok(v) => v.is_infinite(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_simple_string() {
        let mut p = Parser::new("'hi'");
        let id = string_literal(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::String);
        assert_eq!(node.text(), Some("hi"));
    }

    #[test]
    fn decodes_escapes_in_string() {
        let mut p = Parser::new("'a\\tb\\u0041'");
        let id = string_literal(&mut p);
        assert_eq!(p.arena.get(id).text(), Some("a\tbA"));
    }

    #[test]
    fn unterminated_string_is_an_error_leaf() {
        let mut p = Parser::new("'abc");
        let id = string_literal(&mut p);
        assert_eq!(p.arena.get(id).kind(), NodeKind::Error);
    }

    #[test]
    fn escaped_quote_does_not_terminate_early() {
        let mut p = Parser::new("'a\\'b'");
        let id = string_literal(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::String);
        assert_eq!(node.text(), Some("a'b"));
    }

    #[test]
    fn preserves_integer_lexeme() {
        let mut p = Parser::new("0x1F");
        let id = integer_literal(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::Integer);
        assert_eq!(node.text(), Some("0x1F"));
    }

    #[test]
    fn huge_integer_is_an_error_leaf() {
        let mut p = Parser::new("99999999999999999999999999999");
        let id = integer_literal(&mut p);
        assert_eq!(p.arena.get(id).kind(), NodeKind::Error);
    }

    #[test]
    fn decodes_backtick_identifier() {
        let mut p = Parser::new("`my var`");
        let id = identifier(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::Identifier);
        assert_eq!(node.text(), Some("my var"));
    }

    #[test]
    fn parameter_strips_leading_dollar() {
        let mut p = Parser::new("$1");
        let id = parameter(&mut p);
        assert_eq!(p.arena.get(id).text(), Some("1"));
    }
}
