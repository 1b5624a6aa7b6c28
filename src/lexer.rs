//! Tokenizer shared by the grammar engine (C6) and the quick segmenter (C9).
//!
//! Tokenizes eagerly into a flat `Vec<Token>`, the way the teacher's own
//! lexer produces a token vector up front rather than lexing on demand —
//! backtracking in the grammar engine just rewinds an index into this
//! vector instead of re-scanning characters.
//!
//! Keywords are not a distinct token kind: `MATCH`, `RETURN`, and friends
//! come back as plain `Identifier` tokens, and grammar rules match on their
//! (case-insensitive) text. Cypher keywords aren't reserved words — `count`
//! is both a function name and, in older dialects, a clause — so baking
//! them into the lexer would just move the same text comparison one layer
//! down for no benefit.

use crate::position::{InputPosition, InputRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Parameter,
    StringLiteral,
    Integer,
    Float,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    DotDot,
    Pipe,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    /// `+=`, `SET`'s "merge these properties in" operator.
    PlusEq,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    RegexEq,
    Whitespace,
    LineComment,
    BlockComment,
    /// A byte the lexer couldn't classify; carried through as a token so
    /// the grammar engine can report it positionally instead of the lexer
    /// silently swallowing it.
    Unknown,
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: InputRange,
    pub text: String,
}

impl Token {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Case-insensitive comparison against a keyword spelling, since Cypher
    /// keywords aren't case sensitive (`match`/`MATCH`/`Match` are equal).
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(keyword)
    }
}

pub fn tokenize(text: &str, initial: InputPosition) -> Vec<Token> {
    let mut cursor = crate::input::Cursor::new(text, initial);
    let mut tokens = Vec::new();
    while !cursor.is_eof() {
        tokens.push(next_token(&mut cursor));
    }
    let eof_pos = cursor.position();
    tokens.push(Token {
        kind: TokenKind::Eof,
        range: InputRange::new(eof_pos, eof_pos),
        text: String::new(),
    });
    tokens
}

fn next_token(cursor: &mut crate::input::Cursor<'_>) -> Token {
    let start = cursor.position();
    let c = cursor.peek().expect("next_token called at EOF");

    let kind = match c {
        c if is_whitespace(c) => {
            while cursor.peek().map(is_whitespace).unwrap_or(false) {
                cursor.bump();
            }
            TokenKind::Whitespace
        }
        '/' if cursor.peek_at(1) == Some('/') => {
            cursor.bump_n(2);
            while cursor.peek().map(|c| c != '\n').unwrap_or(false) {
                cursor.bump();
            }
            TokenKind::LineComment
        }
        '/' if cursor.peek_at(1) == Some('*') => {
            cursor.bump_n(2);
            loop {
                if cursor.is_eof() {
                    break;
                }
                if cursor.starts_with("*/") {
                    cursor.bump_n(2);
                    break;
                }
                cursor.bump();
            }
            TokenKind::BlockComment
        }
        '"' | '\'' => {
            lex_string(cursor, c);
            TokenKind::StringLiteral
        }
        '`' => {
            lex_escaped_identifier(cursor);
            TokenKind::Identifier
        }
        c if is_ident_start(c) => {
            cursor.bump();
            while cursor.peek().map(is_ident_continue).unwrap_or(false) {
                cursor.bump();
            }
            TokenKind::Identifier
        }
        '$' => {
            cursor.bump();
            while cursor.peek().map(is_ident_continue).unwrap_or(false) {
                cursor.bump();
            }
            TokenKind::Parameter
        }
        c if c.is_ascii_digit() => {
            lex_number(cursor);
            let end = cursor.position();
            let text = cursor.full_text()
                [start.offset - cursor.initial_offset()..end.offset - cursor.initial_offset()]
                .to_string();
            return Token {
                kind: classify_number(&text),
                range: InputRange::new(start, end),
                text,
            };
        }
        '(' => single(cursor, TokenKind::LParen),
        ')' => single(cursor, TokenKind::RParen),
        '[' => single(cursor, TokenKind::LBracket),
        ']' => single(cursor, TokenKind::RBracket),
        '{' => single(cursor, TokenKind::LBrace),
        '}' => single(cursor, TokenKind::RBrace),
        ',' => single(cursor, TokenKind::Comma),
        ':' => single(cursor, TokenKind::Colon),
        ';' => single(cursor, TokenKind::Semicolon),
        '|' => single(cursor, TokenKind::Pipe),
        '+' if cursor.peek_at(1) == Some('=') => {
            cursor.bump_n(2);
            TokenKind::PlusEq
        }
        '+' => single(cursor, TokenKind::Plus),
        '-' => single(cursor, TokenKind::Minus),
        '*' => single(cursor, TokenKind::Star),
        '/' => single(cursor, TokenKind::Slash),
        '%' => single(cursor, TokenKind::Percent),
        '^' => single(cursor, TokenKind::Caret),
        '.' if cursor.peek_at(1) == Some('.') => {
            cursor.bump_n(2);
            TokenKind::DotDot
        }
        '.' => single(cursor, TokenKind::Dot),
        '<' if cursor.peek_at(1) == Some('>') => {
            cursor.bump_n(2);
            TokenKind::Neq
        }
        '<' if cursor.peek_at(1) == Some('=') => {
            cursor.bump_n(2);
            TokenKind::Lte
        }
        '<' => single(cursor, TokenKind::Lt),
        '>' if cursor.peek_at(1) == Some('=') => {
            cursor.bump_n(2);
            TokenKind::Gte
        }
        '>' => single(cursor, TokenKind::Gt),
        '=' if cursor.peek_at(1) == Some('~') => {
            cursor.bump_n(2);
            TokenKind::RegexEq
        }
        '=' => single(cursor, TokenKind::Eq),
        '!' if cursor.peek_at(1) == Some('=') => {
            cursor.bump_n(2);
            TokenKind::Neq
        }
        _ => {
            cursor.bump();
            TokenKind::Unknown
        }
    };

    let end = cursor.position();
    let text = cursor.full_text()
        [start.offset - cursor.initial_offset()..end.offset - cursor.initial_offset()]
        .to_string();
    Token {
        kind,
        range: InputRange::new(start, end),
        text,
    }
}

fn single(cursor: &mut crate::input::Cursor<'_>, kind: TokenKind) -> TokenKind {
    cursor.bump();
    kind
}

fn lex_string(cursor: &mut crate::input::Cursor<'_>, quote: char) {
    cursor.bump();
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

fn lex_escaped_identifier(cursor: &mut crate::input::Cursor<'_>) {
    cursor.bump();
    while let Some(c) = cursor.peek() {
        cursor.bump();
        if c == '`' {
            break;
        }
    }
}

fn lex_number(cursor: &mut crate::input::Cursor<'_>) {
    if cursor.starts_with("0x") || cursor.starts_with("0X") {
        cursor.bump_n(2);
        while cursor.peek().map(|c| c.is_ascii_hexdigit()).unwrap_or(false) {
            cursor.bump();
        }
        return;
    }
    while cursor.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        cursor.bump();
    }
    if cursor.peek() == Some('.') && cursor.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
        cursor.bump();
        while cursor.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            cursor.bump();
        }
    }
    if matches!(cursor.peek(), Some('e') | Some('E')) {
        let save = cursor.checkpoint();
        cursor.bump();
        if matches!(cursor.peek(), Some('+') | Some('-')) {
            cursor.bump();
        }
        if cursor.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            while cursor.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                cursor.bump();
            }
        } else {
            cursor.restore(save);
        }
    }
}

fn classify_number(text: &str) -> TokenKind {
    if text.contains('.') || text.contains('e') || text.contains('E') {
        TokenKind::Float
    } else {
        TokenKind::Integer
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{000B}' | '\u{000C}' | '\u{FEFF}')
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text, InputPosition::ZERO)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_simple_query() {
        let tokens = tokenize("MATCH (n) RETURN n", InputPosition::ZERO);
        let significant: Vec<_> = tokens
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(significant, vec!["MATCH", "(", "n", ")", "RETURN", "n", ""]);
    }

    #[test]
    fn classifies_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer, TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::Float, TokenKind::Eof]);
        assert_eq!(kinds("1e10"), vec![TokenKind::Float, TokenKind::Eof]);
    }

    #[test]
    fn tracks_ranges_across_lines() {
        let tokens = tokenize("MATCH\n(n)", InputPosition::ZERO);
        let paren = tokens.iter().find(|t| t.text == "(").unwrap();
        assert_eq!(paren.range.start.line, 2);
        assert_eq!(paren.range.start.column, 1);
    }

    #[test]
    fn comment_and_string_tokens() {
        assert_eq!(
            kinds("// hi\n\"s\""),
            vec![
                TokenKind::LineComment,
                TokenKind::Whitespace,
                TokenKind::StringLiteral,
                TokenKind::Eof
            ]
        );
    }
}
