//! Grammar engine (§4.6, C6).
//!
//! A hand-written recursive-descent recognizer over a flat token vector,
//! built the way the teacher's own `Parser` is: a `peek`/`bump` cursor, a
//! stack of in-progress nodes pushed by `start_node` and popped by
//! `finish_node`, and an error list fed by `err`/`push_err`. The PEG
//! "ordered alternative with backtracking" character of the grammar shows up
//! as ordinary `match`es on keyword text (Cypher's clause keywords are
//! mutually exclusive at the position they appear) plus a handful of
//! explicit checkpoint/restore spots where two rules really do compete for
//! the same prefix (§4.6, DESIGN NOTES).
//!
//! Two independent axes are layered in here rather than being a single
//! all-at-once traversal, mirroring the teacher's `builder`/`errors`/
//! `recursion_limit` triad:
//! - [`Frame`] stack + [`crate::ast::Arena`] build the tree;
//! - [`crate::error::ErrorTracker`] accumulates diagnostics as alternatives
//!   are tried and abandoned;
//! - [`crate::limit::LimitTracker`] bounds recursion depth so adversarial
//!   input can't blow the stack.

pub mod grammar;

use std::collections::HashMap;

use crate::ast::{Arena, NodeBuilder, NodeFlags, NodeId, Payload};
use crate::error::{escape_char, ErrorTracker, HostError, ParseError};
use crate::kind::NodeKind;
use crate::lexer::{self, Token, TokenKind};
use crate::limit::LimitTracker;
use crate::operator::Operator;
use crate::position::{InputPosition, InputRange};
use crate::render::ColorScheme;
use crate::result::ParseResult;

/// Parse flags (§6): a hand-rolled bitset newtype rather than a `bitflags!`
/// dependency, mirroring how the teacher exposes `TokenKind`/`SyntaxKind` as
/// plain `#[repr(u16)]` enums for small closed sets (§A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseFlags(u32);

impl ParseFlags {
    pub const DEFAULT: ParseFlags = ParseFlags(0);
    pub const SINGLE: ParseFlags = ParseFlags(1 << 0);
    pub const ONLY_STATEMENTS: ParseFlags = ParseFlags(1 << 1);
    pub const ONLY_PARAMETERS: ParseFlags = ParseFlags(1 << 2);

    pub fn contains(self, other: ParseFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: ParseFlags) -> ParseFlags {
        ParseFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for ParseFlags {
    type Output = ParseFlags;
    fn bitor(self, rhs: ParseFlags) -> ParseFlags {
        self.union(rhs)
    }
}

/// Configuration consumed by the engine (§6).
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub initial_position: InputPosition,
    pub initial_ordinal: u32,
    pub error_colorization: ColorScheme,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            initial_position: InputPosition::ZERO,
            initial_ordinal: 0,
            error_colorization: ColorScheme::PLAIN,
        }
    }
}

/// A node under construction: everything parsed between `start_node` and the
/// matching `finish_node` is collected here, including comments encountered
/// along the way (§3 invariant 4 — comments attach to the innermost
/// enclosing construct without disturbing payload slot indexing, since they
/// land in `children` just like any other sub-node).
struct Frame {
    kind: NodeKind,
    start: InputPosition,
    children: Vec<NodeId>,
}

/// The recursive-descent parser. One instance per top-level `parse` call;
/// all state (cursor, arena, trackers) lives here so concurrent parses never
/// share mutable state (§5).
pub struct Parser<'input> {
    /// The untouched source text, kept alongside the pre-lexed token stream
    /// so command parsing (§4.6) can re-scan raw characters directly —
    /// command syntax (backslash escapes, quote spanning, line
    /// continuation) doesn't follow the same rules as expression
    /// tokenization, so pretending commands are made of ordinary tokens
    /// would just reinvent a second incompatible lexer inline.
    source: &'input str,
    tokens: Vec<Token>,
    /// Index into `tokens`, including trivia — advanced by [`Parser::bump`].
    idx: usize,
    arena: Arena,
    frames: Vec<Frame>,
    top_level: Vec<NodeId>,
    tracker: ErrorTracker,
    recursion: LimitTracker,
    token_limit: Option<LimitTracker>,
    config: ParserConfig,
    flags: ParseFlags,
    /// Packrat memo for the expression rule only (DESIGN NOTES: "memoise at
    /// least each precedence level" — the one rule in this grammar that
    /// genuinely explores overlapping alternatives at a single position,
    /// e.g. list-literal vs. list-comprehension vs. subscript-looking
    /// prefixes).
    expr_memo: HashMap<usize, Option<(NodeId, usize)>>,
}

const DEFAULT_RECURSION_LIMIT: usize = 500;

impl<'input> Parser<'input> {
    pub fn new(input: &'input str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &'input str, config: ParserConfig) -> Self {
        let tokens = lexer::tokenize(input, config.initial_position);
        Self {
            source: input,
            tokens,
            idx: 0,
            arena: Arena::new(),
            frames: Vec::new(),
            top_level: Vec::new(),
            tracker: ErrorTracker::new(),
            recursion: LimitTracker::new(DEFAULT_RECURSION_LIMIT),
            token_limit: None,
            config,
            flags: ParseFlags::DEFAULT,
            expr_memo: HashMap::new(),
        }
    }

    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion = LimitTracker::new(limit);
        self
    }

    pub fn token_limit(mut self, limit: usize) -> Self {
        self.token_limit = Some(LimitTracker::new(limit));
        self
    }

    pub fn flags(mut self, flags: ParseFlags) -> Self {
        self.flags = flags;
        self
    }

    // -- cursor -----------------------------------------------------------

    /// The next significant (non-trivia) token, without consuming it.
    fn peek(&self) -> &Token {
        let mut i = self.idx;
        while self.tokens[i].kind.is_trivia() {
            i += 1;
        }
        &self.tokens[i]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn at_eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn at_keyword(&self, kw: &str) -> bool {
        self.peek().is_keyword(kw)
    }

    fn current_range(&self) -> InputRange {
        self.peek().range
    }

    /// The `n`-th significant token ahead of the cursor (`n == 0` is
    /// [`Parser::peek`]), without consuming anything — used by the handful
    /// of two-keyword lookaheads (`STARTS WITH`, `IS NOT NULL`, `UNION ALL`)
    /// and by list-comprehension-vs-collection disambiguation.
    fn peek_nth(&self, n: usize) -> &Token {
        let mut i = self.idx;
        let mut seen = 0;
        loop {
            while i < self.tokens.len() - 1 && self.tokens[i].kind.is_trivia() {
                i += 1;
            }
            if seen == n || self.tokens[i].kind == TokenKind::Eof {
                return &self.tokens[i];
            }
            i += 1;
            seen += 1;
        }
    }

    fn at_keyword_nth(&self, n: usize, kw: &str) -> bool {
        let token = self.peek_nth(n);
        token.kind == TokenKind::Identifier && token.text.eq_ignore_ascii_case(kw)
    }

    /// The verbatim source text covering `range`, undoing the
    /// `initial_position` shift — used to synthesize a projection's implicit
    /// alias from the expression's own source text (§8 scenario 3).
    fn text_of(&self, range: InputRange) -> &'input str {
        let base = self.config.initial_position.offset;
        &self.source[range.start.offset - base..range.end.offset - base]
    }

    fn current_pos(&self) -> InputPosition {
        self.peek().range.start
    }

    /// Consume one significant token, filing any comments skipped along the
    /// way as children of the innermost open frame (or as standalone
    /// top-level elements if none is open).
    fn bump(&mut self) -> Token {
        loop {
            let token = self.tokens[self.idx].clone();
            self.idx += 1;
            match token.kind {
                TokenKind::Whitespace => continue,
                TokenKind::LineComment | TokenKind::BlockComment => {
                    let kind = if token.kind == TokenKind::LineComment {
                        NodeKind::LineComment
                    } else {
                        NodeKind::BlockComment
                    };
                    let text = comment_body(&token);
                    let id = self.arena_mut().alloc_leaf(kind, token.range, Payload::Text(text));
                    self.push_child(id);
                    continue;
                }
                _ => return token,
            }
        }
    }

    fn arena_mut(&mut self) -> LeafAllocator<'_> {
        LeafAllocator { arena: &mut self.arena }
    }

    fn push_child(&mut self, id: NodeId) {
        match self.frames.last_mut() {
            Some(frame) => frame.children.push(id),
            None => self.top_level.push(id),
        }
    }

    /// Pull the most recently attached child back out of the innermost open
    /// frame (or the top-level list) — used by `UNION`, which only learns
    /// after the fact that the `Query` it just finished belongs under a new
    /// `Union` node rather than as a sibling of it.
    fn pop_last_child(&mut self) -> NodeId {
        match self.frames.last_mut() {
            Some(frame) => frame.children.pop().expect("pop_last_child on an empty frame"),
            None => self.top_level.pop().expect("pop_last_child on an empty top level"),
        }
    }

    // -- node construction --------------------------------------------------

    fn start_node(&mut self, kind: NodeKind) {
        let start = self.current_pos();
        self.frames.push(Frame {
            kind,
            start,
            children: Vec::new(),
        });
    }

    /// Close the innermost frame, validating its children against `kind`
    /// and attaching the resulting node to the new innermost frame (or the
    /// top-level list).
    fn finish_node(&mut self, payload: Payload) -> Result<NodeId, HostError> {
        let frame = self.frames.pop().expect("finish_node without start_node");
        let end = self.last_end_pos();
        let range = InputRange::new(frame.start, end);
        let mut builder = NodeBuilder::new(&mut self.arena);
        let id = builder.node(frame.kind, range, frame.children, payload)?;
        self.push_child(id);
        Ok(id)
    }

    /// Close the innermost frame like [`Parser::finish_node`], but panics on
    /// a child-kind violation instead of returning a `Result` — every
    /// grammar rule is expected to only ever attach children that satisfy
    /// the kind it closes, so a violation here is a bug in this crate's own
    /// grammar, not a diagnostic about the user's input (§3 invariant 3 is
    /// enforced by construction).
    fn end_node(&mut self, payload: Payload) -> NodeId {
        self.finish_node(payload)
            .expect("grammar attached a child of the wrong kind")
    }

    /// Build a node directly from already-parsed children rather than an
    /// open frame — used by the expression grammar's operator construction,
    /// where the operands already exist as sibling node ids by the time the
    /// operator is recognized, so there is no frame to close.
    fn build_node(&mut self, kind: NodeKind, range: InputRange, children: Vec<NodeId>, payload: Payload) -> NodeId {
        let mut builder = NodeBuilder::new(&mut self.arena);
        builder
            .node(kind, range, children, payload)
            .expect("grammar attached a child of the wrong kind")
    }

    /// Abort the innermost frame without validating or keeping its shape —
    /// used when a grammar rule bails out partway through (its children,
    /// including any comments already attached, are re-parented onto the
    /// enclosing frame so they aren't silently dropped).
    fn abandon_node(&mut self) {
        let frame = self.frames.pop().expect("abandon_node without start_node");
        for child in frame.children {
            self.push_child(child);
        }
    }

    /// Close the innermost frame with an explicit end position rather than
    /// deriving one from the token cursor — used by [`grammar::directive::command`],
    /// which advances the raw character cursor instead of `self.idx` while
    /// it's scanning.
    fn close_frame(&mut self, end: InputPosition, payload: Payload) -> Result<NodeId, HostError> {
        let frame = self.frames.pop().expect("close_frame without start_node");
        let range = InputRange::new(frame.start, end);
        let mut builder = NodeBuilder::new(&mut self.arena);
        let id = builder.node(frame.kind, range, frame.children, payload)?;
        self.push_child(id);
        Ok(id)
    }

    /// The raw byte offset of the current position into `self.source`
    /// (undoing the `initial_position` shift applied to reported ranges).
    fn raw_offset(&self) -> usize {
        self.current_pos().offset - self.config.initial_position.offset
    }

    /// A character cursor over the unconsumed source text, positioned where
    /// the token cursor currently sits, for grammar rules that need to scan
    /// raw bytes instead of pre-lexed tokens (command syntax, §4.6).
    fn raw_cursor(&self) -> crate::input::Cursor<'input> {
        crate::input::Cursor::new(&self.source[self.raw_offset()..], self.current_pos())
    }

    /// Fast-forward the token cursor past every pre-lexed token that falls
    /// entirely before `raw_offset` (an absolute offset into `self.source`,
    /// already shifted by `initial_position`) — used after raw character
    /// scanning to resynchronize with the ordinary token stream, regardless
    /// of how the generic lexer happened to chunk the bytes just consumed.
    fn sync_to_offset(&mut self, offset: usize) {
        while self.tokens[self.idx].range.start.offset < offset {
            self.idx += 1;
        }
    }

    fn last_end_pos(&self) -> InputPosition {
        let mut i = self.idx;
        while i > 0 && self.tokens[i - 1].kind.is_trivia() {
            i -= 1;
        }
        if i == 0 {
            self.config.initial_position
        } else {
            self.tokens[i - 1].range.end
        }
    }

    fn leaf(&mut self, kind: NodeKind, payload: Payload) -> NodeId {
        let token = self.bump();
        let mut builder = NodeBuilder::new(&mut self.arena);
        let id = builder.leaf(kind, token.range, payload);
        self.push_child(id);
        id
    }

    /// Allocate a leaf node with an explicit range rather than the current
    /// token's — used by rules that scan raw characters instead of tokens
    /// (command arguments, §4.6) and so must supply their own range. Does
    /// not attach the leaf as a child; callers do that with [`Parser::push_child`].
    fn alloc_leaf(&mut self, kind: NodeKind, range: InputRange, payload: Payload) -> NodeId {
        self.arena_mut().alloc_leaf(kind, range, payload)
    }

    // -- errors -------------------------------------------------------------

    /// Record a failed expectation at the current position (§4.5).
    fn expected(&mut self, label: impl Into<String>) {
        let pos = self.current_pos();
        let next_char = if self.at_eof() { None } else { self.peek().text.chars().next() };
        self.tracker.record(pos, next_char, label.into());
    }

    fn expect_keyword(&mut self, kw: &'static str) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            self.expected(format!("'{}'", kw.to_ascii_uppercase()));
            false
        }
    }

    fn expect_token(&mut self, kind: TokenKind, label: &'static str) -> bool {
        if self.peek_kind() == kind {
            self.bump();
            true
        } else {
            self.expected(label);
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_token(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    // -- backtracking ---------------------------------------------------

    /// Snapshot enough state to retry an alternative from the same
    /// position: token cursor and frame depth (frames opened since the mark
    /// must have been closed or abandoned before restoring).
    fn mark(&self) -> usize {
        self.idx
    }

    fn restore(&mut self, mark: usize) {
        self.idx = mark;
    }

    /// Recursion-depth guard: call at the top of any grammar function that
    /// recurses into itself or a mutually-recursive peer (expression,
    /// pattern, comprehension bodies). Returns `false` (and files a
    /// diagnostic) once the limit is exceeded.
    #[must_use]
    fn enter(&mut self) -> bool {
        self.recursion.consume();
        if self.recursion.limited() {
            let pos = self.current_pos();
            self.tracker
                .emit(ParseError::new(pos, "recursion limit exceeded"));
            false
        } else {
            true
        }
    }

    fn exit(&mut self) {
        self.recursion.release();
    }

    // -- entry points -------------------------------------------------------

    /// Parse a full document: zero or more directives (statements or, when
    /// `ONLY_STATEMENTS` is unset, commands), with statement-level error
    /// recovery between them (§4.6's top-level state machine).
    pub fn parse(mut self) -> ParseResult {
        loop {
            self.skip_leading_trivia();
            if self.at_eof() {
                break;
            }
            let recovered = grammar::directive::directive(&mut self);
            if !recovered {
                self.recover();
            }
            if self.flags.contains(ParseFlags::SINGLE) {
                break;
            }
        }
        self.finish()
    }

    /// Consume any comments/whitespace sitting before the next directive,
    /// promoting comments to top-level elements.
    fn skip_leading_trivia(&mut self) {
        while matches!(
            self.tokens.get(self.idx).map(|t| t.kind),
            Some(TokenKind::Whitespace) | Some(TokenKind::LineComment) | Some(TokenKind::BlockComment)
        ) {
            self.bump_trivia_only();
        }
    }

    fn bump_trivia_only(&mut self) {
        let token = self.tokens[self.idx].clone();
        self.idx += 1;
        match token.kind {
            TokenKind::LineComment | TokenKind::BlockComment => {
                let kind = if token.kind == TokenKind::LineComment {
                    NodeKind::LineComment
                } else {
                    NodeKind::BlockComment
                };
                let text = comment_body(&token);
                let id = self.arena_mut().alloc_leaf(kind, token.range, Payload::Text(text));
                self.top_level.push(id);
            }
            _ => {}
        }
    }

    /// On a statement-level syntax error, consume input up to the next `;`
    /// or end-of-input, emit an `ERROR` node spanning the consumed range,
    /// and reify a diagnostic (§4.6 recovery).
    fn recover(&mut self) {
        while !self.frames.is_empty() {
            self.abandon_node();
        }
        let start = self.current_pos();
        while !self.at_eof() && self.peek_kind() != TokenKind::Semicolon {
            self.bump();
        }
        let consumed_semicolon = self.eat_token(TokenKind::Semicolon);
        let end = if consumed_semicolon {
            self.last_end_pos()
        } else {
            self.current_pos()
        };
        let range = InputRange::new(start, end);
        let id = self.arena_mut().alloc_leaf(NodeKind::Error, range, Payload::None);
        self.top_level.push(id);
    }

    fn finish(mut self) -> ParseResult {
        let eof = self.at_eof();
        self.arena
            .assign_ordinals(&self.top_level, self.config.initial_ordinal);
        let errors = self
            .tracker
            .into_errors()
            .into_iter()
            .map(|e| self.with_context(e))
            .collect();
        ParseResult::new(self.arena, self.top_level, errors, eof, self.recursion, self.token_limit)
    }

    /// Attach a source-line context window to a diagnostic that doesn't
    /// already carry one (§4.5's "context string").
    fn with_context(&self, error: ParseError) -> ParseError {
        if error.context().is_some() {
            return error;
        }
        let (context, offset) = context_window(self.source, error.position());
        ParseError::with_context(error.position(), error.message(), context, offset)
    }
}

/// Comments own their text without the leading `//`/`/* */` delimiters
/// (§3's leaf-string kinds).
fn comment_body(token: &Token) -> String {
    match token.kind {
        TokenKind::LineComment => token.text.trim_start_matches("//").to_string(),
        TokenKind::BlockComment => token
            .text
            .trim_start_matches("/*")
            .trim_end_matches("*/")
            .to_string(),
        _ => token.text.clone(),
    }
}

/// A narrow helper so grammar modules can allocate leaves without going
/// through a whole [`NodeBuilder`] borrow when no child-kind validation is
/// needed (leaves never have children).
struct LeafAllocator<'a> {
    arena: &'a mut Arena,
}

impl<'a> LeafAllocator<'a> {
    fn alloc_leaf(&mut self, kind: NodeKind, range: InputRange, payload: Payload) -> NodeId {
        let mut builder = NodeBuilder::new(self.arena);
        builder.leaf(kind, range, payload)
    }
}

pub(crate) use self::helpers::*;

/// Small shared helpers used across `grammar::*` submodules, kept in one
/// place so each grammar file reads as pure Cypher syntax rather than
/// bookkeeping.
mod helpers {
    use super::*;

    /// Describe the token at the current position for diagnostics that want
    /// the literal found-text rather than just a label (used by
    /// `ParseError`'s "found" rendering in tests and the `context()`
    /// window).
    pub(crate) fn describe_token(token: &Token) -> String {
        if token.kind == TokenKind::Eof {
            "<end of input>".to_string()
        } else {
            token
                .text
                .chars()
                .next()
                .map(escape_char)
                .unwrap_or_else(|| "<end of input>".to_string())
        }
    }

    /// Build a source-line context window for a diagnostic at `pos` within
    /// `source`, with the byte offset of `pos` inside that line — used when
    /// turning a raw `ParseError` into an editor-friendly one via
    /// `ParseError::with_context` (§4.5).
    pub(crate) fn context_window(source: &str, pos: InputPosition) -> (String, usize) {
        let line_start = source[..pos.offset.min(source.len())]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let line_end = source[pos.offset.min(source.len())..]
            .find('\n')
            .map(|i| pos.offset + i)
            .unwrap_or(source.len());
        (source[line_start..line_end].to_string(), pos.offset - line_start)
    }

    /// A single-operand payload used by unary/postfix operator nodes:
    /// operator tag plus the operand already pushed as the sole child.
    pub(crate) fn operator_payload(op: Operator) -> Payload {
        Payload::Operator(op)
    }

    pub(crate) fn flags_payload(flags: NodeFlags) -> Payload {
        Payload::Flags(flags)
    }
}
