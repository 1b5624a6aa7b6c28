//! Parse-result container (§4.7, C7).
//!
//! Field shape is kept 1:1 with the original's `cypher_parse_result`
//! (`elements`/`node_count`/`directives`/`errors`/`eof`, §B.2): this is the
//! one part of the crate where matching an external C struct layout, rather
//! than reaching for a more "Rust-native" shape, is the grounding source.

use crate::ast::{Arena, NodeId};
use crate::error::ParseError;
use crate::kind::{Category, NodeKind};
use crate::limit::LimitTracker;

/// Owns every node and diagnostic produced by one `parse`/`parse_stream`
/// call. Dropping a `ParseResult` frees its whole arena (§4.7's "destructor
/// recursively frees every owned node").
#[derive(Debug)]
pub struct ParseResult {
    arena: Arena,
    elements: Vec<NodeId>,
    errors: Vec<ParseError>,
    eof: bool,
    recursion: LimitTracker,
    token_limit: Option<LimitTracker>,
}

impl ParseResult {
    pub(crate) fn new(
        arena: Arena,
        elements: Vec<NodeId>,
        errors: Vec<ParseError>,
        eof: bool,
        recursion: LimitTracker,
        token_limit: Option<LimitTracker>,
    ) -> Self {
        Self {
            arena,
            elements,
            errors,
            eof,
            recursion,
            token_limit,
        }
    }

    /// Recursion-depth high-water mark for this parse (§D).
    pub fn recursion_limit(&self) -> LimitTracker {
        self.recursion
    }

    /// Token-count high-water mark, if a `token_limit` was configured (§D).
    pub fn token_limit(&self) -> Option<LimitTracker> {
        self.token_limit
    }

    /// Every top-level node in input order, including comments and `ERROR`
    /// nodes between directives.
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    pub fn element(&self, i: usize) -> Option<NodeId> {
        self.elements.get(i).copied()
    }

    /// The subset of `elements()` that are statements or commands — the
    /// "real" parsed content, as opposed to ambient comments/`ERROR` leaves.
    pub fn directives(&self) -> Vec<NodeId> {
        self.elements
            .iter()
            .copied()
            .filter(|&id| {
                let kind = self.arena.get(id).kind();
                kind == NodeKind::Statement
                    || kind == NodeKind::Command
                    || kind.is_instance_of(Category::SchemaCommand)
            })
            .collect()
    }

    pub fn directive(&self, i: usize) -> Option<NodeId> {
        self.directives().get(i).copied()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn error(&self, i: usize) -> Option<&ParseError> {
        self.errors.get(i)
    }

    /// Total reachable node count (§3 invariant 5).
    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    /// Whether parsing reached end-of-input (as opposed to being cut short
    /// by `ParseFlags::SINGLE`).
    pub fn eof(&self) -> bool {
        self.eof
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeBuilder, Payload};
    use crate::position::{InputPosition, InputRange};

    fn dummy_range() -> InputRange {
        InputRange::new(InputPosition::ZERO, InputPosition::ZERO)
    }

    #[test]
    fn node_count_matches_arena() {
        let mut arena = Arena::new();
        let mut builder = NodeBuilder::new(&mut arena);
        let leaf = builder.leaf(NodeKind::Identifier, dummy_range(), Payload::Text("n".into()));
        let result = ParseResult::new(arena, vec![leaf], Vec::new(), true, LimitTracker::new(500), None);
        assert_eq!(result.node_count(), 1);
        assert_eq!(result.elements().len(), 1);
        assert!(result.directives().is_empty());
    }
}
