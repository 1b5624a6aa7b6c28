//! AST node model (§3, §4.2, C2).
//!
//! Nodes live in a flat [`Arena`] rather than behind individual heap
//! allocations: a [`NodeId`] is just an index, cloning a subtree is copying a
//! slice, and freeing a whole parse result is dropping one `Vec`. This is the
//! idiomatic Rust answer to the original's per-node `malloc`/`free` pairs
//! (§4.2's "single free releases a node and its subtree" becomes "drop the
//! arena"), and the same shape the teacher's own CST uses under `rowan`'s
//! green tree — an index-addressed table of nodes rather than a web of
//! `Rc<RefCell<_>>` parent/child pointers.
//!
//! Named payload slots (`Match::pattern`, `Match::predicate`, ...) are never
//! a second copy of a child: they are accessor methods that index into
//! [`AstNode::children`], per the DESIGN NOTES' recommendation to treat
//! `children` as the single source of truth and payload as a view over it.

pub mod payload;

use crate::error::HostError;
use crate::kind::{Category, NodeKind};
use crate::operator::Operator;
use crate::position::InputRange;

pub use payload::{NodeFlags, Payload};

/// An index into an [`Arena`]. Stable for the lifetime of the arena that
/// produced it; never reused across arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The universal node shape (§3): a kind tag, the input range it covers, its
/// ordinal (assigned only after the whole tree is built, see
/// [`Arena::assign_ordinals`]), its structural children, and kind-specific
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    kind: NodeKind,
    range: InputRange,
    ordinal: u32,
    children: Vec<NodeId>,
    payload: Payload,
}

impl AstNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn range(&self) -> InputRange {
        self.range
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn nchildren(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, i: usize) -> Option<NodeId> {
        self.children.get(i).copied()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Whether `kind` is, or is a subtype of, `category` (§3 invariant,
    /// C3's `instanceof`).
    pub fn instanceof(&self, category: Category) -> bool {
        self.kind.is_instance_of(category)
    }

    pub fn text(&self) -> Option<&str> {
        self.payload.as_text()
    }

    pub fn operator(&self) -> Option<Operator> {
        self.payload.as_operator()
    }

    pub fn operators(&self) -> &[Operator] {
        self.payload.as_operators()
    }

    pub fn flags(&self) -> NodeFlags {
        self.payload.flags()
    }
}

/// Owns every node reachable from a parse; the sole owner of all AST memory
/// for one parse result (§5's "resource policy", §4.7).
///
/// Dropping the arena frees every node in it at once — there is no manual
/// destructor to call, unlike the original's per-kind `.free` vtable slot.
#[derive(Debug, Default, Clone)]
pub struct Arena {
    nodes: Vec<AstNode>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    /// Total reachable node count — equal to `self.nodes.len()` by
    /// construction, since every node is only ever created through
    /// [`Arena::alloc`] and every id handed out is retained by some parent's
    /// `children` or the top-level element list (§3 invariant 5).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a node with no child-kind validation. Used for leaves and by
    /// [`NodeBuilder`], which is the validated entry point grammar actions
    /// should use instead.
    fn alloc(&mut self, kind: NodeKind, range: InputRange, children: Vec<NodeId>, payload: Payload) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode {
            kind,
            range,
            ordinal: 0,
            children,
            payload,
        });
        id
    }

    /// Deep-copy a subtree rooted at `id`, preserving payload-slot aliasing
    /// into the *new* children (§4.2's single clone operation).
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let node = self.get(id).clone();
        let new_children: Vec<NodeId> = node.children.iter().map(|&c| self.clone_subtree(c)).collect();
        self.alloc(node.kind, node.range, new_children, node.payload)
    }

    /// Depth-first left-to-right ordinal assignment over `roots`, run once
    /// after the whole tree is built (§4.2, §B.2a — ported from the
    /// original's post-pass `cypher_ast_set_ordinals`, not assigned during
    /// construction).
    pub fn assign_ordinals(&mut self, roots: &[NodeId], initial_ordinal: u32) {
        let mut next = initial_ordinal;
        for &root in roots {
            self.assign_ordinals_rec(root, &mut next);
        }
    }

    fn assign_ordinals_rec(&mut self, id: NodeId, next: &mut u32) {
        self.nodes[id.index()].ordinal = *next;
        *next += 1;
        let children = self.nodes[id.index()].children.clone();
        for child in children {
            self.assign_ordinals_rec(child, next);
        }
    }

    /// Shift every range in the arena by `delta` offset/line/column — used
    /// when an `initial_position` other than `(1,1,0)` is configured, so the
    /// grammar can always build ranges against an unshifted cursor and the
    /// shift happens once at the very end (§4.1, §8 "stability under initial
    /// offset").
    pub fn shift_ranges(&mut self, delta: RangeShift) {
        for node in &mut self.nodes {
            node.range = delta.apply(node.range);
        }
    }
}

/// The delta between an unshifted cursor and a configured `initial_position`.
#[derive(Debug, Clone, Copy)]
pub struct RangeShift {
    pub line: i64,
    pub column_if_first_line: i64,
    pub offset: i64,
}

impl RangeShift {
    pub const NONE: RangeShift = RangeShift {
        line: 0,
        column_if_first_line: 0,
        offset: 0,
    };

    fn apply_position(&self, pos: crate::position::InputPosition) -> crate::position::InputPosition {
        let line = (pos.line as i64 + self.line) as u32;
        let column = if pos.line == 1 {
            (pos.column as i64 + self.column_if_first_line) as u32
        } else {
            pos.column
        };
        let offset = (pos.offset as i64 + self.offset) as usize;
        crate::position::InputPosition::new(line, column, offset)
    }

    fn apply(&self, range: InputRange) -> InputRange {
        InputRange::new(self.apply_position(range.start), self.apply_position(range.end))
    }
}

/// The validated entry point for grammar actions: wraps an [`Arena`] and
/// checks every child against the kind it's being attached under before
/// allocating the parent (§3 invariant 3, §7 "constructors validate child
/// kinds").
pub struct NodeBuilder<'a> {
    arena: &'a mut Arena,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(arena: &'a mut Arena) -> Self {
        Self { arena }
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        self.arena
    }

    /// A leaf node: no children, just payload (identifiers, literals,
    /// labels, comments, ERROR nodes, ...).
    pub fn leaf(&mut self, kind: NodeKind, range: InputRange, payload: Payload) -> NodeId {
        debug_assert!(
            leaf_kinds().contains(&kind),
            "{kind:?} constructed as a leaf but isn't one"
        );
        self.arena.alloc(kind, range, Vec::new(), payload)
    }

    /// A structural node with validated children. Returns
    /// [`HostError::InvalidChildKind`] if any child fails the precondition
    /// for `kind` (§7).
    pub fn node(
        &mut self,
        kind: NodeKind,
        range: InputRange,
        children: Vec<NodeId>,
        payload: Payload,
    ) -> Result<NodeId, HostError> {
        for &child in &children {
            let child_kind = self.arena.get(child).kind();
            if !child_allowed(kind, child_kind) {
                return Err(HostError::InvalidChildKind {
                    parent: kind.name(),
                    child: child_kind.name(),
                });
            }
        }
        Ok(self.arena.alloc(kind, range, children, payload))
    }

    /// Like [`NodeBuilder::node`] but for internal invariants the grammar
    /// itself already guarantees (e.g. an operator node built directly from
    /// freshly-parsed operand expressions) — skips the check rather than
    /// plumbing a `Result` through every call site that cannot fail.
    pub fn node_unchecked(
        &mut self,
        kind: NodeKind,
        range: InputRange,
        children: Vec<NodeId>,
        payload: Payload,
    ) -> NodeId {
        self.arena.alloc(kind, range, children, payload)
    }
}

/// Leaf kinds: own text/payload, never structural children.
fn leaf_kinds() -> &'static [NodeKind] {
    use NodeKind::*;
    &[
        Identifier, Parameter, String, Integer, Float, True, False, Null, Label, RelType,
        PropName, FunctionName, IndexName, ProcName, LineComment, BlockComment, Error,
    ]
}

/// Child-kind precondition table (§3 invariant 3, §7). Grouped by parent
/// kind; anything not listed here has no constraint beyond "must be a node
/// id that exists" — most of those are either structurally homogeneous
/// (a `Query`'s children are always clauses, checked by the grammar's own
/// dispatch, not duplicated here) or position-only containers like
/// `Statement`/`Command` whose children are validated by the grammar that
/// assembles them one option/argument at a time.
fn child_allowed(parent: NodeKind, child: NodeKind) -> bool {
    use Category::*;
    use NodeKind::*;
    match parent {
        // MATCH/CREATE's comma-separated pattern list is wrapped in one
        // `Pattern` node (`cypher_ast_match`'s single `pattern` argument);
        // MERGE takes its one path bare (`cypher_ast_merge`'s `path`
        // argument), so it keeps the unwrapped shape.
        Match => {
            child == Pattern
                || child.is_instance_of(MatchHint)
                || child.is_instance_of(Expression)
                || matches!(child, LineComment | BlockComment)
        }
        Merge => {
            matches!(child, PatternPath | NamedPath | ShortestPath)
                || child.is_instance_of(MergeAction)
                || matches!(child, LineComment | BlockComment)
        }
        Create => child == Pattern || matches!(child, LineComment | BlockComment),
        Pattern => matches!(child, PatternPath | NamedPath | ShortestPath),
        Set => child.is_instance_of(SetItem) || matches!(child, LineComment | BlockComment),
        Remove => child.is_instance_of(RemoveItem) || matches!(child, LineComment | BlockComment),
        OnMatch | OnCreate => child == Set || matches!(child, LineComment | BlockComment),
        Start => child.is_instance_of(StartPoint) || child.is_instance_of(Expression),
        Statement => {
            child.is_instance_of(StatementOption)
                || matches!(child, Query)
                || child.is_instance_of(SchemaCommand)
                || matches!(child, LineComment | BlockComment)
        }
        Query => {
            child.is_instance_of(QueryClause) || matches!(child, LineComment | BlockComment)
        }
        NodePattern => matches!(child, Identifier | Label) || child.is_instance_of(Expression),
        RelPattern => {
            matches!(child, Identifier | RelType | Range) || child.is_instance_of(Expression)
        }
        PatternPath => matches!(child, NodePattern | RelPattern),
        NamedPath => matches!(child, Identifier | PatternPath | ShortestPath),
        ShortestPath => matches!(child, PatternPath),
        Collection | Map => child.is_instance_of(Expression) || child == PropName,
        Comparison | BinaryOperator | UnaryOperator | ApplyOperator | ApplyAllOperator
        | PropertyOperator | SubscriptOperator | SliceOperator | LabelsOperator => {
            child.is_instance_of(Expression) || matches!(child, PropName | Label | FunctionName)
        }
        ListComprehension | Filter | Extract | Reduce | All | Any | Single | None_ => {
            child.is_instance_of(Expression) || matches!(child, Identifier | PatternPath)
        }
        Case => child.is_instance_of(Expression),
        Projection => child.is_instance_of(Expression) || child == Identifier,
        OrderBy => child == SortItem,
        SortItem => child.is_instance_of(Expression),
        Return | With => {
            matches!(child, Projection | OrderBy)
                || child.is_instance_of(Expression)
                || matches!(child, LineComment | BlockComment)
        }
        Unwind => child.is_instance_of(Expression) || child == Identifier,
        Foreach => child == Identifier || child.is_instance_of(Expression) || child.is_instance_of(QueryClause),
        LoadCsv => child.is_instance_of(Expression) || child == Identifier,
        Union => matches!(child, Query),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{InputPosition, InputRange};

    fn dummy_range() -> InputRange {
        InputRange::new(InputPosition::ZERO, InputPosition::ZERO)
    }

    #[test]
    fn rejects_wrong_kind_children() {
        let mut arena = Arena::new();
        let mut builder = NodeBuilder::new(&mut arena);
        let ident = builder.leaf(NodeKind::Identifier, dummy_range(), Payload::Text("n".into()));
        let result = builder.node(NodeKind::PatternPath, dummy_range(), vec![ident], Payload::None);
        assert!(result.is_err());
    }

    #[test]
    fn ordinal_assignment_is_depth_first() {
        let mut arena = Arena::new();
        let mut builder = NodeBuilder::new(&mut arena);
        let leaf_a = builder.leaf(NodeKind::Identifier, dummy_range(), Payload::Text("a".into()));
        let leaf_b = builder.leaf(NodeKind::Identifier, dummy_range(), Payload::Text("b".into()));
        let parent = builder
            .node(NodeKind::Collection, dummy_range(), vec![leaf_a, leaf_b], Payload::None)
            .unwrap();
        arena.assign_ordinals(&[parent], 0);
        assert_eq!(arena.get(parent).ordinal(), 0);
        assert_eq!(arena.get(leaf_a).ordinal(), 1);
        assert_eq!(arena.get(leaf_b).ordinal(), 2);
    }

    #[test]
    fn clone_preserves_shape() {
        let mut arena = Arena::new();
        let mut builder = NodeBuilder::new(&mut arena);
        let leaf = builder.leaf(NodeKind::Identifier, dummy_range(), Payload::Text("a".into()));
        let parent = builder
            .node(NodeKind::Collection, dummy_range(), vec![leaf], Payload::None)
            .unwrap();
        let cloned = arena.clone_subtree(parent);
        assert_ne!(cloned, parent);
        assert_eq!(arena.get(cloned).nchildren(), 1);
        assert_eq!(arena.get(arena.get(cloned).child(0).unwrap()).text(), Some("a"));
    }
}
