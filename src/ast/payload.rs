//! Kind-specific node data (§3, C2).
//!
//! Structural shape (which clause has which children, in which order) is
//! carried by [`super::AstNode::children`] alone — order is the schema.
//! `Payload` only carries what children can't: leaf text, the concrete
//! operator a `BinaryOperator`/`UnaryOperator`/`Comparison` node applies,
//! and the handful of boolean modifiers Cypher clauses carry (`DISTINCT`,
//! `OPTIONAL`, `DETACH`, ...). Where a payload field does reference another
//! node (e.g. the property-operator's property-name child), it stores the
//! same [`super::NodeId`] that also appears in `children` — aliasing, not a
//! second copy of the subtree.

use crate::operator::Operator;

/// Boolean modifiers on clause-shaped nodes. Stored as a bitset because
/// several clauses (`MATCH OPTIONAL`, `MERGE ... ON CREATE`) combine more
/// than one independently, and because it mirrors the `ParseFlags` bitset
/// shape used elsewhere in this crate (§A) rather than introducing a second
/// idiom for small, fixed modifier sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u32);

impl NodeFlags {
    pub const NONE: NodeFlags = NodeFlags(0);
    pub const DISTINCT: NodeFlags = NodeFlags(1 << 0);
    pub const OPTIONAL: NodeFlags = NodeFlags(1 << 1);
    pub const DETACH: NodeFlags = NodeFlags(1 << 2);
    pub const UNIQUE: NodeFlags = NodeFlags(1 << 3);
    pub const SINGLE: NodeFlags = NodeFlags(1 << 4);
    pub const REVERSE: NodeFlags = NodeFlags(1 << 5);
    /// `RelPattern` has no fixed direction (`-[...]-` rather than `-[...]->`
    /// or `<-[...]-`) — orthogonal to `REVERSE`, which only flips a fixed
    /// direction.
    pub const UNDIRECTED: NodeFlags = NodeFlags(1 << 6);
    /// A `RETURN`/`WITH` projection's trailing `*` (§B.2's `include_existing`)
    /// pulling every identifier already in scope into the result alongside
    /// any explicit items.
    pub const STAR: NodeFlags = NodeFlags(1 << 7);
    /// `LOAD CSV ... WITH HEADERS`.
    pub const HEADERS: NodeFlags = NodeFlags(1 << 8);
    /// `RelPattern`'s varlength `*` was followed by `..` — distinguishes the
    /// exact-length shorthand `*N` (one `Integer` child, no flag) from an
    /// open-ended range (`*N..`/`*..N`/`*..`), all of which need this flag
    /// to tell a lone bound apart from an exact length.
    pub const VARLENGTH: NodeFlags = NodeFlags(1 << 9);
    /// Paired with `VARLENGTH` when a `Range` has exactly one `Integer`
    /// child: set means that child is the *max* (`*..N`), unset means it's
    /// the *min* (`*N..`).
    pub const MIN_OPEN: NodeFlags = NodeFlags(1 << 10);
    /// A `SliceOperator` with exactly one index child: set means that child
    /// is the *upper* bound (`list[..n]`), unset means it's the *lower*
    /// bound (`list[n..]`) — the subscript analogue of `MIN_OPEN`.
    pub const MAX_OPEN: NodeFlags = NodeFlags(1 << 11);
    /// A `ListComprehension` carries a `WHERE` predicate in addition to its
    /// variable/source-list pair — the predicate, when present, is always
    /// the child right after the source list, before any projection
    /// expression.
    pub const HAS_PREDICATE: NodeFlags = NodeFlags(1 << 12);
    /// A `Case` has an explicit test expression (`CASE x WHEN ...` rather
    /// than the generic `CASE WHEN ... END` form) as its first child.
    pub const HAS_TEST: NodeFlags = NodeFlags(1 << 13);
    /// A `Case` has a trailing `ELSE` expression as its last child.
    pub const HAS_ELSE: NodeFlags = NodeFlags(1 << 14);
    /// `CALL proc YIELD *` — yield every result field rather than the
    /// explicit subset named by `Call`'s yield children.
    pub const ALL: NodeFlags = NodeFlags(1 << 15);
    /// A `SortItem`'s `DESC`/`DESCENDING` modifier (default is ascending).
    pub const DESCENDING: NodeFlags = NodeFlags(1 << 16);
    /// `RETURN`/`WITH` carries a `SKIP` expression among its children.
    pub const HAS_SKIP: NodeFlags = NodeFlags(1 << 17);
    /// `RETURN`/`WITH` carries a `LIMIT` expression among its children.
    pub const HAS_LIMIT: NodeFlags = NodeFlags(1 << 18);
    /// `WITH` carries a `WHERE` expression among its children.
    pub const HAS_WHERE: NodeFlags = NodeFlags(1 << 19);

    pub fn with(self, other: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | other.0)
    }

    pub fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Kind-specific data attached to an AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No data beyond kind + range + children: the common case for purely
    /// structural nodes (`Query`, `Match`, `Return`, `Projection`, ...).
    None,
    /// Verbatim source text for leaf tokens: identifiers, parameter names,
    /// string/number literals (kept as the original lexeme, §E), labels,
    /// reltypes, property/function/index/procedure names, command text,
    /// and comment bodies.
    Text(String),
    /// The operator a `UnaryOperator`/`BinaryOperator`/`Comparison`/
    /// `*Operator` node applies; its operands are this node's children.
    Operator(Operator),
    /// Boolean modifiers on an otherwise structural node.
    Flags(NodeFlags),
    /// A comparison chain's additional operators beyond the first
    /// (`a < b <= c` is one `Comparison` node with children `[a, b, c]`
    /// and operators `[LessThan, LessThanOrEqual]`).
    Operators(Vec<Operator>),
    /// `Call`'s split point between its argument children and its `YIELD`
    /// children — the first `Count(n)` children are arguments, the rest
    /// (if any) are yielded identifiers. Paired with `NodeFlags::ALL` for
    /// `YIELD *`, which needs a flag of its own since it contributes no
    /// children to count past the arguments.
    Count(u32, NodeFlags),
}

impl Payload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            Payload::Operator(op) => Some(*op),
            _ => None,
        }
    }

    pub fn as_operators(&self) -> &[Operator] {
        match self {
            Payload::Operators(ops) => ops,
            Payload::Operator(op) => std::slice::from_ref(op),
            _ => &[],
        }
    }

    pub fn flags(&self) -> NodeFlags {
        match self {
            Payload::Flags(flags) => *flags,
            Payload::Count(_, flags) => *flags,
            _ => NodeFlags::NONE,
        }
    }

    pub fn as_count(&self) -> Option<u32> {
        match self {
            Payload::Count(n, _) => Some(*n),
            _ => None,
        }
    }
}
