//! Node kind registry (§3, C3).
//!
//! `NodeKind` is the closed tag stamped on every AST node; it mirrors the
//! vtable list in the original implementation's `ast.h` one for one. A
//! handful of those vtables are abstract supertypes rather than concrete
//! node shapes (`cypher_query_clause_astnode_vt`, `cypher_expression_astnode_vt`,
//! and so on) — here that distinction is modeled as [`Category`] membership
//! rather than as separate enum variants, since an abstract supertype never
//! tags a real node on its own.

use std::fmt;

/// The concrete kind of an AST node.
///
/// Variants are grouped the way `ast.h` groups its vtable externs, not
/// alphabetically — that grouping is what [`NodeKind::categories`] encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum NodeKind {
    Statement,
    CypherOption,
    CypherOptionParam,
    ExplainOption,
    ProfileOption,
    UsingPeriodicCommit,
    CreateNodePropIndex,
    DropNodePropIndex,
    CreateNodePropConstraint,
    DropNodePropConstraint,
    CreateNodePropExistsConstraint,
    DropNodePropExistsConstraint,
    CreateRelPropConstraint,
    DropRelPropConstraint,
    Query,
    LoadCsv,
    Start,
    NodeIndexLookup,
    NodeIndexQuery,
    NodeIdLookup,
    AllNodesScan,
    RelIndexLookup,
    RelIndexQuery,
    RelIdLookup,
    AllRelsScan,
    Match,
    UsingIndex,
    UsingJoin,
    UsingScan,
    Merge,
    OnMatch,
    OnCreate,
    Create,
    Set,
    SetProperty,
    SetAllProperties,
    MergeProperties,
    SetLabels,
    Delete,
    Remove,
    RemoveLabels,
    RemoveProperty,
    Foreach,
    With,
    Unwind,
    Call,
    Return,
    Projection,
    OrderBy,
    SortItem,
    Union,
    UnaryOperator,
    BinaryOperator,
    Comparison,
    ApplyOperator,
    ApplyAllOperator,
    PropertyOperator,
    SubscriptOperator,
    SliceOperator,
    LabelsOperator,
    ListComprehension,
    Case,
    Filter,
    Extract,
    Reduce,
    All,
    Any,
    Single,
    None_,
    Collection,
    Map,
    Identifier,
    Parameter,
    String,
    Integer,
    Float,
    True,
    False,
    Null,
    Label,
    RelType,
    PropName,
    FunctionName,
    IndexName,
    ProcName,
    Pattern,
    NamedPath,
    ShortestPath,
    PatternPath,
    NodePattern,
    RelPattern,
    Range,
    Command,
    LineComment,
    BlockComment,
    Error,
}

/// Abstract supertypes used by `instanceof`-style checks.
///
/// These correspond to the vtables in `ast.h` that are never a node's own
/// kind (`cypher_expression_astnode_vt`, `cypher_query_clause_astnode_vt`,
/// ...) but that callers test membership in — e.g. "is this an expression".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    StatementOption,
    SchemaCommand,
    QueryClause,
    StartPoint,
    MatchHint,
    MergeAction,
    SetItem,
    RemoveItem,
    Expression,
    Comment,
}

impl NodeKind {
    /// Lowercase, hyphenated name used by the renderer (§4.8) and in
    /// diagnostic "expected ..." labels (§4.5).
    pub fn name(self) -> &'static str {
        use NodeKind::*;
        match self {
            Statement => "statement",
            CypherOption => "cypher-option",
            CypherOptionParam => "cypher-option-param",
            ExplainOption => "explain-option",
            ProfileOption => "profile-option",
            UsingPeriodicCommit => "using-periodic-commit",
            CreateNodePropIndex => "create-node-prop-index",
            DropNodePropIndex => "drop-node-prop-index",
            CreateNodePropConstraint => "create-node-prop-constraint",
            DropNodePropConstraint => "drop-node-prop-constraint",
            CreateNodePropExistsConstraint => "create-node-prop-exists-constraint",
            DropNodePropExistsConstraint => "drop-node-prop-exists-constraint",
            CreateRelPropConstraint => "create-rel-prop-constraint",
            DropRelPropConstraint => "drop-rel-prop-constraint",
            Query => "query",
            LoadCsv => "load-csv",
            Start => "start",
            NodeIndexLookup => "node-index-lookup",
            NodeIndexQuery => "node-index-query",
            NodeIdLookup => "node-id-lookup",
            AllNodesScan => "all-nodes-scan",
            RelIndexLookup => "rel-index-lookup",
            RelIndexQuery => "rel-index-query",
            RelIdLookup => "rel-id-lookup",
            AllRelsScan => "all-rels-scan",
            Match => "match",
            UsingIndex => "using-index",
            UsingJoin => "using-join",
            UsingScan => "using-scan",
            Merge => "merge",
            OnMatch => "on-match",
            OnCreate => "on-create",
            Create => "create",
            Set => "set",
            SetProperty => "set-property",
            SetAllProperties => "set-all-properties",
            MergeProperties => "merge-properties",
            SetLabels => "set-labels",
            Delete => "delete",
            Remove => "remove",
            RemoveLabels => "remove-labels",
            RemoveProperty => "remove-property",
            Foreach => "foreach",
            With => "with",
            Unwind => "unwind",
            Call => "call",
            Return => "return",
            Projection => "projection",
            OrderBy => "order-by",
            SortItem => "sort-item",
            Union => "union",
            UnaryOperator => "unary-operator",
            BinaryOperator => "binary-operator",
            Comparison => "comparison",
            ApplyOperator => "apply-operator",
            ApplyAllOperator => "apply-all-operator",
            PropertyOperator => "property-operator",
            SubscriptOperator => "subscript-operator",
            SliceOperator => "slice-operator",
            LabelsOperator => "labels-operator",
            ListComprehension => "list-comprehension",
            Case => "case",
            Filter => "filter",
            Extract => "extract",
            Reduce => "reduce",
            All => "all",
            Any => "any",
            Single => "single",
            None_ => "none",
            Collection => "collection",
            Map => "map",
            Identifier => "identifier",
            Parameter => "parameter",
            String => "string",
            Integer => "integer",
            Float => "float",
            True => "true",
            False => "false",
            Null => "null",
            Label => "label",
            RelType => "reltype",
            PropName => "prop-name",
            FunctionName => "function-name",
            IndexName => "index-name",
            ProcName => "proc-name",
            Pattern => "pattern",
            NamedPath => "named-path",
            ShortestPath => "shortest-path",
            PatternPath => "pattern-path",
            NodePattern => "node-pattern",
            RelPattern => "rel-pattern",
            Range => "range",
            Command => "command",
            LineComment => "line-comment",
            BlockComment => "block-comment",
            Error => "error",
        }
    }

    /// The abstract supertypes this kind belongs to, for `instanceof`-style
    /// checks. A kind with no entries here only matches itself.
    pub fn categories(self) -> &'static [Category] {
        use Category::*;
        use NodeKind::*;
        match self {
            CypherOption | ExplainOption | ProfileOption | UsingPeriodicCommit => {
                &[StatementOption]
            }
            CreateNodePropIndex
            | DropNodePropIndex
            | CreateNodePropConstraint
            | DropNodePropConstraint
            | CreateNodePropExistsConstraint
            | DropNodePropExistsConstraint
            | CreateRelPropConstraint
            | DropRelPropConstraint => &[SchemaCommand],
            LoadCsv | Start | Match | Merge | Create | Set | Delete | Remove | Foreach | With
            | Unwind | Call | Return | Union => &[QueryClause],
            NodeIndexLookup | NodeIndexQuery | NodeIdLookup | AllNodesScan | RelIndexLookup
            | RelIndexQuery | RelIdLookup | AllRelsScan => &[StartPoint],
            UsingIndex | UsingJoin | UsingScan => &[MatchHint],
            OnMatch | OnCreate => &[MergeAction],
            SetProperty | SetAllProperties | MergeProperties | SetLabels => &[SetItem],
            RemoveLabels | RemoveProperty => &[RemoveItem],
            UnaryOperator | BinaryOperator | Comparison | ApplyOperator | ApplyAllOperator
            | PropertyOperator | SubscriptOperator | SliceOperator | LabelsOperator
            | ListComprehension | Case | Filter | Extract | Reduce | All | Any | Single
            | None_ | Collection | Map | Identifier | Parameter | String | Integer | Float
            | True | False | Null => &[Expression],
            LineComment | BlockComment => &[Comment],
            _ => &[],
        }
    }

    /// Whether this kind is, or descends from, `category`.
    pub fn is_instance_of(self, category: Category) -> bool {
        self.categories().contains(&category)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_are_expressions() {
        assert!(NodeKind::BinaryOperator.is_instance_of(Category::Expression));
        assert!(NodeKind::Identifier.is_instance_of(Category::Expression));
        assert!(!NodeKind::Match.is_instance_of(Category::Expression));
    }

    #[test]
    fn clauses_are_query_clauses() {
        for kind in [
            NodeKind::Match,
            NodeKind::Merge,
            NodeKind::Create,
            NodeKind::Return,
            NodeKind::Unwind,
        ] {
            assert!(kind.is_instance_of(Category::QueryClause), "{kind:?}");
        }
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(NodeKind::PatternPath.name(), "pattern-path");
        assert_eq!(NodeKind::None_.name(), "none");
    }
}
