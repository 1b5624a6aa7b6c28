//! Schema commands (§3's `SCHEMA_COMMAND` category): index and constraint
//! management, the one corner of the grammar that isn't a `Query`.
//!
//! This settles on one `CREATE|DROP (INDEX|CONSTRAINT) ON ...` shape for
//! every schema command, rather than a bespoke "inline index hint" syntax.
//! Node-property constraints come in both forms (`IS UNIQUE`, `IS NOT NULL`);
//! relationship-property constraints are existence-only, since relationship
//! uniqueness isn't a concept this grammar models.

use crate::ast::{NodeFlags, NodeId, Payload};
use crate::kind::NodeKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::position::InputRange;

use super::literal;

/// Whether the cursor sits at `(CREATE|DROP) (INDEX|CONSTRAINT)` — the
/// two-keyword lookahead `statement.rs` uses to route between a query and a
/// schema command before committing to either.
pub fn at_schema_command(p: &mut Parser) -> bool {
    (p.at_keyword("create") || p.at_keyword("drop"))
        && (p.at_keyword_nth(1, "index") || p.at_keyword_nth(1, "constraint"))
}

pub fn schema_command(p: &mut Parser) -> NodeId {
    if p.at_keyword_nth(1, "index") {
        index_command(p)
    } else {
        constraint_command(p)
    }
}

/// `(CREATE|DROP) INDEX ON ':' label '(' propName (',' propName)* ')'` —
/// `CreateNodePropIndex`/`DropNodePropIndex` (§3).
fn index_command(p: &mut Parser) -> NodeId {
    let creating = p.at_keyword("create");
    let kind = if creating {
        NodeKind::CreateNodePropIndex
    } else {
        NodeKind::DropNodePropIndex
    };
    p.start_node(kind);
    p.bump(); // CREATE | DROP
    p.expect_keyword("index");
    p.expect_keyword("on");
    p.expect_token(TokenKind::Colon, "':'");
    let label = literal::label(p);
    p.push_child(label);
    p.expect_token(TokenKind::LParen, "'('");
    loop {
        let prop = literal::prop_name(p);
        p.push_child(prop);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    p.expect_token(TokenKind::RParen, "')'");
    p.end_node(Payload::None)
}

/// `(CREATE|DROP) CONSTRAINT ON (...)` — dispatches on whether the target is
/// a bare node pattern or an empty-node/rel/empty-node triple, since those
/// are the only two shapes `ON` ever introduces here.
fn constraint_command(p: &mut Parser) -> NodeId {
    let creating = p.at_keyword("create");
    p.bump(); // CREATE | DROP
    p.expect_keyword("constraint");
    p.expect_keyword("on");
    if p.peek_kind() == TokenKind::LParen && p.peek_nth(1).kind == TokenKind::RParen {
        rel_prop_constraint(p, creating)
    } else {
        node_prop_constraint(p, creating)
    }
}

/// `'(' ident ':' label ')' ASSERT ident '.' propName IS (UNIQUE | NOT NULL)`
/// — `CreateNodePropConstraint`/`DropNodePropConstraint` (uniqueness) or
/// `CreateNodePropExistsConstraint`/`DropNodePropExistsConstraint`
/// (existence), depending on what follows `IS` (§3). Children in both cases:
/// `[var, label, assertVar, propName]`. The kind isn't known until `IS` is
/// resolved, so this builds from a plain `Vec` rather than an open frame.
fn node_prop_constraint(p: &mut Parser, creating: bool) -> NodeId {
    let start = p.current_pos();
    let mut children = Vec::new();
    p.expect_token(TokenKind::LParen, "'('");
    children.push(literal::identifier(p));
    p.expect_token(TokenKind::Colon, "':'");
    children.push(literal::label(p));
    p.expect_token(TokenKind::RParen, "')'");
    p.expect_keyword("assert");
    children.push(literal::identifier(p));
    p.expect_token(TokenKind::Dot, "'.'");
    children.push(literal::prop_name(p));
    p.expect_keyword("is");
    let (kind, payload) = if p.eat_keyword("unique") {
        let kind = if creating {
            NodeKind::CreateNodePropConstraint
        } else {
            NodeKind::DropNodePropConstraint
        };
        (kind, Payload::Flags(NodeFlags::UNIQUE))
    } else {
        p.expect_keyword("not");
        p.expect_keyword("null");
        let kind = if creating {
            NodeKind::CreateNodePropExistsConstraint
        } else {
            NodeKind::DropNodePropExistsConstraint
        };
        (kind, Payload::None)
    };
    let end = p.last_end_pos();
    p.build_node(kind, InputRange::new(start, end), children, payload)
}

/// `'(' ')' '-' '[' ident ':' relType ']' '-' '(' ')' ASSERT ident '.' propName IS NOT NULL`
/// — `CreateRelPropConstraint`/`DropRelPropConstraint` (§3): an existence
/// constraint, since relationship property uniqueness isn't a concept this
/// grammar models. Children: `[var, relType, assertVar, propName]`.
fn rel_prop_constraint(p: &mut Parser, creating: bool) -> NodeId {
    let kind = if creating {
        NodeKind::CreateRelPropConstraint
    } else {
        NodeKind::DropRelPropConstraint
    };
    p.start_node(kind);
    p.expect_token(TokenKind::LParen, "'('");
    p.expect_token(TokenKind::RParen, "')'");
    p.expect_token(TokenKind::Minus, "'-'");
    p.expect_token(TokenKind::LBracket, "'['");
    let var = literal::identifier(p);
    p.push_child(var);
    p.expect_token(TokenKind::Colon, "':'");
    let reltype = literal::reltype(p);
    p.push_child(reltype);
    p.expect_token(TokenKind::RBracket, "']'");
    p.expect_token(TokenKind::Minus, "'-'");
    p.expect_token(TokenKind::LParen, "'('");
    p.expect_token(TokenKind::RParen, "')'");
    p.expect_keyword("assert");
    let assert_var = literal::identifier(p);
    p.push_child(assert_var);
    p.expect_token(TokenKind::Dot, "'.'");
    let prop = literal::prop_name(p);
    p.push_child(prop);
    p.expect_keyword("is");
    p.expect_keyword("not");
    p.expect_keyword("null");
    p.end_node(Payload::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_node_prop_index() {
        let mut p = Parser::new("CREATE INDEX ON :Foo(bar)");
        let id = schema_command(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::CreateNodePropIndex);
        assert_eq!(node.nchildren(), 2);
        assert_eq!(p.arena.get(node.child(0).unwrap()).kind(), NodeKind::Label);
        assert_eq!(p.arena.get(node.child(1).unwrap()).kind(), NodeKind::PropName);
    }

    #[test]
    fn drop_node_prop_index_with_multiple_properties() {
        let mut p = Parser::new("DROP INDEX ON :Foo(bar, baz)");
        let id = schema_command(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::DropNodePropIndex);
        assert_eq!(node.nchildren(), 3);
    }

    #[test]
    fn create_node_prop_constraint_is_unique() {
        let mut p = Parser::new("CREATE CONSTRAINT ON (n:Person) ASSERT n.email IS UNIQUE");
        let id = schema_command(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::CreateNodePropConstraint);
        assert!(node.flags().contains(NodeFlags::UNIQUE));
        assert_eq!(node.nchildren(), 4);
    }

    #[test]
    fn create_node_prop_exists_constraint() {
        let mut p = Parser::new("CREATE CONSTRAINT ON (n:Person) ASSERT n.email IS NOT NULL");
        let id = schema_command(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::CreateNodePropExistsConstraint);
        assert_eq!(node.nchildren(), 4);
        assert_eq!(p.arena.get(node.child(0).unwrap()).kind(), NodeKind::Identifier);
        assert_eq!(p.arena.get(node.child(1).unwrap()).kind(), NodeKind::Label);
    }

    #[test]
    fn drop_node_prop_exists_constraint() {
        let mut p = Parser::new("DROP CONSTRAINT ON (n:Person) ASSERT n.email IS NOT NULL");
        let id = schema_command(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::DropNodePropExistsConstraint);
        assert_eq!(node.nchildren(), 4);
    }

    #[test]
    fn create_rel_prop_constraint_is_existence_only() {
        let mut p = Parser::new("CREATE CONSTRAINT ON ()-[r:KNOWS]-() ASSERT r.since IS NOT NULL");
        let id = schema_command(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::CreateRelPropConstraint);
        assert_eq!(node.nchildren(), 4);
        assert_eq!(p.arena.get(node.child(1).unwrap()).kind(), NodeKind::RelType);
    }

    #[test]
    fn at_schema_command_rejects_plain_query() {
        let mut p = Parser::new("CREATE (n)");
        assert!(!at_schema_command(&mut p));
    }

    #[test]
    fn at_schema_command_accepts_drop_constraint() {
        let mut p = Parser::new("DROP CONSTRAINT ON (n:Foo) ASSERT n.bar IS UNIQUE");
        assert!(at_schema_command(&mut p));
    }
}
