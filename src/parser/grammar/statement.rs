//! `statement` (§3's `STATEMENT` category) — zero or more leading options
//! (`CYPHER ...`, `EXPLAIN`, `PROFILE`, `USING PERIODIC COMMIT`) wrapping
//! either a schema command or a query.
//!
//! The original's grammar fixes the order of these four options (`CYPHER`
//! first, then `EXPLAIN`/`PROFILE`, then `USING PERIODIC COMMIT`); this
//! accepts them in any order, and more than once, since nothing downstream
//! depends on a canonical ordering and rejecting a repeated or reordered
//! option would just be an extra failure mode with no payoff (DESIGN.md).
//! `kind.rs` groups all four under `Category::StatementOption` for exactly
//! this reason — `statement` doesn't need to special-case any of them beyond
//! dispatching on the keyword that introduces it.

use crate::ast::{NodeId, Payload};
use crate::kind::NodeKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;

use super::{clause, literal, schema};

/// `statement` (§4.6 top-level rule): returns whether the body parsed
/// cleanly. On failure the caller ([`super::directive::directive`]) runs
/// statement-level recovery.
pub fn statement(p: &mut Parser) -> bool {
    p.start_node(NodeKind::Statement);
    loop {
        if p.at_keyword("cypher") {
            cypher_option(p);
        } else if p.at_keyword("explain") {
            explain_option(p);
        } else if p.at_keyword("profile") {
            profile_option(p);
        } else if p.at_keyword("using") && p.at_keyword_nth(1, "periodic") {
            using_periodic_commit(p);
        } else {
            break;
        }
    }

    let ok = if schema::at_schema_command(p) {
        schema::schema_command(p);
        true
    } else {
        clause::query(p)
    };

    if !ok {
        p.abandon_node();
        return false;
    }
    p.end_node(Payload::None);
    true
}

/// `CYPHER` (versionLiteral)? (cypherOptionParam)* — `CypherOption` (§B.1).
/// The version and each param's name/value are `STRING`-kind nodes rather
/// than whatever literal kind their lexeme would otherwise classify as
/// (`ast_cypher_option.c`, `ast_cypher_option_param.c` both `REQUIRE
/// instanceof(..., CYPHER_AST_STRING)`): a version like `3.0` is data about
/// the dialect to use, not a numeric value to evaluate.
fn cypher_option(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::CypherOption);
    p.bump(); // CYPHER
    if at_version(p) {
        let version = string_like_leaf(p);
        p.push_child(version);
    }
    while at_option_param(p) {
        cypher_option_param(p);
    }
    p.end_node(Payload::None)
}

fn at_version(p: &mut Parser) -> bool {
    !matches!(p.peek_kind(), TokenKind::Eof)
        && matches!(p.peek_kind(), TokenKind::Float | TokenKind::Integer | TokenKind::Identifier)
        && !at_option_param(p)
        && !p.at_keyword("explain")
        && !p.at_keyword("profile")
        && !p.at_keyword("using")
}

fn at_option_param(p: &mut Parser) -> bool {
    p.peek_kind() == TokenKind::Identifier && p.peek_nth(1).kind == TokenKind::Eq
}

/// `identifier '=' (identifier | stringLiteral | integerLiteral | floatLiteral)`
/// — `CypherOptionParam`; both name and value end up as `STRING` children
/// regardless of how the value was spelled (`ast_cypher_option_param.c`).
fn cypher_option_param(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::CypherOptionParam);
    let name = string_like_leaf(p);
    p.push_child(name);
    p.expect_token(TokenKind::Eq, "'='");
    let value = if p.peek_kind() == TokenKind::StringLiteral {
        literal::string_literal(p)
    } else {
        string_like_leaf(p)
    };
    p.push_child(value);
    p.end_node(Payload::None)
}

/// Bump the current token and re-tag it as a `STRING` leaf, verbatim — used
/// for the bare (unquoted) words a `CypherOption` and its params are made of,
/// which carry no escape syntax of their own to decode.
fn string_like_leaf(p: &mut Parser) -> NodeId {
    let token = p.bump();
    p.alloc_leaf(NodeKind::String, token.range, Payload::Text(token.text))
}

/// `EXPLAIN` — `ExplainOption` (§B.1): a pure marker, no fields beyond its
/// own range (`cypher-parser.h`'s `cypher_ast_explain_option` takes only
/// `children`/`range`).
fn explain_option(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::ExplainOption);
    p.expect_keyword("explain");
    p.end_node(Payload::None)
}

/// `PROFILE` — `ProfileOption` (§B.1), the same shape as [`explain_option`].
fn profile_option(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::ProfileOption);
    p.expect_keyword("profile");
    p.end_node(Payload::None)
}

/// `USING PERIODIC COMMIT` integerLiteral? — `UsingPeriodicCommit` (§B.3):
/// a statement-level option here rather than a `Query`-level one, despite
/// the surface syntax sitting right before `LOAD CSV` (DESIGN.md's Open
/// Question decision; `kind.rs` already groups it under
/// `Category::StatementOption`, not `QueryClause`).
fn using_periodic_commit(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::UsingPeriodicCommit);
    p.expect_keyword("using");
    p.expect_keyword("periodic");
    p.expect_keyword("commit");
    if p.peek_kind() == TokenKind::Integer {
        let limit = literal::integer_literal(p);
        p.push_child(limit);
    }
    p.end_node(Payload::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Category;

    #[test]
    fn plain_query_has_no_options() {
        let mut p = Parser::new("RETURN 1");
        assert!(statement(&mut p));
        let stmt = p.arena.get(p.top_level[0]);
        assert_eq!(stmt.kind(), NodeKind::Statement);
        assert_eq!(stmt.nchildren(), 1);
        assert_eq!(p.arena.get(stmt.child(0).unwrap()).kind(), NodeKind::Query);
    }

    #[test]
    fn cypher_option_with_version_and_param() {
        let mut p = Parser::new("CYPHER 3.0 runtime=interpreted RETURN 1");
        assert!(statement(&mut p));
        let stmt = p.arena.get(p.top_level[0]);
        let opt = p.arena.get(stmt.child(0).unwrap());
        assert_eq!(opt.kind(), NodeKind::CypherOption);
        assert!(opt.kind().is_instance_of(Category::StatementOption));
        assert_eq!(opt.nchildren(), 2);
        assert_eq!(p.arena.get(opt.child(0).unwrap()).kind(), NodeKind::String);
        let param = p.arena.get(opt.child(1).unwrap());
        assert_eq!(param.kind(), NodeKind::CypherOptionParam);
        assert_eq!(param.nchildren(), 2);
        assert_eq!(p.arena.get(param.child(0).unwrap()).text(), Some("runtime"));
        assert_eq!(p.arena.get(param.child(1).unwrap()).text(), Some("interpreted"));
    }

    #[test]
    fn profile_option_matches_scenario_3() {
        let mut p = Parser::new("CYPHER 3.0 PROFILE RETURN 1;");
        assert!(statement(&mut p));
        let stmt = p.arena.get(p.top_level[0]);
        assert_eq!(stmt.nchildren(), 3);
        assert_eq!(p.arena.get(stmt.child(0).unwrap()).kind(), NodeKind::CypherOption);
        assert_eq!(p.arena.get(stmt.child(1).unwrap()).kind(), NodeKind::ProfileOption);
        assert_eq!(p.arena.get(stmt.child(2).unwrap()).kind(), NodeKind::Query);
    }

    #[test]
    fn using_periodic_commit_with_limit() {
        let mut p = Parser::new("USING PERIODIC COMMIT 500 LOAD CSV FROM 'f.csv' AS row CREATE (n)");
        assert!(statement(&mut p));
        let stmt = p.arena.get(p.top_level[0]);
        let opt = p.arena.get(stmt.child(0).unwrap());
        assert_eq!(opt.kind(), NodeKind::UsingPeriodicCommit);
        assert_eq!(opt.nchildren(), 1);
        assert_eq!(p.arena.get(opt.child(0).unwrap()).kind(), NodeKind::Integer);
    }

    #[test]
    fn schema_command_is_not_wrapped_in_query() {
        let mut p = Parser::new("CREATE INDEX ON :Foo(bar)");
        assert!(statement(&mut p));
        let stmt = p.arena.get(p.top_level[0]);
        assert_eq!(stmt.nchildren(), 1);
        assert_eq!(p.arena.get(stmt.child(0).unwrap()).kind(), NodeKind::CreateNodePropIndex);
    }
}
