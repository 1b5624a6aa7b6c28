//! Query clauses (§3's `QUERY_CLAUSE` category) and `Query` itself — the
//! bulk of the grammar, dispatched purely on the keyword that opens each
//! clause since Cypher's clause keywords never overlap at the position
//! they appear.
//!
//! `UNION` is the one clause that doesn't sit inside the sequence it
//! introduces: a `Query` that has already finished parsing gets pulled back
//! out with [`Parser::pop_last_child`] and re-parented as `Union`'s sole
//! child, because nothing short of reaching `UNION` itself reveals that the
//! preceding clauses belonged to a part of a bigger union rather than a
//! complete statement on their own.

use crate::ast::{NodeFlags, NodeId, Payload};
use crate::kind::NodeKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::position::InputRange;

use super::{expression, literal, pattern};

/// `clause+ (UNION ALL? query)?` — `Query` (§3), right-recursive: a `UNION`
/// doesn't start a sibling arm, it closes over the rest of the input as a
/// nested `Query` wrapped in a `Union` node that becomes this `Query`'s last
/// child (`child_allowed`'s `Union => child == Query`, and `Union` is itself
/// a `QueryClause`, so it fits right alongside `Match`/`Return`/...). A
/// three-part union ends up right-nested — `Query[c1, c2, Union[Query[c3,
/// c4, Union[Query[c5, c6]]]]]` — which the recursive call here produces for
/// free, since the inner `query` call keeps consuming `UNION`s of its own
/// before returning.
pub fn query(p: &mut Parser) -> bool {
    p.start_node(NodeKind::Query);
    let mut any = false;
    loop {
        if !clause(p) {
            break;
        }
        any = true;
    }
    if !any {
        p.abandon_node();
        return false;
    }
    while p.at_keyword("union") {
        let start = p.current_pos();
        p.bump(); // UNION
        let all = p.eat_keyword("all");
        if !query(p) {
            break;
        }
        let nested = p.pop_last_child();
        let end = p.arena.get(nested).range().end;
        let flags = if all { NodeFlags::ALL } else { NodeFlags::NONE };
        let union = p.build_node(NodeKind::Union, InputRange::new(start, end), vec![nested], Payload::Flags(flags));
        p.push_child(union);
    }
    p.end_node(Payload::None);
    true
}

fn clause(p: &mut Parser) -> bool {
    if p.at_keyword("match") || p.at_keyword("optional") {
        match_clause(p);
    } else if p.at_keyword("merge") {
        merge_clause(p);
    } else if p.at_keyword("create") {
        create_clause(p);
    } else if p.at_keyword("set") {
        set_clause(p);
    } else if p.at_keyword("delete") || p.at_keyword("detach") {
        delete_clause(p);
    } else if p.at_keyword("remove") {
        remove_clause(p);
    } else if p.at_keyword("foreach") {
        foreach_clause(p);
    } else if p.at_keyword("with") {
        with_clause(p);
    } else if p.at_keyword("unwind") {
        unwind_clause(p);
    } else if p.at_keyword("call") {
        call_clause(p);
    } else if p.at_keyword("return") {
        return_clause(p);
    } else if p.at_keyword("load") && p.at_keyword_nth(1, "csv") {
        load_csv_clause(p);
    } else if p.at_keyword("start") {
        start_clause(p);
    } else {
        return false;
    }
    true
}

// -- MATCH --------------------------------------------------------------

/// `OPTIONAL? MATCH patternElement (',' patternElement)* matchHint* (WHERE expr)?`
/// — `Match` (§3). `OPTIONAL` is a flag, not a wrapper node (`ast_match.c`).
/// The comma-separated pattern elements are wrapped in one `Pattern` node
/// (`cypher_ast_match`'s single `pattern` argument), not attached to `Match`
/// directly.
fn match_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Match);
    let optional = p.eat_keyword("optional");
    p.expect_keyword("match");
    let pattern = pattern_list(p);
    p.push_child(pattern);
    while p.at_keyword("using") {
        match_hint(p);
    }
    if p.eat_keyword("where") {
        let pred = expression::expression(p);
        p.push_child(pred);
    }
    let flags = if optional { NodeFlags::OPTIONAL } else { NodeFlags::NONE };
    p.end_node(Payload::Flags(flags))
}

/// `USING (INDEX | JOIN ON | SCAN) ...` — the three `MatchHint` shapes
/// (`ast_using_index.c`/`ast_using_join.c`/`ast_using_scan.c`), planner
/// advice rather than anything affecting the match's meaning.
fn match_hint(p: &mut Parser) -> NodeId {
    p.expect_keyword("using");
    if p.eat_keyword("index") {
        using_index(p)
    } else if p.eat_keyword("join") {
        using_join(p)
    } else {
        p.expect_keyword("scan");
        using_scan(p)
    }
}

/// `identifier ':' label '(' propName ')'` — `UsingIndex` (§3, `ast_using_index.c`).
fn using_index(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::UsingIndex);
    let ident = literal::identifier(p);
    p.push_child(ident);
    p.expect_token(TokenKind::Colon, "':'");
    let label = literal::label(p);
    p.push_child(label);
    p.expect_token(TokenKind::LParen, "'('");
    let prop = literal::prop_name(p);
    p.push_child(prop);
    p.expect_token(TokenKind::RParen, "')'");
    p.end_node(Payload::None)
}

/// `ON identifier (',' identifier)*` — `UsingJoin` (§3, `ast_using_join.c`).
fn using_join(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::UsingJoin);
    p.expect_keyword("on");
    loop {
        let ident = literal::identifier(p);
        p.push_child(ident);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    p.end_node(Payload::None)
}

/// `identifier ':' label` — `UsingScan` (§3, `ast_using_index.c`'s sibling).
fn using_scan(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::UsingScan);
    let ident = literal::identifier(p);
    p.push_child(ident);
    p.expect_token(TokenKind::Colon, "':'");
    let label = literal::label(p);
    p.push_child(label);
    p.end_node(Payload::None)
}

// -- MERGE ----------------------------------------------------------------

/// `MERGE patternElement mergeAction*` — `Merge` (§3, `ast_merge.c`). Each
/// action is `ON MATCH`/`ON CREATE` wrapping exactly one `Set`
/// (`child_allowed`'s `OnMatch | OnCreate => child == Set`).
fn merge_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Merge);
    p.expect_keyword("merge");
    let path = pattern::pattern_element(p);
    p.push_child(path);
    while p.at_keyword("on") {
        merge_action(p);
    }
    p.end_node(Payload::None)
}

/// `ON (MATCH | CREATE) setClause` — `OnMatch`/`OnCreate` (§3, `ast_on_create.c`).
fn merge_action(p: &mut Parser) -> NodeId {
    p.expect_keyword("on");
    let kind = if p.eat_keyword("match") {
        NodeKind::OnMatch
    } else {
        p.expect_keyword("create");
        NodeKind::OnCreate
    };
    p.start_node(kind);
    let set = set_clause(p);
    p.push_child(set);
    p.end_node(Payload::None)
}

// -- CREATE -----------------------------------------------------------------

/// `CREATE UNIQUE? patternElement (',' patternElement)*` — `Create` (§3).
/// Legacy `CREATE UNIQUE` sets the `UNIQUE` flag; plain `CREATE` never does.
/// Like `MATCH`, the pattern elements are wrapped in one `Pattern` node
/// rather than attached to `Create` directly.
fn create_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Create);
    p.expect_keyword("create");
    let unique = p.eat_keyword("unique");
    let pattern = pattern_list(p);
    p.push_child(pattern);
    let flags = if unique { NodeFlags::UNIQUE } else { NodeFlags::NONE };
    p.end_node(Payload::Flags(flags))
}

/// `patternElement (',' patternElement)*` wrapped as one `Pattern` node
/// (§3, `ast_pattern.c`), shared by `MATCH` and `CREATE`.
fn pattern_list(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let mut children = Vec::new();
    loop {
        children.push(pattern::pattern_element(p));
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    let end = p.last_end_pos();
    p.build_node(NodeKind::Pattern, InputRange::new(start, end), children, Payload::None)
}

// -- SET --------------------------------------------------------------------

/// `SET setItem (',' setItem)*` — `Set` (§3, `ast_set.c`).
fn set_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Set);
    p.expect_keyword("set");
    loop {
        set_item(p);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    p.end_node(Payload::None)
}

/// One `SetItem` (§3): disambiguated by what follows the leading identifier.
/// `ident ':' label...` is always `SetLabels`; otherwise the identifier
/// (optionally followed by `.propName`) is the assignment target, and
/// `+=` vs `=` plus whether the target turned out to be bare or a property
/// access picks the remaining three shapes.
fn set_item(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let ident = literal::identifier(p);
    if p.peek_kind() == TokenKind::Colon {
        return set_labels(p, start, ident);
    }
    let target = property_target(p, start, ident);
    if p.eat_token(TokenKind::PlusEq) {
        let value = expression::expression(p);
        let end = p.arena.get(value).range().end;
        p.build_node(NodeKind::MergeProperties, InputRange::new(start, end), vec![target, value], Payload::None)
    } else {
        p.expect_token(TokenKind::Eq, "'='");
        let value = expression::expression(p);
        let end = p.arena.get(value).range().end;
        let kind = if p.arena.get(target).kind() == NodeKind::Identifier {
            NodeKind::SetAllProperties
        } else {
            NodeKind::SetProperty
        };
        p.build_node(kind, InputRange::new(start, end), vec![target, value], Payload::None)
    }
}

/// `ident ':' label (':' label)*` — `SetLabels` (§3, mirrors `ast_remove_labels.c`'s
/// shape, the one kept in the retrieval pack).
fn set_labels(p: &mut Parser, start: crate::position::InputPosition, ident: NodeId) -> NodeId {
    let mut children = vec![ident];
    while p.eat_token(TokenKind::Colon) {
        children.push(literal::label(p));
    }
    let end = p.last_end_pos();
    p.build_node(NodeKind::SetLabels, InputRange::new(start, end), children, Payload::None)
}

/// `identifier ('.' propName)?`, built directly rather than through
/// [`expression::expression`] — that entry point treats a bare `=` as the
/// equality-comparison operator (`comparison_expr`), so it would swallow
/// `n.name = 'x'` whole into one `Comparison` node instead of stopping at
/// `n.name` the way `SET`'s grammar needs. Returns the `Identifier` node
/// itself when there's no property access, or a `PropertyOperator` wrapping
/// it when there is — callers tell the two apart by checking the returned
/// node's kind, exactly how [`set_item`] picks `SetAllProperties` vs.
/// `SetProperty`.
fn property_target(p: &mut Parser, start: crate::position::InputPosition, ident: NodeId) -> NodeId {
    if p.eat_token(TokenKind::Dot) {
        let prop = literal::prop_name(p);
        let end = p.arena.get(prop).range().end;
        p.build_node(NodeKind::PropertyOperator, InputRange::new(start, end), vec![ident, prop], Payload::None)
    } else {
        ident
    }
}

// -- DELETE -------------------------------------------------------------

/// `DETACH? DELETE expr (',' expr)*` — `Delete` (§3, `ast_delete.c`).
fn delete_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Delete);
    let detach = p.eat_keyword("detach");
    p.expect_keyword("delete");
    loop {
        let expr = expression::expression(p);
        p.push_child(expr);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    let flags = if detach { NodeFlags::DETACH } else { NodeFlags::NONE };
    p.end_node(Payload::Flags(flags))
}

// -- REMOVE ---------------------------------------------------------------

/// `REMOVE removeItem (',' removeItem)*` — `Remove` (§3).
fn remove_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Remove);
    p.expect_keyword("remove");
    loop {
        remove_item(p);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    p.end_node(Payload::None)
}

/// One `RemoveItem`: `ident ':' label...` is `RemoveLabels`
/// (`ast_remove_labels.c`); `ident '.' propName` is `RemoveProperty` —
/// the same `property_target` helper SET uses, since REMOVE's property
/// form is never a bare identifier on its own.
fn remove_item(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let ident = literal::identifier(p);
    if p.peek_kind() == TokenKind::Colon {
        return set_labels_as(p, start, ident, NodeKind::RemoveLabels);
    }
    let target = property_target(p, start, ident);
    let end = p.arena.get(target).range().end;
    p.build_node(NodeKind::RemoveProperty, InputRange::new(start, end), vec![target], Payload::None)
}

fn set_labels_as(p: &mut Parser, start: crate::position::InputPosition, ident: NodeId, kind: NodeKind) -> NodeId {
    let mut children = vec![ident];
    while p.eat_token(TokenKind::Colon) {
        children.push(literal::label(p));
    }
    let end = p.last_end_pos();
    p.build_node(kind, InputRange::new(start, end), children, Payload::None)
}

// -- FOREACH ----------------------------------------------------------------

/// `FOREACH '(' identifier IN expr '|' clause+ ')'` — `Foreach` (§3,
/// `ast_foreach.c`), the only clause that itself contains nested clauses.
fn foreach_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Foreach);
    p.expect_keyword("foreach");
    p.expect_token(TokenKind::LParen, "'('");
    let ident = literal::identifier(p);
    p.push_child(ident);
    p.expect_keyword("in");
    let list = expression::expression(p);
    p.push_child(list);
    p.expect_token(TokenKind::Pipe, "'|'");
    while clause(p) {}
    p.expect_token(TokenKind::RParen, "')'");
    p.end_node(Payload::None)
}

// -- WITH / RETURN shared machinery -----------------------------------------

/// `DISTINCT? (projection (',' projection)* | '*' (',' projection)*)`
/// — the body shared by `WITH`/`RETURN` (`ast_return.c`/`ast_with.c`).
/// Returns the accumulated flags so the caller can fold in its own (`WHERE`
/// for `WITH`).
fn projection_body(p: &mut Parser) -> NodeFlags {
    let mut flags = NodeFlags::NONE;
    if p.eat_keyword("distinct") {
        flags = flags.with(NodeFlags::DISTINCT);
    }
    if p.eat_token(TokenKind::Star) {
        flags = flags.with(NodeFlags::STAR);
        if p.eat_token(TokenKind::Comma) {
            projection_list(p);
        }
    } else {
        projection_list(p);
    }
    if p.at_keyword("order") {
        order_by(p);
    }
    if p.eat_keyword("skip") {
        let skip = expression::expression(p);
        p.push_child(skip);
        flags = flags.with(NodeFlags::HAS_SKIP);
    }
    if p.eat_keyword("limit") {
        let limit = expression::expression(p);
        p.push_child(limit);
        flags = flags.with(NodeFlags::HAS_LIMIT);
    }
    flags
}

fn projection_list(p: &mut Parser) {
    loop {
        projection(p);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
}

/// `expr (AS identifier)?` — `Projection` (§3, `ast_projection.c` shape
/// inferred from `cypher-parser.h`'s `cypher_ast_projection(expression,
/// alias, ...)`). An alias-less projection whose expression is already a
/// bare `Identifier` needs no synthesized alias — the expression text
/// itself already reads as the column name.
fn projection(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Projection);
    let expr = expression::expression(p);
    p.push_child(expr);
    if p.eat_keyword("as") {
        let alias = literal::identifier(p);
        p.push_child(alias);
    } else if p.arena.get(expr).kind() != NodeKind::Identifier {
        let range = p.arena.get(expr).range();
        let text = p.text_of(range).to_string();
        let alias = p.alloc_leaf(NodeKind::Identifier, range, Payload::Text(text));
        p.push_child(alias);
    }
    p.end_node(Payload::None)
}

/// `ORDER BY sortItem (',' sortItem)*` — `OrderBy` (§3, `ast_order_by.c`
/// shape inferred from its constructor signature).
fn order_by(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::OrderBy);
    p.expect_keyword("order");
    p.expect_keyword("by");
    loop {
        sort_item(p);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    p.end_node(Payload::None)
}

/// `expr (ASCENDING | ASC | DESCENDING | DESC)?` — `SortItem` (§3,
/// `ast_sort_item.c` shape). Ascending is the default, so only `DESC`
/// needs a flag.
fn sort_item(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::SortItem);
    let expr = expression::expression(p);
    p.push_child(expr);
    let descending = p.eat_keyword("descending") || p.eat_keyword("desc");
    if !descending {
        let _ = p.eat_keyword("ascending") || p.eat_keyword("asc");
    }
    let flags = if descending { NodeFlags::DESCENDING } else { NodeFlags::NONE };
    p.end_node(Payload::Flags(flags))
}

// -- WITH -------------------------------------------------------------------

/// `WITH` + [`projection_body`] + an optional trailing `WHERE` — `With`
/// (§3, `ast_with.c`): the one shape with a `WHERE` of its own, since a
/// `WITH` can filter on the values it just projected the way `MATCH` filters
/// on a pattern.
fn with_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::With);
    p.expect_keyword("with");
    let mut flags = projection_body(p);
    if p.eat_keyword("where") {
        let pred = expression::expression(p);
        p.push_child(pred);
        flags = flags.with(NodeFlags::HAS_WHERE);
    }
    p.end_node(Payload::Flags(flags))
}

// -- UNWIND -----------------------------------------------------------------

/// `UNWIND expr AS identifier` — `Unwind` (§3). Children: `[expr, identifier]`,
/// matching `cypher_ast_unwind(expression, alias, ...)`'s parameter order.
fn unwind_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Unwind);
    p.expect_keyword("unwind");
    let expr = expression::expression(p);
    p.push_child(expr);
    p.expect_keyword("as");
    let alias = literal::identifier(p);
    p.push_child(alias);
    p.end_node(Payload::None)
}

// -- CALL -------------------------------------------------------------------

/// `CALL procName '(' (expr (',' expr)*)? ')' (YIELD ('*' | identifier (',' identifier)*))?`
/// — `Call` (§3). Children: `[procName, arg..., yieldIdentifier...]`;
/// `Payload::Count(n)` is the number of argument children, letting the two
/// variable-length runs after `procName` be told apart without a sentinel
/// child (`ast/payload.rs`'s doc on `Payload::Count`); the paired
/// `NodeFlags::ALL` in that same payload distinguishes `YIELD *` (every
/// yield child elided) from no `YIELD` clause at all, which otherwise look
/// identical (zero children past the arguments).
fn call_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Call);
    p.expect_keyword("call");
    let proc = literal::proc_name(p);
    p.push_child(proc);
    p.expect_token(TokenKind::LParen, "'('");
    let mut nargs = 0u32;
    if p.peek_kind() != TokenKind::RParen {
        loop {
            let arg = expression::expression(p);
            p.push_child(arg);
            nargs += 1;
            if !p.eat_token(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect_token(TokenKind::RParen, "')'");
    let mut flags = NodeFlags::NONE;
    if p.eat_keyword("yield") {
        if p.eat_token(TokenKind::Star) {
            flags = flags.with(NodeFlags::ALL);
        } else {
            loop {
                let ident = literal::identifier(p);
                p.push_child(ident);
                if !p.eat_token(TokenKind::Comma) {
                    break;
                }
            }
        }
    }
    p.end_node(Payload::Count(nargs, flags))
}

// -- RETURN -----------------------------------------------------------------

/// `RETURN` + [`projection_body`] — `Return` (§3, `ast_return.c`): the same
/// body `WITH` uses, minus the trailing `WHERE` (a `Return` never filters;
/// it's the terminal clause of a query, so there's nothing left to carry
/// a predicate forward into).
fn return_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Return);
    p.expect_keyword("return");
    let flags = projection_body(p);
    p.end_node(Payload::Flags(flags))
}

// -- LOAD CSV -----------------------------------------------------------------

/// `LOAD CSV (WITH HEADERS)? FROM expr AS identifier (FIELDTERMINATOR stringLiteral)?`
/// — `LoadCsv` (§3, `ast_load_csv.c`). Children: `[url, identifier, fieldTerminator?]`.
fn load_csv_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::LoadCsv);
    p.expect_keyword("load");
    p.expect_keyword("csv");
    let headers = p.at_keyword("with") && p.at_keyword_nth(1, "headers");
    if headers {
        p.bump(); // WITH
        p.bump(); // HEADERS
    }
    p.expect_keyword("from");
    let url = expression::expression(p);
    p.push_child(url);
    p.expect_keyword("as");
    let ident = literal::identifier(p);
    p.push_child(ident);
    if p.eat_keyword("fieldterminator") {
        let term = literal::string_literal(p);
        p.push_child(term);
    }
    let flags = if headers { NodeFlags::HEADERS } else { NodeFlags::NONE };
    p.end_node(Payload::Flags(flags))
}

// -- START ------------------------------------------------------------------

/// `START startPoint (',' startPoint)* (WHERE expr)?` — `Start` (§3,
/// `ast_start.c`).
fn start_clause(p: &mut Parser) -> NodeId {
    p.start_node(NodeKind::Start);
    p.expect_keyword("start");
    loop {
        start_point(p);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    if p.eat_keyword("where") {
        let pred = expression::expression(p);
        p.push_child(pred);
    }
    p.end_node(Payload::None)
}

/// One of the eight legacy `START` point forms (§3's `StartPoint` category,
/// `cypher-parser.h`'s eight `cypher_ast_*_lookup`/`*_scan`/`*_query`
/// constructors): `identifier '=' (node|relationship) ':' ...`.
fn start_point(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let ident = literal::identifier(p);
    p.expect_token(TokenKind::Eq, "'='");
    let is_node = p.eat_keyword("node");
    if !is_node {
        p.expect_keyword("relationship");
    }

    if p.eat_token(TokenKind::Star) {
        let kind = if is_node { NodeKind::AllNodesScan } else { NodeKind::AllRelsScan };
        let end = p.last_end_pos();
        return p.build_node(kind, InputRange::new(start, end), vec![ident], Payload::None);
    }

    p.expect_token(TokenKind::Colon, "':'");
    let index = literal::index_name(p);
    p.expect_token(TokenKind::LParen, "'('");

    if p.peek_kind() == TokenKind::Star {
        p.bump();
        p.expect_token(TokenKind::RParen, "')'");
        let kind = if is_node { NodeKind::NodeIndexQuery } else { NodeKind::RelIndexQuery };
        let end = p.last_end_pos();
        return p.build_node(kind, InputRange::new(start, end), vec![ident, index], Payload::None);
    }

    if p.peek_kind() == TokenKind::StringLiteral {
        let query = literal::string_literal(p);
        p.expect_token(TokenKind::RParen, "')'");
        let kind = if is_node { NodeKind::NodeIndexQuery } else { NodeKind::RelIndexQuery };
        let end = p.last_end_pos();
        return p.build_node(kind, InputRange::new(start, end), vec![ident, index, query], Payload::None);
    }

    if p.peek_kind() == TokenKind::Identifier && p.peek_nth(1).kind == TokenKind::Eq {
        let prop = literal::prop_name(p);
        p.expect_token(TokenKind::Eq, "'='");
        let lookup = expression::expression(p);
        p.expect_token(TokenKind::RParen, "')'");
        let kind = if is_node { NodeKind::NodeIndexLookup } else { NodeKind::RelIndexLookup };
        let end = p.last_end_pos();
        return p.build_node(kind, InputRange::new(start, end), vec![ident, index, prop, lookup], Payload::None);
    }

    let mut children = vec![ident, index];
    loop {
        let id = expression::expression(p);
        children.push(id);
        if !p.eat_token(TokenKind::Comma) {
            break;
        }
    }
    p.expect_token(TokenKind::RParen, "')'");
    let kind = if is_node { NodeKind::NodeIdLookup } else { NodeKind::RelIdLookup };
    let end = p.last_end_pos();
    p.build_node(kind, InputRange::new(start, end), children, Payload::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser as TestParser;

    fn parse_query(src: &str) -> (TestParser, bool) {
        let mut p = TestParser::new(src);
        let ok = query(&mut p);
        (p, ok)
    }

    #[test]
    fn match_return_sequence() {
        let (p, ok) = parse_query("MATCH (n) RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        assert_eq!(q.kind(), NodeKind::Query);
        assert_eq!(q.nchildren(), 2);
        assert_eq!(p.arena.get(q.child(0).unwrap()).kind(), NodeKind::Match);
        assert_eq!(p.arena.get(q.child(1).unwrap()).kind(), NodeKind::Return);
    }

    #[test]
    fn optional_match_sets_flag() {
        let (p, ok) = parse_query("OPTIONAL MATCH (n) RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let m = p.arena.get(q.child(0).unwrap());
        assert!(m.flags().contains(NodeFlags::OPTIONAL));
    }

    #[test]
    fn match_with_where_and_hint() {
        let (p, ok) = parse_query("MATCH (n:Person) USING INDEX n:Person(name) WHERE n.name = 'x' RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let m = p.arena.get(q.child(0).unwrap());
        assert_eq!(m.nchildren(), 3);
        assert_eq!(p.arena.get(m.child(0).unwrap()).kind(), NodeKind::Pattern);
        assert_eq!(p.arena.get(m.child(1).unwrap()).kind(), NodeKind::UsingIndex);
        assert_eq!(p.arena.get(m.child(2).unwrap()).kind(), NodeKind::Comparison);
    }

    #[test]
    fn match_wraps_comma_separated_patterns_in_one_pattern_node() {
        let (p, ok) = parse_query("MATCH (a), (b) RETURN a, b");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let m = p.arena.get(q.child(0).unwrap());
        assert_eq!(m.nchildren(), 1);
        let pattern = p.arena.get(m.child(0).unwrap());
        assert_eq!(pattern.kind(), NodeKind::Pattern);
        assert_eq!(pattern.nchildren(), 2);
        assert_eq!(p.arena.get(pattern.child(0).unwrap()).kind(), NodeKind::PatternPath);
        assert_eq!(p.arena.get(pattern.child(1).unwrap()).kind(), NodeKind::PatternPath);
    }

    #[test]
    fn create_wraps_comma_separated_patterns_in_one_pattern_node() {
        let (p, ok) = parse_query("CREATE (a), (b)");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let c = p.arena.get(q.child(0).unwrap());
        assert_eq!(c.nchildren(), 1);
        let pattern = p.arena.get(c.child(0).unwrap());
        assert_eq!(pattern.kind(), NodeKind::Pattern);
        assert_eq!(pattern.nchildren(), 2);
    }

    #[test]
    fn merge_with_on_create_and_on_match() {
        let (p, ok) = parse_query("MERGE (n:Person) ON CREATE SET n.created = true ON MATCH SET n.seen = true RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let merge = p.arena.get(q.child(0).unwrap());
        assert_eq!(merge.nchildren(), 3);
        assert_eq!(p.arena.get(merge.child(1).unwrap()).kind(), NodeKind::OnCreate);
        assert_eq!(p.arena.get(merge.child(2).unwrap()).kind(), NodeKind::OnMatch);
    }

    #[test]
    fn set_property_vs_set_all_properties() {
        let (p, ok) = parse_query("MATCH (n) SET n.name = 'a', n = {x: 1} RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let set = p.arena.get(q.child(1).unwrap());
        assert_eq!(set.nchildren(), 2);
        assert_eq!(p.arena.get(set.child(0).unwrap()).kind(), NodeKind::SetProperty);
        assert_eq!(p.arena.get(set.child(1).unwrap()).kind(), NodeKind::SetAllProperties);
    }

    #[test]
    fn set_merge_properties_with_plus_eq() {
        let (p, ok) = parse_query("MATCH (n) SET n += {x: 1} RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let set = p.arena.get(q.child(1).unwrap());
        assert_eq!(p.arena.get(set.child(0).unwrap()).kind(), NodeKind::MergeProperties);
    }

    #[test]
    fn set_labels_shape() {
        let (p, ok) = parse_query("MATCH (n) SET n:Foo:Bar RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let set = p.arena.get(q.child(1).unwrap());
        let item = p.arena.get(set.child(0).unwrap());
        assert_eq!(item.kind(), NodeKind::SetLabels);
        assert_eq!(item.nchildren(), 3);
    }

    #[test]
    fn delete_detach_flag() {
        let (p, ok) = parse_query("MATCH (n) DETACH DELETE n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let del = p.arena.get(q.child(1).unwrap());
        assert!(del.flags().contains(NodeFlags::DETACH));
    }

    #[test]
    fn remove_labels_and_property() {
        let (p, ok) = parse_query("MATCH (n) REMOVE n:Foo, n.bar RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let rm = p.arena.get(q.child(1).unwrap());
        assert_eq!(rm.nchildren(), 2);
        assert_eq!(p.arena.get(rm.child(0).unwrap()).kind(), NodeKind::RemoveLabels);
        assert_eq!(p.arena.get(rm.child(1).unwrap()).kind(), NodeKind::RemoveProperty);
    }

    #[test]
    fn foreach_nests_clauses() {
        let (p, ok) = parse_query("MATCH (n) FOREACH (x IN n.items | SET x.seen = true) RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let fe = p.arena.get(q.child(1).unwrap());
        assert_eq!(fe.nchildren(), 3);
        assert_eq!(p.arena.get(fe.child(2).unwrap()).kind(), NodeKind::Set);
    }

    #[test]
    fn with_distinct_order_by_skip_limit_where() {
        let (p, ok) = parse_query("MATCH (n) WITH DISTINCT n.name AS name ORDER BY name SKIP 1 LIMIT 10 WHERE name <> '' RETURN name");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let with = p.arena.get(q.child(1).unwrap());
        assert!(with.flags().contains(NodeFlags::DISTINCT));
        assert!(with.flags().contains(NodeFlags::HAS_SKIP));
        assert!(with.flags().contains(NodeFlags::HAS_LIMIT));
        assert!(with.flags().contains(NodeFlags::HAS_WHERE));
        assert_eq!(with.nchildren(), 5);
        assert_eq!(p.arena.get(with.child(1).unwrap()).kind(), NodeKind::OrderBy);
    }

    #[test]
    fn return_star_includes_existing() {
        let (p, ok) = parse_query("MATCH (n) RETURN *, n.name");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let ret = p.arena.get(q.child(1).unwrap());
        assert!(ret.flags().contains(NodeFlags::STAR));
        assert_eq!(ret.nchildren(), 1);
    }

    #[test]
    fn return_literal_synthesizes_identifier_alias() {
        let (p, ok) = parse_query("RETURN 1");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let ret = p.arena.get(q.child(0).unwrap());
        let proj = p.arena.get(ret.child(0).unwrap());
        assert_eq!(proj.nchildren(), 2);
        assert_eq!(p.arena.get(proj.child(0).unwrap()).kind(), NodeKind::Integer);
        let alias = p.arena.get(proj.child(1).unwrap());
        assert_eq!(alias.kind(), NodeKind::Identifier);
        assert_eq!(alias.text(), Some("1"));
    }

    #[test]
    fn return_bare_identifier_has_no_synthesized_alias() {
        let (p, ok) = parse_query("MATCH (n) RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let ret = p.arena.get(q.child(1).unwrap());
        let proj = p.arena.get(ret.child(0).unwrap());
        assert_eq!(proj.nchildren(), 1);
    }

    #[test]
    fn unwind_clause_shape() {
        let (p, ok) = parse_query("UNWIND [1, 2, 3] AS x RETURN x");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let uw = p.arena.get(q.child(0).unwrap());
        assert_eq!(uw.kind(), NodeKind::Unwind);
        assert_eq!(uw.nchildren(), 2);
        assert_eq!(p.arena.get(uw.child(0).unwrap()).kind(), NodeKind::Collection);
        assert_eq!(p.arena.get(uw.child(1).unwrap()).kind(), NodeKind::Identifier);
    }

    #[test]
    fn call_with_args_and_yield() {
        let (p, ok) = parse_query("CALL db.labels(1, 2) YIELD label RETURN label");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let call = p.arena.get(q.child(0).unwrap());
        assert_eq!(call.nchildren(), 4);
        assert_eq!(call.payload().as_count(), Some(2));
    }

    #[test]
    fn call_yield_star_sets_all_flag() {
        let (p, ok) = parse_query("CALL db.labels() YIELD * RETURN 1");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let call = p.arena.get(q.child(0).unwrap());
        assert!(call.flags().contains(NodeFlags::ALL));
    }

    #[test]
    fn load_csv_with_headers_and_terminator() {
        let (p, ok) = parse_query("LOAD CSV WITH HEADERS FROM 'f.csv' AS row FIELDTERMINATOR ';' CREATE (n)");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let csv = p.arena.get(q.child(0).unwrap());
        assert!(csv.flags().contains(NodeFlags::HEADERS));
        assert_eq!(csv.nchildren(), 3);
    }

    #[test]
    fn start_all_nodes_scan() {
        let (p, ok) = parse_query("START n = node(*) RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let start = p.arena.get(q.child(0).unwrap());
        let point = p.arena.get(start.child(0).unwrap());
        assert_eq!(point.kind(), NodeKind::AllNodesScan);
    }

    #[test]
    fn start_node_id_lookup() {
        let (p, ok) = parse_query("START n = node(1, 2, 3) RETURN n");
        assert!(ok);
        let q = p.arena.get(p.top_level[0]);
        let start = p.arena.get(q.child(0).unwrap());
        let point = p.arena.get(start.child(0).unwrap());
        assert_eq!(point.kind(), NodeKind::NodeIdLookup);
        assert_eq!(point.nchildren(), 4);
    }

    #[test]
    fn union_all_wraps_two_queries() {
        let (p, ok) = parse_query("MATCH (n) RETURN n UNION ALL MATCH (m) RETURN m");
        assert!(ok);
        let outer = p.arena.get(p.top_level[0]);
        assert_eq!(outer.kind(), NodeKind::Query);
        assert_eq!(outer.nchildren(), 3);
        assert_eq!(p.arena.get(outer.child(0).unwrap()).kind(), NodeKind::Match);
        assert_eq!(p.arena.get(outer.child(1).unwrap()).kind(), NodeKind::Return);
        let union = p.arena.get(outer.child(2).unwrap());
        assert_eq!(union.kind(), NodeKind::Union);
        assert!(union.flags().contains(NodeFlags::ALL));
        let nested = p.arena.get(union.child(0).unwrap());
        assert_eq!(nested.kind(), NodeKind::Query);
        assert_eq!(nested.nchildren(), 2);
    }

    #[test]
    fn triple_union_right_nests() {
        let (p, ok) = parse_query("RETURN 1 UNION RETURN 2 UNION RETURN 3");
        assert!(ok);
        let outer = p.arena.get(p.top_level[0]);
        assert_eq!(outer.nchildren(), 2);
        let union1 = p.arena.get(outer.child(1).unwrap());
        assert_eq!(union1.kind(), NodeKind::Union);
        assert!(!union1.flags().contains(NodeFlags::ALL));
        let mid = p.arena.get(union1.child(0).unwrap());
        assert_eq!(mid.nchildren(), 2);
        let union2 = p.arena.get(mid.child(1).unwrap());
        assert_eq!(union2.kind(), NodeKind::Union);
        let inner = p.arena.get(union2.child(0).unwrap());
        assert_eq!(inner.nchildren(), 1);
    }
}
